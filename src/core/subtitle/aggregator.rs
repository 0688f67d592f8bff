use log::debug;

use super::parser::CaptionLine;
use super::timestamp::Timestamp;

/// 对话片段：静默间隔划分出的一组连续字幕行。
/// `bucket_time` 取并入该片段的最后一行的时间戳。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSegment {
    pub bucket_time: Timestamp,
    pub lines: Vec<String>,
}

impl DialogueSegment {
    /// 片段的 `HH:MM:SS` 键，驱动帧采样
    pub fn bucket_key(&self) -> String {
        self.bucket_time.bucket_key()
    }

    pub fn joined_text(&self) -> String {
        self.lines.join(" ")
    }
}

/// 把有序字幕行聚合为对话片段。
///
/// 以片段开头行的时间为基准，当前行与基准的整秒间隔超过
/// `segment_gap_seconds` 时关闭当前片段并以当前行另起一段。
/// 输入假定时间戳单调不减，这里不重新排序。空输入产出空序列。
pub fn aggregate(lines: &[CaptionLine], segment_gap_seconds: u64) -> Vec<DialogueSegment> {
    let mut segments = Vec::new();

    let mut opened_at: Option<Timestamp> = None;
    let mut last_line_at: Option<Timestamp> = None;
    let mut texts: Vec<String> = Vec::new();

    for line in lines {
        if let Some(opened) = opened_at {
            if line.timestamp.seconds_since(&opened) > segment_gap_seconds {
                // 关闭的片段以上一行（片段内最后一行）的时间为键
                segments.push(DialogueSegment {
                    bucket_time: last_line_at.unwrap_or(opened),
                    lines: std::mem::take(&mut texts),
                });
                opened_at = Some(line.timestamp);
            }
        } else {
            opened_at = Some(line.timestamp);
        }

        texts.push(line.text.clone());
        last_line_at = Some(line.timestamp);
    }

    if let Some(bucket_time) = last_line_at {
        segments.push(DialogueSegment {
            bucket_time,
            lines: texts,
        });
    }

    debug!(
        "🧩 aggregated {} caption lines into {} segments (gap {}s)",
        lines.len(),
        segments.len(),
        segment_gap_seconds
    );
    segments
}
