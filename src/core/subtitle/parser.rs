use log::debug;

use super::timestamp::Timestamp;

/// 一条带时间戳的字幕行，解析后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionLine {
    pub timestamp: Timestamp,
    pub text: String,
}

/// 逐行扫描原始字幕文本，产出按出现顺序排列的字幕行。
///
/// 时间行包含 `-->`，取左侧作为开始时间；时间行之后的第一行作为字幕文本。
/// 自动字幕常把同一句重复两遍，与上一条文本完全相同的行会被丢弃。
/// 序号行、样式行以及无法解析的片段直接忽略，解析永不报错。
pub fn parse_subtitles(raw: &str) -> Vec<CaptionLine> {
    let mut parsed = Vec::new();
    let mut armed: Option<Timestamp> = None;
    let mut last_saved: Option<String> = None;

    for line in raw.lines() {
        if line.contains("-->") {
            // 开始时间无法解析时不进入待命状态，整段跳过
            let start = line.split("-->").next().unwrap_or("").trim();
            armed = Timestamp::parse(start);
        } else if let Some(timestamp) = armed.take() {
            if last_saved.as_deref() != Some(line) {
                parsed.push(CaptionLine {
                    timestamp,
                    text: line.to_string(),
                });
                last_saved = Some(line.to_string());
            }
        }
    }

    debug!("📝 parsed {} caption lines", parsed.len());
    parsed
}
