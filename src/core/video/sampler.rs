use log::{debug, warn};

use crate::core::subtitle::Timestamp;

use super::frame::Frame;
use super::stream::VideoStream;

/// 帧率无效时的兜底值（经验值，不保证精确）
pub const DEFAULT_FALLBACK_FPS: f64 = 60.0;
/// 单个时间点的解码尝试上限，防止坏流把流水线挂死
pub const DEFAULT_MAX_DECODE_ATTEMPTS: u32 = 100;

/// 单个时间点的采样结果分类（内部诊断用，下游只看 `pixels`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStatus {
    /// 成功解码，像素在手
    Decoded,
    /// 寻址或解码失败、或尝试次数耗尽
    DecodeFailed,
    /// 与上一保留帧近似重复，像素已清除
    NearDuplicate,
}

/// 一个时间点对应的采样帧。`pixels` 为 None 时可能是解码失败
/// 也可能是被判为重复帧，二者对下游等价，`status` 区分细节。
#[derive(Debug, Clone)]
pub struct SampledFrame {
    pub timestamp: String,
    pub pixels: Option<Frame>,
    pub status: SampleStatus,
}

/// 帧采样器：时间点 → 帧序号 → 定位解码
pub struct FrameSampler {
    fallback_fps: f64,
    max_decode_attempts: u32,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self {
            fallback_fps: DEFAULT_FALLBACK_FPS,
            max_decode_attempts: DEFAULT_MAX_DECODE_ATTEMPTS,
        }
    }

    pub fn with_limits(fallback_fps: f64, max_decode_attempts: u32) -> Self {
        Self {
            fallback_fps,
            max_decode_attempts,
        }
    }

    /// 按时间升序逐点采样。每个时间点独立失败，不中断后续采样。
    /// 输出顺序与时间顺序一致，供相似度过滤按序比较。
    pub fn sample(&self, stream: &mut dyn VideoStream, targets: &[Timestamp]) -> Vec<SampledFrame> {
        let mut ordered: Vec<Timestamp> = targets.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let fps = self.effective_fps(stream.frame_rate());
        let mut sampled = Vec::with_capacity(ordered.len());

        for target in ordered {
            let seconds = target.total_seconds();
            let frame_index = (fps * seconds as f64).round() as u64;
            let key = target.bucket_key();

            match self.decode_at(stream, frame_index) {
                Some(frame) => {
                    debug!("🎞️ {}: decoded frame {}", key, frame_index);
                    sampled.push(SampledFrame {
                        timestamp: key,
                        pixels: Some(frame),
                        status: SampleStatus::Decoded,
                    });
                }
                None => {
                    warn!("⚠️ {}: no frame produced at index {}", key, frame_index);
                    sampled.push(SampledFrame {
                        timestamp: key,
                        pixels: None,
                        status: SampleStatus::DecodeFailed,
                    });
                }
            }
        }

        sampled
    }

    fn effective_fps(&self, reported: f64) -> f64 {
        if reported.is_finite() && reported > 0.0 {
            reported
        } else {
            warn!(
                "⚠️ stream reported fps {}, falling back to {}",
                reported, self.fallback_fps
            );
            self.fallback_fps
        }
    }

    /// 定位后向前解码，次数有上限；任何失败都折叠为 None
    fn decode_at(&self, stream: &mut dyn VideoStream, frame_index: u64) -> Option<Frame> {
        if let Err(e) = stream.seek_to_frame(frame_index) {
            warn!("⚠️ seek failed: {}", e);
            return None;
        }

        for _ in 0..self.max_decode_attempts {
            match stream.decode_next() {
                Ok(Some(frame)) => return Some(frame),
                Ok(None) => continue,
                Err(e) => {
                    warn!("⚠️ decode failed at frame {}: {}", frame_index, e);
                    return None;
                }
            }
        }

        warn!(
            "⚠️ gave up after {} decode attempts at frame {}",
            self.max_decode_attempts, frame_index
        );
        None
    }
}

impl Default for FrameSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::video::stream::MockVideoStream;

    fn solid_frame(fill: u8) -> Frame {
        Frame::new(4, 4, vec![fill; 4 * 4 * 4])
    }

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    #[test]
    fn test_sample_computes_frame_index_from_fps() {
        let mut stream = MockVideoStream::with_pattern(30.0, |_| Some(solid_frame(1)));

        let sampler = FrameSampler::new();
        let sampled = sampler.sample(&mut stream, &[ts("00:00:10.000")]);

        // 30 fps * 10 s = 帧序号 300
        assert_eq!(stream.seek_log, vec![300]);
        assert_eq!(sampled.len(), 1);
        assert_eq!(sampled[0].status, SampleStatus::Decoded);
        assert!(sampled[0].pixels.is_some());
    }

    #[test]
    fn test_zero_fps_falls_back_to_sixty() {
        let mut stream = MockVideoStream::with_pattern(0.0, |_| Some(solid_frame(1)));

        let sampler = FrameSampler::new();
        sampler.sample(&mut stream, &[ts("00:00:02.000"), ts("00:00:05.000")]);

        // 兜底 60 fps：每个时间点采样 60 * seconds
        assert_eq!(stream.seek_log, vec![120, 300]);
    }

    #[test]
    fn test_targets_processed_in_ascending_order() {
        let mut stream = MockVideoStream::with_pattern(1.0, |_| Some(solid_frame(1)));

        let sampler = FrameSampler::new();
        let sampled = sampler.sample(
            &mut stream,
            &[ts("00:00:30.000"), ts("00:00:10.000"), ts("00:00:20.000")],
        );

        assert_eq!(stream.seek_log, vec![10, 20, 30]);
        let keys: Vec<&str> = sampled.iter().map(|s| s.timestamp.as_str()).collect();
        assert_eq!(keys, vec!["00:00:10", "00:00:20", "00:00:30"]);
    }

    #[test]
    fn test_decode_retries_through_empty_reads() {
        let mut stream =
            MockVideoStream::with_pattern(30.0, |_| Some(solid_frame(9))).with_empty_reads(3);

        let sampler = FrameSampler::new();
        let sampled = sampler.sample(&mut stream, &[ts("00:00:01.000")]);

        assert_eq!(sampled[0].status, SampleStatus::Decoded);
        assert_eq!(stream.decode_calls, 4);
    }

    #[test]
    fn test_bounded_retry_reports_failure_and_continues() {
        // 前一个时间点落在流末尾之外，后一个正常
        let mut stream =
            MockVideoStream::with_pattern(1.0, |idx| (idx >= 50).then(|| solid_frame(3)));

        let sampler = FrameSampler::with_limits(60.0, 5);
        let sampled = sampler.sample(&mut stream, &[ts("00:00:10.000"), ts("00:01:00.000")]);

        assert_eq!(sampled.len(), 2);
        assert_eq!(sampled[0].status, SampleStatus::DecodeFailed);
        assert!(sampled[0].pixels.is_none());
        assert_eq!(sampled[1].status, SampleStatus::Decoded);
    }

    #[test]
    fn test_seek_failure_is_per_timestamp() {
        let mut stream = MockVideoStream::new(30.0).failing_seeks();

        let sampler = FrameSampler::new();
        let sampled = sampler.sample(&mut stream, &[ts("00:00:01.000")]);

        assert_eq!(sampled[0].status, SampleStatus::DecodeFailed);
        assert!(sampled[0].pixels.is_none());
    }

    #[test]
    fn test_duplicate_targets_collapse() {
        let mut stream = MockVideoStream::with_pattern(30.0, |_| Some(solid_frame(1)));

        let sampler = FrameSampler::new();
        let sampled = sampler.sample(
            &mut stream,
            &[ts("00:00:01.000"), ts("00:00:01.000")],
        );

        assert_eq!(sampled.len(), 1);
    }
}
