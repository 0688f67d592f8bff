use std::collections::BTreeMap;

use log::info;

use crate::core::progress::VideoProcessingState;
use crate::core::subtitle::{aggregate, parse_subtitles, Timestamp};
use crate::core::video::sampler::{FrameSampler, SampleStatus, SampledFrame};
use crate::core::video::similarity::SimilarityFilter;
use crate::core::video::stream::VideoStream;
use crate::core::video::LazyFrame;

/// 单视频流水线的全部可调参数
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// 对话片段的静默分隔（秒，≥ 1）
    pub segment_gap_seconds: u64,
    /// 近重复判定阈值
    pub similarity_threshold: f32,
    /// 帧率无效时的兜底值
    pub fallback_fps: f64,
    /// 单个时间点的解码尝试上限
    pub max_decode_attempts: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            segment_gap_seconds: 5,
            similarity_threshold: 0.9,
            fallback_fps: 60.0,
            max_decode_attempts: 100,
        }
    }
}

impl CaptureConfig {
    pub fn with_gap(segment_gap_seconds: u64) -> Self {
        Self {
            segment_gap_seconds,
            ..Default::default()
        }
    }
}

/// 一次运行的计数统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// 字幕聚合出的片段数
    pub requested: usize,
    /// 因已处理而跳过的时间点
    pub skipped: usize,
    /// 成功解码并保留的帧
    pub decoded: usize,
    /// 判为近重复而丢弃的帧
    pub duplicates: usize,
    /// 解码失败的时间点
    pub failures: usize,
}

/// 单个视频的处理产出：按时间键排列的采样帧 + 更新后的状态
#[derive(Debug)]
pub struct CaptureResult {
    pub video_id: String,
    pub frames: BTreeMap<String, SampledFrame>,
    pub state: VideoProcessingState,
    pub stats: CaptureStats,
}

impl CaptureResult {
    /// 把保留下来的帧包成惰性句柄，和外部截图存储回灌的形态一致
    pub fn into_lazy_frames(self) -> BTreeMap<String, LazyFrame> {
        self.frames
            .into_iter()
            .filter_map(|(key, entry)| entry.pixels.map(|frame| (key, LazyFrame::loaded(frame))))
            .collect()
    }
}

/// 单视频流水线：字幕解析 → 片段聚合 → 帧采样 → 相似度过滤。
/// 各阶段有严格的顺序依赖，视频内部不可并行。
pub struct CapturePipeline {
    config: CaptureConfig,
}

impl CapturePipeline {
    pub fn new() -> Self {
        Self::with_config(CaptureConfig::default())
    }

    pub fn with_config(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// 处理一个视频。`prior` 中已有的时间点不再采样；
    /// 返回的状态是 `prior` 的超集，包含本次尝试过的全部时间点。
    pub fn process(
        &self,
        video_id: &str,
        subtitles: &str,
        stream: &mut dyn VideoStream,
        prior: &VideoProcessingState,
    ) -> CaptureResult {
        let lines = parse_subtitles(subtitles);
        let segments = aggregate(&lines, self.config.segment_gap_seconds);

        let mut targets: Vec<Timestamp> = Vec::new();
        let mut skipped = 0usize;
        for segment in &segments {
            if prior.contains(&segment.bucket_key()) {
                skipped += 1;
            } else {
                targets.push(segment.bucket_time);
            }
        }

        info!(
            "🎬 {}: {} segments, {} to sample, {} already processed",
            video_id,
            segments.len(),
            targets.len(),
            skipped
        );

        let sampler =
            FrameSampler::with_limits(self.config.fallback_fps, self.config.max_decode_attempts);
        let mut sampled = sampler.sample(stream, &targets);

        let mut filter = SimilarityFilter::with_threshold(self.config.similarity_threshold);
        filter.apply(&mut sampled);

        let mut stats = CaptureStats {
            requested: segments.len(),
            skipped,
            ..Default::default()
        };

        let mut state = prior.clone();
        state.video_id = video_id.to_string();

        let mut frames = BTreeMap::new();
        for entry in sampled {
            match entry.status {
                SampleStatus::Decoded => stats.decoded += 1,
                SampleStatus::NearDuplicate => stats.duplicates += 1,
                SampleStatus::DecodeFailed => stats.failures += 1,
            }
            // 尝试过就记入状态，判重和失败的时间点也不再重试
            state.processed_timestamps.insert(entry.timestamp.clone());
            frames.insert(entry.timestamp.clone(), entry);
        }

        info!(
            "✅ {}: {} kept, {} duplicates, {} failures",
            video_id, stats.decoded, stats.duplicates, stats.failures
        );

        CaptureResult {
            video_id: video_id.to_string(),
            frames,
            state,
            stats,
        }
    }
}

impl Default for CapturePipeline {
    fn default() -> Self {
        Self::new()
    }
}
