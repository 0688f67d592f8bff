use std::collections::BTreeMap;

use log::{error, info};
use rayon::prelude::*;

use crate::core::progress::{ProcessingStateTracker, VideoProcessingState};
use crate::core::video::error::VideoError;
use crate::core::video::stream::VideoStream;

use super::pipeline::{CaptureConfig, CapturePipeline, CaptureResult};

type StreamOpener = Box<dyn FnOnce() -> Result<Box<dyn VideoStream>, VideoError> + Send>;

/// 一个待处理视频：字幕文本 + 延迟打开的解码器句柄。
/// 打开失败是该视频的致命错误，但不影响其他视频。
pub struct VideoJob {
    pub video_id: String,
    pub subtitles: String,
    opener: StreamOpener,
}

impl VideoJob {
    pub fn new<F>(video_id: impl Into<String>, subtitles: impl Into<String>, opener: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn VideoStream>, VideoError> + Send + 'static,
    {
        Self {
            video_id: video_id.into(),
            subtitles: subtitles.into(),
            opener: Box::new(opener),
        }
    }
}

/// 跨视频批处理。视频之间没有共享可变状态，
/// 每个视频独占自己的解码器和流水线，放到 rayon 线程池上并行。
/// 结果按 video_id 索引，状态在所有视频完成后统一并入 tracker。
pub fn process_videos(
    config: &CaptureConfig,
    jobs: Vec<VideoJob>,
    tracker: &mut ProcessingStateTracker,
) -> BTreeMap<String, Result<CaptureResult, VideoError>> {
    info!("🚀 processing batch of {} videos", jobs.len());

    // 并行前快照每个视频的既有状态
    let prepared: Vec<(VideoJob, VideoProcessingState)> = jobs
        .into_iter()
        .map(|job| {
            let prior = tracker
                .state(&job.video_id)
                .cloned()
                .unwrap_or_else(|| VideoProcessingState::new(job.video_id.clone()));
            (job, prior)
        })
        .collect();

    let pipeline = CapturePipeline::with_config(config.clone());

    let results: Vec<(String, Result<CaptureResult, VideoError>)> = prepared
        .into_par_iter()
        .map(|(job, prior)| {
            let video_id = job.video_id.clone();
            let outcome = match (job.opener)() {
                Ok(mut stream) => {
                    Ok(pipeline.process(&job.video_id, &job.subtitles, stream.as_mut(), &prior))
                }
                Err(e) => {
                    error!("❌ {}: stream unreadable: {}", video_id, e);
                    Err(e)
                }
            };
            (video_id, outcome)
        })
        .collect();

    for (video_id, outcome) in &results {
        if let Ok(result) = outcome {
            tracker.merge(video_id, &result.state.processed_timestamps);
        }
    }

    results.into_iter().collect()
}
