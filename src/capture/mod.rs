//! 视频转图文流水线 - 把字幕轨和视频流对齐成带时间戳的代表帧
//!
//! 核心策略：
//! 1. 字幕聚合 - 按静默间隔把字幕行合并成对话片段
//! 2. 逐点采样 - 每个片段定位解码恰好一帧，失败有界重试
//! 3. 相似度过滤 - 与上一保留帧近似的画面不重复出图
//! 4. 进度追踪 - 尝试过的时间点记入状态，重跑可续传
//!
//! 单个视频内严格串行；视频之间并行互不影响。

pub mod batch;
pub mod pipeline;

pub use batch::{process_videos, VideoJob};
pub use pipeline::{CaptureConfig, CapturePipeline, CaptureResult, CaptureStats};
