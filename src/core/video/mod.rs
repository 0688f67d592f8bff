//! 视频帧采样与近重复过滤
//!
//! 核心链路：
//! 1. 时间点 → 帧序号 - fps 无效时回退 60
//! 2. 定位解码 - 有界重试，坏流不会挂死流水线
//! 3. 相似度过滤 - 与上一保留帧的亮度图做 SSIM 比较

pub mod error;
pub mod frame;
pub mod sampler;
pub mod similarity;
pub mod stream;

pub use error::VideoError;
pub use frame::{Frame, LazyFrame};
pub use sampler::{FrameSampler, SampleStatus, SampledFrame};
pub use similarity::{ssim, SimilarityFilter};
pub use stream::{MockVideoStream, VideoStream};
