//! 字幕解析与对话聚合
//!
//! 两步把原始字幕文本变成可采样的对话片段：
//! 1. 逐行解析 - 时间行 + 文本行，重复的自动字幕去重
//! 2. 间隔聚合 - 按可配置的静默间隔合并连续字幕行

pub mod aggregator;
pub mod parser;
pub mod timestamp;

pub use aggregator::{aggregate, DialogueSegment};
pub use parser::{parse_subtitles, CaptionLine};
pub use timestamp::Timestamp;
