//! 处理进度追踪：记录每个视频已采样过的时间点，
//! 让重复运行可以跳过已处理的片段。持久化由调用方负责。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// 单个视频的处理状态。核心只做追加，从不清空：
/// 尝试过的时间点不论成功、判重还是失败都会记入。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoProcessingState {
    pub video_id: String,
    pub processed_timestamps: BTreeSet<String>,
}

impl VideoProcessingState {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            processed_timestamps: BTreeSet::new(),
        }
    }

    pub fn contains(&self, timestamp_key: &str) -> bool {
        self.processed_timestamps.contains(timestamp_key)
    }

    /// 追加式合并，重复合并无副作用
    pub fn merge(&mut self, newly_processed: &BTreeSet<String>) {
        self.processed_timestamps
            .extend(newly_processed.iter().cloned());
    }
}

/// 跨运行的状态集合，按 video_id 索引
#[derive(Debug, Clone, Default)]
pub struct ProcessingStateTracker {
    states: BTreeMap<String, VideoProcessingState>,
}

impl ProcessingStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从调用方反序列化出的状态列表恢复
    pub fn from_states(states: Vec<VideoProcessingState>) -> Self {
        Self {
            states: states
                .into_iter()
                .map(|s| (s.video_id.clone(), s))
                .collect(),
        }
    }

    /// 未知视频返回空集合
    pub fn get(&self, video_id: &str) -> BTreeSet<String> {
        self.states
            .get(video_id)
            .map(|s| s.processed_timestamps.clone())
            .unwrap_or_default()
    }

    pub fn state(&self, video_id: &str) -> Option<&VideoProcessingState> {
        self.states.get(video_id)
    }

    pub fn merge(&mut self, video_id: &str, newly_processed: &BTreeSet<String>) {
        self.states
            .entry(video_id.to_string())
            .or_insert_with(|| VideoProcessingState::new(video_id))
            .merge(newly_processed);
    }

    /// 导出给调用方持久化
    pub fn into_states(self) -> Vec<VideoProcessingState> {
        self.states.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
