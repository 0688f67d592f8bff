use super::error::VideoError;
use super::frame::Frame;

/// 可定位、可解码的视频流。解码器句柄由单个视频的流水线独占，
/// 内部的寻址位置是有状态的，不能跨线程共享。
pub trait VideoStream: Send {
    /// 流上报的帧率；报告无效值（0、负数、NaN）时由采样器兜底
    fn frame_rate(&self) -> f64;

    /// 定位到指定帧序号
    fn seek_to_frame(&mut self, frame_index: u64) -> Result<(), VideoError>;

    /// 向前解码一次。`Ok(None)` 表示本次未产出帧（可继续尝试），
    /// `Err` 表示流本身出了问题
    fn decode_next(&mut self) -> Result<Option<Frame>, VideoError>;
}

type FramePattern = Box<dyn Fn(u64) -> Option<Frame> + Send + Sync>;

/// 内存视频流，按帧序号生成像素，用于测试和降级场景
pub struct MockVideoStream {
    fps: f64,
    frame_pattern: Option<FramePattern>,
    position: u64,
    empty_reads_before_frame: u32,
    pending_empty: u32,
    fail_seeks: bool,
    pub seek_log: Vec<u64>,
    pub decode_calls: u64,
}

impl MockVideoStream {
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            frame_pattern: None,
            position: 0,
            empty_reads_before_frame: 0,
            pending_empty: 0,
            fail_seeks: false,
            seek_log: Vec::new(),
            decode_calls: 0,
        }
    }

    /// 每个帧序号的像素由 `pattern` 决定，返回 None 视作流结束
    pub fn with_pattern<F>(fps: f64, pattern: F) -> Self
    where
        F: Fn(u64) -> Option<Frame> + Send + Sync + 'static,
    {
        Self {
            frame_pattern: Some(Box::new(pattern)),
            ..Self::new(fps)
        }
    }

    /// 每次寻址后先空转 `n` 次再产出帧，模拟解码器预热
    pub fn with_empty_reads(mut self, n: u32) -> Self {
        self.empty_reads_before_frame = n;
        self
    }

    pub fn failing_seeks(mut self) -> Self {
        self.fail_seeks = true;
        self
    }
}

impl VideoStream for MockVideoStream {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn seek_to_frame(&mut self, frame_index: u64) -> Result<(), VideoError> {
        if self.fail_seeks {
            return Err(VideoError::Seek {
                frame_index,
                reason: "mock seek failure".to_string(),
            });
        }
        self.seek_log.push(frame_index);
        self.position = frame_index;
        self.pending_empty = self.empty_reads_before_frame;
        Ok(())
    }

    fn decode_next(&mut self) -> Result<Option<Frame>, VideoError> {
        self.decode_calls += 1;

        if self.pending_empty > 0 {
            self.pending_empty -= 1;
            return Ok(None);
        }

        let frame = self
            .frame_pattern
            .as_ref()
            .and_then(|pattern| pattern(self.position));
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }
}
