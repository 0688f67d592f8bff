use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("video stream unreadable: {0}")]
    StreamUnreadable(String),
    #[error("seek to frame {frame_index} failed: {reason}")]
    Seek { frame_index: u64, reason: String },
    #[error("decode error: {0}")]
    Decode(String),
}
