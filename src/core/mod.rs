pub mod progress;
pub mod subtitle;
pub mod video;
