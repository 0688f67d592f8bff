use std::fmt;

use image::{GrayImage, RgbaImage};
use once_cell::sync::OnceCell;

/// 解码后的帧数据（RGBA 格式）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// 转单通道亮度图，用于结构相似度比较
    pub fn to_luma(&self) -> GrayImage {
        let gray: Vec<u8> = self
            .data
            .chunks_exact(4)
            .map(|rgba| {
                ((rgba[0] as u32 * 299 + rgba[1] as u32 * 587 + rgba[2] as u32 * 114) / 1000) as u8
            })
            .collect();

        GrayImage::from_raw(self.width, self.height, gray).unwrap_or_else(|| GrayImage::new(0, 0))
    }

    /// 转 `image` 缓冲区，供外部合成器编码落盘
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }
}

type FrameLoader = Box<dyn Fn() -> Option<Frame> + Send + Sync>;

/// 惰性帧句柄：首次访问时才调用加载闭包，结果缓存后可重复取用。
/// 把「映射里存在这一帧」和「像素已在内存里」解耦，
/// 外部截图存储回灌时用它避免一次性解码全部帧。
pub struct LazyFrame {
    loader: FrameLoader,
    cell: OnceCell<Option<Frame>>,
}

impl LazyFrame {
    /// 延迟加载：`loader` 在第一次 `get` 时调用一次
    pub fn deferred<F>(loader: F) -> Self
    where
        F: Fn() -> Option<Frame> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// 已在内存中的帧直接包装，不再触发加载
    pub fn loaded(frame: Frame) -> Self {
        Self {
            loader: Box::new(|| None),
            cell: OnceCell::with_value(Some(frame)),
        }
    }

    pub fn get(&self) -> Option<&Frame> {
        self.cell.get_or_init(|| (self.loader)()).as_ref()
    }

    pub fn is_materialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for LazyFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyFrame")
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
