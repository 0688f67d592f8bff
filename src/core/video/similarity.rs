use image::GrayImage;
use log::debug;

use super::frame::Frame;
use super::sampler::{SampleStatus, SampledFrame};

/// 结构相似度高于该值判为近重复帧
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.9;

const WINDOW: u32 = 8;
// SSIM 稳定项，按 0-255 动态范围取 (0.01*255)^2 / (0.03*255)^2
const C1: f64 = 6.5025;
const C2: f64 = 58.5225;

/// 近重复帧过滤器。持有上一保留帧的亮度图，逐帧顺序比较：
/// 判重的帧不更新参照，下一帧仍与同一保留帧比。
/// 比较链依赖顺序，同一视频内不能并行。
pub struct SimilarityFilter {
    threshold: f32,
    last_retained: Option<GrayImage>,
}

impl SimilarityFilter {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            last_retained: None,
        }
    }

    /// 是否保留该帧。保留时参照更新为当前帧，判重时参照不动。
    pub fn should_keep(&mut self, frame: &Frame) -> bool {
        let luma = frame.to_luma();

        let keep = match &self.last_retained {
            None => true,
            Some(reference) => {
                let score = ssim(&luma, reference);
                debug!("🔍 similarity {:.4} (threshold {})", score, self.threshold);
                score <= self.threshold
            }
        };

        if keep {
            self.last_retained = Some(luma);
        }
        keep
    }

    /// 对按时间排好序的采样结果就地过滤：
    /// 判重的帧清空像素并标记，解码失败的帧原样放行且不影响参照。
    pub fn apply(&mut self, sampled: &mut [SampledFrame]) {
        for entry in sampled.iter_mut() {
            let Some(frame) = entry.pixels.as_ref() else {
                continue;
            };

            if !self.should_keep(frame) {
                debug!("🗑️ {}: near-duplicate, dropping pixels", entry.timestamp);
                entry.pixels = None;
                entry.status = SampleStatus::NearDuplicate;
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_retained = None;
    }
}

impl Default for SimilarityFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// 8x8 分窗的平均结构相似度，输入为同尺寸亮度图。
/// 尺寸不一致按完全不相似处理（返回 0）。
pub fn ssim(a: &GrayImage, b: &GrayImage) -> f32 {
    let (width, height) = a.dimensions();
    if b.dimensions() != (width, height) || width == 0 || height == 0 {
        return 0.0;
    }

    let pa = a.as_raw();
    let pb = b.as_raw();
    let w = width as usize;

    let mut total = 0.0f64;
    let mut windows = 0u32;

    for wy in (0..height).step_by(WINDOW as usize) {
        for wx in (0..width).step_by(WINDOW as usize) {
            let win_w = WINDOW.min(width - wx) as usize;
            let win_h = WINDOW.min(height - wy) as usize;
            let n = (win_w * win_h) as f64;

            let mut sum_a = 0.0f64;
            let mut sum_b = 0.0f64;
            let mut sum_aa = 0.0f64;
            let mut sum_bb = 0.0f64;
            let mut sum_ab = 0.0f64;

            for dy in 0..win_h {
                let row = (wy as usize + dy) * w + wx as usize;
                for dx in 0..win_w {
                    let va = pa[row + dx] as f64;
                    let vb = pb[row + dx] as f64;
                    sum_a += va;
                    sum_b += vb;
                    sum_aa += va * va;
                    sum_bb += vb * vb;
                    sum_ab += va * vb;
                }
            }

            let mu_a = sum_a / n;
            let mu_b = sum_b / n;
            let var_a = sum_aa / n - mu_a * mu_a;
            let var_b = sum_bb / n - mu_b * mu_b;
            let cov = sum_ab / n - mu_a * mu_b;

            let score = ((2.0 * mu_a * mu_b + C1) * (2.0 * cov + C2))
                / ((mu_a * mu_a + mu_b * mu_b + C1) * (var_a + var_b + C2));

            total += score;
            windows += 1;
        }
    }

    (total / windows as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(fill: u8) -> Frame {
        Frame::new(32, 32, vec![fill; 32 * 32 * 4])
    }

    fn gradient_frame() -> Frame {
        let mut data = Vec::with_capacity(32 * 32 * 4);
        for y in 0..32u32 {
            for x in 0..32u32 {
                let v = ((x * 8 + y) % 256) as u8;
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Frame::new(32, 32, data)
    }

    #[test]
    fn test_ssim_identical_is_one() {
        let luma = solid_frame(128).to_luma();
        let score = ssim(&luma, &luma);
        assert!((score - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_ssim_opposite_is_low() {
        let black = solid_frame(0).to_luma();
        let white = solid_frame(255).to_luma();
        assert!(ssim(&black, &white) < 0.1);
    }

    #[test]
    fn test_ssim_dimension_mismatch_is_zero() {
        let a = Frame::new(8, 8, vec![0u8; 8 * 8 * 4]).to_luma();
        let b = Frame::new(4, 4, vec![0u8; 4 * 4 * 4]).to_luma();
        assert_eq!(ssim(&a, &b), 0.0);
    }

    #[test]
    fn test_first_frame_always_kept() {
        let mut filter = SimilarityFilter::new();
        assert!(filter.should_keep(&solid_frame(42)));
    }

    #[test]
    fn test_duplicate_compared_against_last_retained() {
        let mut filter = SimilarityFilter::new();

        // 帧 1 与帧 2 相同，帧 3 差异明显
        assert!(filter.should_keep(&solid_frame(128)));
        assert!(!filter.should_keep(&solid_frame(128)));
        // 帧 3 与帧 1 比（而不是刚被丢弃的帧 2）
        assert!(filter.should_keep(&gradient_frame()));
    }

    #[test]
    fn test_dropped_frame_does_not_shift_reference() {
        let mut filter = SimilarityFilter::new();

        assert!(filter.should_keep(&solid_frame(100)));
        // 近重复被丢弃
        assert!(!filter.should_keep(&solid_frame(100)));
        // 与帧 1 仍然近似，继续被丢弃
        assert!(!filter.should_keep(&solid_frame(100)));
    }

    #[test]
    fn test_apply_marks_duplicates_and_skips_failures() {
        let mut sampled = vec![
            SampledFrame {
                timestamp: "00:00:01".to_string(),
                pixels: Some(solid_frame(50)),
                status: SampleStatus::Decoded,
            },
            SampledFrame {
                timestamp: "00:00:02".to_string(),
                pixels: None,
                status: SampleStatus::DecodeFailed,
            },
            SampledFrame {
                timestamp: "00:00:03".to_string(),
                pixels: Some(solid_frame(50)),
                status: SampleStatus::Decoded,
            },
            SampledFrame {
                timestamp: "00:00:04".to_string(),
                pixels: Some(gradient_frame()),
                status: SampleStatus::Decoded,
            },
        ];

        let mut filter = SimilarityFilter::new();
        filter.apply(&mut sampled);

        assert_eq!(sampled[0].status, SampleStatus::Decoded);
        assert!(sampled[0].pixels.is_some());

        // 解码失败的帧原样放行
        assert_eq!(sampled[1].status, SampleStatus::DecodeFailed);

        // 与 00:00:01 近重复
        assert_eq!(sampled[2].status, SampleStatus::NearDuplicate);
        assert!(sampled[2].pixels.is_none());

        // 差异明显，保留
        assert_eq!(sampled[3].status, SampleStatus::Decoded);
        assert!(sampled[3].pixels.is_some());
    }

    #[test]
    fn test_reset_clears_reference() {
        let mut filter = SimilarityFilter::new();
        assert!(filter.should_keep(&solid_frame(128)));
        filter.reset();
        assert!(filter.should_keep(&solid_frame(128)));
    }
}
