//! 去除展平图像中组织上方的噪声.

use crate::consts::gray::BLACK;
use crate::consts::mask::{MASK_NOISE_ROW_MEAN, MASK_WHITE_THRESHOLD};
use ndarray::{s, Array2, ArrayView1, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 组织上方噪声的去除规则.
///
/// 1. 展平图像顶部连续的 "暗行" (行均值低于 `noise_row_mean`) 整行清零;
/// 2. 每一列中, 第一个不低于 `white_threshold` 的像素被视为组织上表面, 其上方像素清零.
///   没有这样的像素的列保持不变.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TopNoiseMask {
    white_threshold: u8,
    noise_row_mean: f64,
}

impl Default for TopNoiseMask {
    fn default() -> Self {
        Self::new(MASK_WHITE_THRESHOLD, MASK_NOISE_ROW_MEAN)
    }
}

impl TopNoiseMask {
    /// 如果 `noise_row_mean` 为负数或不是有限值, 则程序 panic.
    pub fn new(white_threshold: u8, noise_row_mean: f64) -> Self {
        assert!(
            noise_row_mean.is_finite() && noise_row_mean >= 0.0,
            "行均值阈值 `{noise_row_mean}` 非法"
        );
        Self {
            white_threshold,
            noise_row_mean,
        }
    }

    /// 组织上表面的亮度下限.
    #[inline]
    pub fn white_threshold(&self) -> u8 {
        self.white_threshold
    }

    /// 噪声行的行均值上限 (不含).
    #[inline]
    pub fn noise_row_mean(&self) -> f64 {
        self.noise_row_mean
    }

    /// 对 `flat` 应用规则, 返回新图像.
    pub fn apply(&self, flat: ArrayView2<u8>) -> Array2<u8> {
        let mut out = flat.to_owned();
        if out.is_empty() {
            return out;
        }

        let noise_rows = out
            .rows()
            .into_iter()
            .take_while(|row| row_mean(*row) < self.noise_row_mean)
            .count();
        out.slice_mut(s![..noise_rows, ..]).fill(BLACK);

        for mut col in out.columns_mut() {
            if let Some(top) = col.iter().position(|&p| p >= self.white_threshold) {
                col.slice_mut(s![..top]).fill(BLACK);
            }
        }
        out
    }
}

#[inline]
fn row_mean(row: ArrayView1<u8>) -> f64 {
    row.iter().map(|&p| p as f64).sum::<f64>() / row.len() as f64
}

/// 以默认规则 [`TopNoiseMask::default`] 去噪.
#[inline]
pub fn mask(flat: ArrayView2<u8>) -> Array2<u8> {
    TopNoiseMask::default().apply(flat)
}

#[cfg(test)]
mod tests {
    use super::{mask, TopNoiseMask};
    use ndarray::{arr2, Array2};

    #[test]
    fn test_mask_rules() {
        let flat = arr2(&[
            [2, 1, 0, 3], // 均值 1.5, 噪声行.
            [50, 130, 40, 10],
            [200, 60, 125, 10],
            [90, 70, 30, 20],
        ]);
        let out = mask(flat.view());
        assert_eq!(
            out,
            arr2(&[
                [0, 0, 0, 0],
                [0, 130, 0, 10],
                [200, 60, 125, 10],
                [90, 70, 30, 20],
            ])
        );
    }

    #[test]
    fn test_mask_noise_rows_stop_at_first_bright_row() {
        let flat = arr2(&[[1u8, 1], [9, 9], [1, 1]]);
        // 第 2 行之后的暗行不是顶部噪声, 且没有白色像素, 保持不变.
        assert_eq!(mask(flat.view()), arr2(&[[0, 0], [9, 9], [1, 1]]));
    }

    #[test]
    fn test_mask_custom_threshold_and_empty() {
        let flat = arr2(&[[40u8, 40], [80, 20], [10, 90]]);
        let out = TopNoiseMask::new(80, 0.0).apply(flat.view());
        assert_eq!(out, arr2(&[[0, 0], [80, 0], [10, 90]]));

        let empty = Array2::<u8>::zeros((0, 3));
        assert_eq!(mask(empty.view()).dim(), (0, 3));
    }

    #[test]
    #[should_panic]
    fn test_mask_bad_threshold() {
        let _ = TopNoiseMask::new(120, f64::NAN);
    }
}
