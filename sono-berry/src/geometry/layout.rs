//! 扫描仪界面布局参数.

use crate::consts::layout::*;
use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 布局参数. 几何推断时所需的全部阈值.
///
/// `Default` 对应 [`crate::consts::layout`] 中的常量. 若要适配其它扫描仪,
/// 可以从默认值出发, 链式调用 `with_*` 方法覆写部分字段.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    /// 刻度尺像素亮度下限 (不含).
    scale_bar_threshold: u8,

    /// 刻度尺探测行/列.
    scale_bar_probe_index: usize,

    /// 内容边界行和上限 (不含).
    content_row_sum_max: u64,

    /// 工作帧左侧裁掉的列数.
    crop_left: usize,

    /// 工作帧保留的像素范围 `[clamp_low, clamp_high]`, 其余清零.
    clamp_low: u8,
    clamp_high: u8,

    /// 左上、右上两个覆盖层区域 `(行数, 列数)`.
    overlay_left: Idx2d,
    overlay_right: Idx2d,

    /// 探测行行和下限 (不含).
    probe_row_sum_min: u64,

    /// 峰值最小间隔 (像素).
    peak_min_distance: usize,

    /// 扫描仪标称半角 (度).
    design_half_angle_deg: f64,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutSpec {
    /// 以 [`crate::consts::layout`] 中的常量构建参数.
    pub const fn new() -> Self {
        Self {
            scale_bar_threshold: SCALE_BAR_THRESHOLD,
            scale_bar_probe_index: SCALE_BAR_PROBE_INDEX,
            content_row_sum_max: CONTENT_ROW_SUM_MAX,
            crop_left: CROP_LEFT_COLUMNS,
            clamp_low: CLAMP_LOW,
            clamp_high: CLAMP_HIGH,
            overlay_left: OVERLAY_TOP_LEFT,
            overlay_right: OVERLAY_TOP_RIGHT,
            probe_row_sum_min: PROBE_ROW_SUM_MIN,
            peak_min_distance: PEAK_MIN_DISTANCE,
            design_half_angle_deg: DESIGN_HALF_ANGLE_DEG,
        }
    }

    /// 覆写刻度尺亮度阈值 `threshold` 与探测行/列 `probe_index`.
    #[inline]
    pub fn with_scale_bar(mut self, threshold: u8, probe_index: usize) -> Self {
        self.scale_bar_threshold = threshold;
        self.scale_bar_probe_index = probe_index;
        self
    }

    /// 覆写内容边界行和上限.
    #[inline]
    pub fn with_content_row_sum_max(mut self, max: u64) -> Self {
        self.content_row_sum_max = max;
        self
    }

    /// 覆写工作帧左侧裁掉的列数.
    #[inline]
    pub fn with_crop_left(mut self, columns: usize) -> Self {
        self.crop_left = columns;
        self
    }

    /// 覆写工作帧保留的像素范围 `[low, high]`.
    ///
    /// 如果 `low > high`, 则程序 panic.
    pub fn with_clamp(mut self, low: u8, high: u8) -> Self {
        assert!(low <= high, "像素范围 `[{low}, {high}]` 为空");
        self.clamp_low = low;
        self.clamp_high = high;
        self
    }

    /// 覆写左上 `left`、右上 `right` 两个覆盖层区域 `(行数, 列数)`.
    #[inline]
    pub fn with_overlay_blocks(mut self, left: Idx2d, right: Idx2d) -> Self {
        self.overlay_left = left;
        self.overlay_right = right;
        self
    }

    /// 覆写探测行行和下限.
    #[inline]
    pub fn with_probe_row_sum_min(mut self, min: u64) -> Self {
        self.probe_row_sum_min = min;
        self
    }

    /// 覆写峰值最小间隔.
    ///
    /// 如果 `distance == 0`, 则程序 panic.
    pub fn with_peak_min_distance(mut self, distance: usize) -> Self {
        assert_ne!(distance, 0, "峰值间隔至少为 1");
        self.peak_min_distance = distance;
        self
    }

    /// 覆写扫描仪标称半角 (度).
    ///
    /// 半角必须位于 `(0, 90)` 之间, 否则程序 panic.
    pub fn with_design_half_angle(mut self, degrees: f64) -> Self {
        assert!(
            degrees > 0.0 && degrees < 90.0,
            "半角 `{degrees}` 越界"
        );
        self.design_half_angle_deg = degrees;
        self
    }

    /// 刻度尺亮度阈值.
    #[inline]
    pub fn scale_bar_threshold(&self) -> u8 {
        self.scale_bar_threshold
    }

    /// 刻度尺探测行/列.
    #[inline]
    pub fn scale_bar_probe_index(&self) -> usize {
        self.scale_bar_probe_index
    }

    /// 内容边界行和上限.
    #[inline]
    pub fn content_row_sum_max(&self) -> u64 {
        self.content_row_sum_max
    }

    /// 工作帧左侧裁掉的列数.
    #[inline]
    pub fn crop_left(&self) -> usize {
        self.crop_left
    }

    /// 左上覆盖层区域.
    #[inline]
    pub fn overlay_left(&self) -> Idx2d {
        self.overlay_left
    }

    /// 右上覆盖层区域.
    #[inline]
    pub fn overlay_right(&self) -> Idx2d {
        self.overlay_right
    }

    /// 探测行行和下限.
    #[inline]
    pub fn probe_row_sum_min(&self) -> u64 {
        self.probe_row_sum_min
    }

    /// 峰值最小间隔.
    #[inline]
    pub fn peak_min_distance(&self) -> usize {
        self.peak_min_distance
    }

    /// 扫描仪标称半角 (度).
    #[inline]
    pub fn design_half_angle_deg(&self) -> f64 {
        self.design_half_angle_deg
    }

    /// 工作帧像素清洗: 范围以外的像素 (覆盖层文字, 底噪) 清零.
    #[inline]
    pub fn clamp(&self, p: u8) -> u8 {
        if p > self.clamp_high || p < self.clamp_low {
            0
        } else {
            p
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutSpec;

    #[test]
    fn test_layout_clamp() {
        let spec = LayoutSpec::default();
        assert_eq!(spec.clamp(4), 0);
        assert_eq!(spec.clamp(5), 5);
        assert_eq!(spec.clamp(200), 200);
        assert_eq!(spec.clamp(201), 0);

        let spec = spec.with_clamp(0, 255);
        assert!((0..=255u8).all(|p| spec.clamp(p) == p));
    }

    #[test]
    #[should_panic]
    fn test_layout_bad_clamp() {
        let _ = LayoutSpec::new().with_clamp(10, 9);
    }

    #[test]
    #[should_panic]
    fn test_layout_bad_angle() {
        let _ = LayoutSpec::new().with_design_half_angle(90.0);
    }
}
