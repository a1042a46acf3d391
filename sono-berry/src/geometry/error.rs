//! 几何推断错误.

use crate::Idx2d;

/// 刻度尺方向.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScaleAxis {
    /// 行方向 (在固定列上沿 "Height" 扫描).
    Row,

    /// 列方向 (在固定行上沿 "Width" 扫描).
    Column,
}

/// 几何推断的运行时错误. 每个变体对应一个未能找到的界面地标.
///
/// 出现这些错误意味着输入帧与预期的扫描仪布局不符, 重试没有意义.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// 刻度尺标记像素不足.
    ///
    /// `found` 代表实际找到的标记像素数, 至少需要 3 个.
    #[error("scale bar along {axis:?} axis has {found} marked pixels, at least 3 required")]
    ScaleBar {
        /// 刻度尺方向.
        axis: ScaleAxis,
        /// 实际找到的标记像素数.
        found: usize,
    },

    /// 找不到行和低于阈值的内容边界行.
    #[error("no content boundary row with intensity sum below {threshold}")]
    NoContentBoundary {
        /// 行和阈值.
        threshold: u64,
    },

    /// 裁剪后的工作帧为空.
    #[error("working frame is empty (shape {shape:?})")]
    EmptyWorkingFrame {
        /// 工作帧形状.
        shape: Idx2d,
    },

    /// 工作帧中找不到行和高于阈值的探测行.
    #[error("no probe row with intensity sum above {threshold}")]
    NoProbeRow {
        /// 行和阈值.
        threshold: u64,
    },

    /// 探测行上的主峰数量不是 2.
    #[error("probe row {row} has {found} dominant peaks, exactly 2 required")]
    PeakCount {
        /// 工作帧中的探测行.
        row: usize,
        /// 实际找到的主峰个数.
        found: usize,
    },

    /// 扇区中轴列上没有非零像素, 或该列不存在.
    #[error("bisector column {column} has no non-zero pixel")]
    EmptyBisector {
        /// 工作帧中的中轴列.
        column: usize,
    },
}
