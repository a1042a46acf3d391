//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是 (被清零的) 背景?
    #[inline]
    pub const fn is_black(p: u8) -> bool {
        matches!(p, BLACK)
    }
}

/// 扫描仪界面布局阈值.
///
/// 这些值编码的是某一款扫描仪截图的界面布局与覆盖层位置, 不是物理推导出的量.
/// 换用其它型号时, 应通过 [`crate::geometry::LayoutSpec`] 重新指定.
pub mod layout {
    /// 刻度尺像素的亮度下限 (不含).
    pub const SCALE_BAR_THRESHOLD: u8 = 10;

    /// 刻度尺的探测行/列索引. 行方向刻度在该列上扫描, 列方向刻度在该行上扫描.
    pub const SCALE_BAR_PROBE_INDEX: usize = 2;

    /// 行和低于该值的第一行即为内容边界.
    pub const CONTENT_ROW_SUM_MAX: u64 = 1500;

    /// 工作帧裁掉的左侧列数 (刻度尺所在区域).
    pub const CROP_LEFT_COLUMNS: usize = 6;

    /// 高于该值的像素被视为覆盖层文字并清零.
    pub const CLAMP_HIGH: u8 = 200;

    /// 低于该值的像素被视为底噪并清零.
    pub const CLAMP_LOW: u8 = 5;

    /// 工作帧左上角覆盖层图标区域 `(行数, 列数)`.
    pub const OVERLAY_TOP_LEFT: (usize, usize) = (100, 100);

    /// 工作帧右上角覆盖层 logo 区域 `(行数, 列数)`.
    pub const OVERLAY_TOP_RIGHT: (usize, usize) = (100, 200);

    /// 行和高于该值的第一行即为探测行, 它应当在顶点附近横穿扇区两侧.
    pub const PROBE_ROW_SUM_MIN: u64 = 200;

    /// 两个峰值之间的最小间隔 (像素).
    pub const PEAK_MIN_DISTANCE: usize = 100;

    /// 扫描仪标称的扇区半角 (度). 扇区全角为 84 度.
    pub const DESIGN_HALF_ANGLE_DEG: f64 = 42.0;
}

/// 去噪阈值.
pub mod mask {
    /// 不低于该值的像素被视为 "白色" 组织界面.
    pub const MASK_WHITE_THRESHOLD: u8 = 120;

    /// 展平图像顶部行均值低于该值的连续行被视为噪声行.
    pub const MASK_NOISE_ROW_MEAN: f64 = 3.0;
}
