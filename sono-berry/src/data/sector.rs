//! 超声探头的扇形视野.
//!
//! 我们一般使用行优先编码存储二维图像. 其中行就是 "Height" (垂直方向), 列就是 "Width" (水平方向).
//! 然后将 "Height" 作为平面直角坐标系中的 x 轴, 将 "Width" 作为平面直角坐标系中的 y 轴,
//! 这样相当于将原先的平面直角坐标系按顺时针旋转了 90 度.
//!
//! 在这种约定下, 凸阵探头的扇区以顶点为原点, 沿 "Height" 增加的方向 (弧度 `0`) 对称张开.
//! 扇区左侧 (w 减少的一侧) 弧度为负, 右侧为正, 取值范围为 `(-PI, PI]`.

use crate::Idx2dF;
use std::fmt::Formatter;

/// 弧度转换为角度.
#[inline]
pub(crate) fn arc_to_angle(arc: f64) -> f64 {
    arc * 180.0 * std::f64::consts::FRAC_1_PI
}

/// 角度转换为弧度.
#[inline]
pub(crate) fn angle_to_arc(angle: f64) -> f64 {
    angle * std::f64::consts::PI / 180.0
}

/// 将相对原点的 `(h, w)` 向量转换为极坐标 `(半径, 弧度)`.
///
/// # 弧度规范
///
/// - h 增加的方向弧度为 `0`;
/// - w 增加的方向弧度为 `pi / 2`;
/// - w 减少的方向弧度为 `-pi / 2`;
/// - h 减少的方向弧度为 `pi`.
#[inline]
pub fn polar((h, w): Idx2dF) -> (f64, f64) {
    (h.hypot(w), f64::atan2(w, h))
}

/// [`polar`] 的逆变换. 返回相对原点的 `(h, w)` 向量.
#[inline]
pub fn cartesian(radius: f64, arc: f64) -> Idx2dF {
    let (sin, cos) = arc.sin_cos();
    (radius * cos, radius * sin)
}

/// 扇形视野, 由顶点、半角和内外两个半径组成. 扇区关于弧度 `0` 方向对称.
///
/// 该结构不负责检测图像越界, 也不关心坐标单位 (像素或毫米), 只要求各量单位一致.
#[derive(Copy, Clone, PartialEq)]
pub struct FanSector {
    /// 顶点坐标, 可以位于图像之外 (通常在图像上方).
    apex: Idx2dF,
    /// (0, pi / 2)
    half_arc: f64,
    /// [0, outer)
    inner: f64,
    outer: f64,
}

/// 内部会将弧度转换为角度, 因为角度更加直观. 另外压缩到一行.
impl std::fmt::Debug for FanSector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "FanSector {{ apex: ({:.2}, {:.2}), half: {:.4}°, radius: [{:.2}, {:.2}] }}",
            self.apex.0,
            self.apex.1,
            arc_to_angle(self.half_arc),
            self.inner,
            self.outer
        ))
    }
}

/// `FanSector` 初始化错误.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum InitFanError {
    /// 顶点无法用有限 `f64` 表示.
    #[error("fan apex is not finite")]
    ApexNotFinite,

    /// 半角超出 `(0, pi / 2)`.
    #[error("fan half angle is outside (0, pi / 2)")]
    HalfArcOutOfRange,

    /// 空半径范围或负半径. 该情况不在 `FanSector` 的考虑范围内.
    #[error("fan radius range is empty or negative")]
    EmptyRadius,
}

impl FanSector {
    /// 以 `apex` 为顶点, `half_arc` 为半角 (弧度), 半径位于 `[inner, outer]`
    /// 之间的区域创建一个扇区.
    ///
    /// # 返回值
    ///
    /// - 当 `apex` 任一分量不是有限值时, 返回 `Err(InitFanError::ApexNotFinite)`;
    /// - 当 `half_arc` 不在 `(0, pi / 2)` 范围内时, 返回 `Err(InitFanError::HalfArcOutOfRange)`;
    /// - 当 `inner < 0` 或 `inner >= outer` (包括 NaN) 时, 返回 `Err(InitFanError::EmptyRadius)`;
    /// - 其他情况下成功, 返回 `Ok(FanSector)`.
    pub fn new(apex: Idx2dF, half_arc: f64, inner: f64, outer: f64) -> Result<Self, InitFanError> {
        if !apex.0.is_finite() || !apex.1.is_finite() {
            return Err(InitFanError::ApexNotFinite);
        }
        if !(half_arc > 0.0 && half_arc < std::f64::consts::FRAC_PI_2) {
            return Err(InitFanError::HalfArcOutOfRange);
        }
        if !(inner >= 0.0 && inner < outer && outer.is_finite()) {
            return Err(InitFanError::EmptyRadius);
        }
        Ok(Self {
            apex,
            half_arc,
            inner,
            outer,
        })
    }

    /// 获取半角 (角度).
    #[inline]
    pub fn half_angle(&self) -> f64 {
        arc_to_angle(self.half_arc)
    }

    /// 获取内半径.
    #[inline]
    pub fn inner(&self) -> f64 {
        self.inner
    }

    /// 获取点 `point` 相对于顶点的极坐标 `(半径, 弧度)`.
    #[inline]
    pub fn polar_of(&self, (h, w): Idx2dF) -> (f64, f64) {
        polar((h - self.apex.0, w - self.apex.1))
    }

    /// 判断点 `point` 是否被包含在扇区中 (边界包含在内).
    pub fn contains(&self, point: Idx2dF) -> bool {
        let (r, arc) = self.polar_of(point);
        if !r.is_finite() || !arc.is_finite() {
            return false;
        }
        (self.inner..=self.outer).contains(&r) && arc.abs() <= self.half_arc
    }

    /// 扇区在 `(h, w)` 平面上的包围盒: `((h_min, w_min), (h_max, w_max))`.
    pub fn bounding_box(&self) -> (Idx2dF, Idx2dF) {
        let (sin, cos) = self.half_arc.sin_cos();
        let h_min = self.apex.0 + self.inner * cos;
        let h_max = self.apex.0 + self.outer;
        let half_w = self.outer * sin;
        (
            (h_min, self.apex.1 - half_w),
            (h_max, self.apex.1 + half_w),
        )
    }
}
