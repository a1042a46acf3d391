//! 展平网格到工作帧像素坐标的逆映射.
//!
//! 对输出网格的每个 `(深度, 角度)` 单元, 求它在工作帧中的 **小数** 像素坐标, 再交给
//! [`crate::resample`] 取样. 这样输出图像不会出现正向映射带来的空洞.
//!
//! 坐标约定与 [`crate::sector`] 一致: 角度 `0` 指向 "Height" 增加的方向.

use crate::geometry::GeometryParams;
use crate::sector::{angle_to_arc, arc_to_angle, cartesian, polar};
use crate::{Idx2d, Idx2dF};
use ndarray::{Array1, Array2, ArrayView2, Zip};
use std::ops::Deref;

/// 两个同形状的小数坐标网格. 第 `(i, j)` 个单元要取样的工作帧位置为 `(y[i, j], x[i, j])`.
///
/// 坐标可以越界, 也可以是 NaN, 如何处理交给取样器.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordGrid {
    x: Array2<f64>,
    y: Array2<f64>,
}

impl CoordGrid {
    /// 由列坐标 `x` 与行坐标 `y` 构建.
    ///
    /// 如果两者形状不同, 则程序 panic.
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Self {
        assert_eq!(x.dim(), y.dim(), "x 和 y 网格形状必须一致");
        Self { x, y }
    }

    /// 对 `shape` 内的每个单元调用 `f`, `f` 返回该单元的 `(y, x)`.
    pub fn from_fn<F>(shape: Idx2d, mut f: F) -> Self
    where
        F: FnMut(Idx2d) -> Idx2dF,
    {
        let mut x = Array2::zeros(shape);
        let mut y = Array2::zeros(shape);
        Zip::indexed(&mut y).and(&mut x).for_each(|idx, y, x| {
            (*y, *x) = f(idx);
        });
        Self { x, y }
    }

    /// 网格形状 (行, 列).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.x.dim()
    }

    /// 网格是否没有任何单元?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// 列坐标.
    #[inline]
    pub fn x(&self) -> ArrayView2<f64> {
        self.x.view()
    }

    /// 行坐标.
    #[inline]
    pub fn y(&self) -> ArrayView2<f64> {
        self.y.view()
    }

    /// 获取单元 `cell` 的 `(y, x)`. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, cell: Idx2d) -> Option<Idx2dF> {
        Some((*self.y.get(cell)?, *self.x.get(cell)?))
    }

    /// 统计落在 `(rows, cols)` 大小的图像以外 (含 NaN) 的单元个数.
    pub fn count_outside(&self, (rows, cols): Idx2d) -> usize {
        let (max_y, max_x) = (rows as f64 - 1.0, cols as f64 - 1.0);
        Zip::from(&self.y)
            .and(&self.x)
            .fold(0, |acc, &y, &x| {
                let inside = (0.0..=max_y).contains(&y) && (0.0..=max_x).contains(&x);
                acc + usize::from(!inside)
            })
    }
}

/// 极坐标 `(毫米, 度)` 与工作帧像素坐标 `(y, x)` 之间的仿射换算.
///
/// 顶点位于中轴之上 `offset - first_row_index` 行处 (通常在工作帧之外), 中轴列取工作帧宽度的一半.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PolarMap {
    row_cm: f64,
    column_cm: f64,
    center_x: f64,
    shift: f64,
}

impl PolarMap {
    /// 由几何参数 `params` 与工作帧列数 `columns` 构建.
    pub fn new(params: &GeometryParams, columns: usize) -> Self {
        Self {
            row_cm: params.row_cm,
            column_cm: params.column_cm,
            center_x: columns as f64 / 2.0,
            shift: params.offset - params.first_row_index as f64,
        }
    }

    /// 深度 `depth_mm` 毫米, 角度 `angle_deg` 度处的工作帧像素坐标 `(y, x)`.
    #[inline]
    pub fn to_pixel(&self, depth_mm: f64, angle_deg: f64) -> Idx2dF {
        let (dy, dx) = cartesian(depth_mm, angle_to_arc(angle_deg));
        (
            dy / 10.0 * self.row_cm - self.shift,
            dx / 10.0 * self.column_cm + self.center_x,
        )
    }

    /// [`Self::to_pixel`] 的逆变换. 返回 `(毫米, 度)`.
    #[inline]
    pub fn to_polar(&self, (y, x): Idx2dF) -> (f64, f64) {
        let dy = (y + self.shift) / self.row_cm * 10.0;
        let dx = (x - self.center_x) / self.column_cm * 10.0;
        let (r, arc) = polar((dy, dx));
        (r, arc_to_angle(arc))
    }
}

/// 展平网格: 每个单元的取样坐标, 以及两条轴的刻度.
#[derive(Clone, Debug)]
pub struct SamplingGrid {
    coords: CoordGrid,
    depth_mm: Array1<f64>,
    angle_deg: Array1<f64>,
}

impl SamplingGrid {
    /// 深度轴 (毫米), 每行一个值, 步长 1.
    #[inline]
    pub fn depth_mm(&self) -> &Array1<f64> {
        &self.depth_mm
    }

    /// 角度轴 (度), 每列一个值, 步长 1.
    #[inline]
    pub fn angle_deg(&self) -> &Array1<f64> {
        &self.angle_deg
    }
}

impl Deref for SamplingGrid {
    type Target = CoordGrid;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.coords
    }
}

/// 为几何参数 `params` 与 `work_shape` 大小的工作帧构建展平网格.
///
/// - 深度轴: `[floor(offset_mm), floor(offset_mm + r_mm))`, 步长 1 毫米;
/// - 角度轴: `[-round(alpha), round(alpha))`, 步长 1 度.
///
/// 任一轴为空时, 网格为空. 是否视为错误由调用方决定.
pub fn build_sampling_grid(params: &GeometryParams, work_shape: Idx2d) -> SamplingGrid {
    let map = PolarMap::new(params, work_shape.1);
    let (start, _) = params.depth_bounds();
    let alpha = params.alpha_steps();
    let shape = params.flat_shape();
    let depth_mm = Array1::from_shape_fn(shape.0, |i| (start + i as i64) as f64);
    let angle_deg = Array1::from_shape_fn(shape.1, |j| (j as i64 - alpha) as f64);

    let coords = CoordGrid::from_fn(shape, |(i, j)| {
        map.to_pixel(depth_mm[i], angle_deg[j])
    });
    log::trace!(
        "sampling grid {:?}: {} cells outside working frame {:?}",
        coords.shape(),
        coords.count_outside(work_shape),
        work_shape
    );
    SamplingGrid {
        coords,
        depth_mm,
        angle_deg,
    }
}
