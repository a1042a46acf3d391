//! 小数坐标上的双线性取样.
//!
//! 给定 [`CoordGrid`] 与源图像, 逐单元取样生成同形状的 `u8` 图像. 源图像只读, 输出总是新数组.
//!
//! 单元之间相互独立, 因此并行版本 [`par_resample_bilinear`] 按行切分, 与串行版本逐字节一致.

use crate::mapping::CoordGrid;
use crate::{Idx2d, Idx2dF};
use itertools::izip;
use ndarray::{Array2, ArrayView2, ArrayViewMut1, Axis, Zip};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::prelude::*;
    }
}

/// 取样坐标落在源图像以外时的处理方式.
///
/// 源图像有效范围为 `[0, h - 1] × [0, w - 1]`, 边界上的坐标不算越界.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Boundary {
    /// 越界即报错.
    Reject,

    /// 将坐标钳制到有效范围后照常插值.
    Clamp,

    /// 越界单元直接填充给定值.
    Constant(u8),
}

/// 取样运行时错误.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResampleError {
    /// 坐标越界, 且边界策略不允许.
    #[error("cell {cell:?} samples ({y}, {x}) outside source of shape {shape:?}")]
    OutOfBounds {
        /// 输出单元.
        cell: Idx2d,
        /// 列坐标.
        x: f64,
        /// 行坐标.
        y: f64,
        /// 源图像形状.
        shape: Idx2d,
    },

    /// 坐标为 NaN 或无穷, 且边界策略不是 [`Boundary::Constant`].
    #[error("cell {cell:?} samples non-finite coordinate ({y}, {x})")]
    NonFinite {
        /// 输出单元.
        cell: Idx2d,
        /// 列坐标.
        x: f64,
        /// 行坐标.
        y: f64,
    },
}

/// 取样结果.
pub type ResampleResult<T> = Result<T, ResampleError>;

/// 单个坐标无法取样的原因.
enum Miss {
    Outside,
    NonFinite,
}

/// 绑定了源图像和边界策略的取样器.
#[derive(Copy, Clone)]
struct Bilinear<'a> {
    frame: ArrayView2<'a, u8>,
    boundary: Boundary,
}

impl<'a> Bilinear<'a> {
    fn new(frame: ArrayView2<'a, u8>, boundary: Boundary) -> Self {
        Self { frame, boundary }
    }

    /// 在 `(y, x)` 处取样.
    fn at(&self, (y, x): Idx2dF) -> Result<u8, Miss> {
        if !y.is_finite() || !x.is_finite() {
            return match self.boundary {
                Boundary::Constant(v) => Ok(v),
                _ => Err(Miss::NonFinite),
            };
        }

        let (h, w) = self.frame.dim();
        if h == 0 || w == 0 {
            return match self.boundary {
                Boundary::Constant(v) => Ok(v),
                _ => Err(Miss::Outside),
            };
        }
        let (max_y, max_x) = ((h - 1) as f64, (w - 1) as f64);
        let inside = (0.0..=max_y).contains(&y) && (0.0..=max_x).contains(&x);
        if inside {
            return Ok(self.blend(y, x));
        }
        match self.boundary {
            Boundary::Reject => Err(Miss::Outside),
            Boundary::Clamp => Ok(self.blend(y.clamp(0.0, max_y), x.clamp(0.0, max_x))),
            Boundary::Constant(v) => Ok(v),
        }
    }

    /// 有效范围内的插值. 权重取小数部分, 因此坐标为整数时结果等于该像素本身.
    fn blend(&self, y: f64, x: f64) -> u8 {
        let (top, left) = (y.floor(), x.floor());
        let (bottom, right) = (y.ceil(), x.ceil());
        let (wy, wx) = (y - top, x - left);
        let px = |r: f64, c: f64| self.frame[(r as usize, c as usize)] as f64;

        let upper = (1.0 - wx) * px(top, left) + wx * px(top, right);
        let lower = (1.0 - wx) * px(bottom, left) + wx * px(bottom, right);
        let v = (1.0 - wy) * upper + wy * lower;
        v.clamp(0.0, 255.0).round() as u8
    }

    /// 填充输出的第 `i` 行.
    fn fill_row(&self, grid: &CoordGrid, i: usize, row: ArrayViewMut1<u8>) -> ResampleResult<()> {
        let (xs, ys) = (grid.x(), grid.y());
        for (j, (out, &x, &y)) in izip!(row, xs.row(i), ys.row(i)).enumerate() {
            *out = self.at((y, x)).map_err(|miss| match miss {
                Miss::Outside => ResampleError::OutOfBounds {
                    cell: (i, j),
                    x,
                    y,
                    shape: self.frame.dim(),
                },
                Miss::NonFinite => ResampleError::NonFinite { cell: (i, j), x, y },
            })?;
        }
        Ok(())
    }
}

/// 按 `grid` 对 `frame` 做双线性取样, 越界按 `boundary` 处理.
///
/// 返回形状与 `grid` 相同的新图像. 出错时返回按行优先顺序遇到的第一个错误.
pub fn resample_bilinear(
    grid: &CoordGrid,
    frame: ArrayView2<u8>,
    boundary: Boundary,
) -> ResampleResult<Array2<u8>> {
    let sampler = Bilinear::new(frame, boundary);
    let mut out = Array2::zeros(grid.shape());
    for (i, row) in out.axis_iter_mut(Axis(0)).enumerate() {
        sampler.fill_row(grid, i, row)?;
    }
    Ok(out)
}

/// [`resample_bilinear`] 的并行版本, 输出与错误都与串行版本一致.
#[cfg(feature = "rayon")]
pub fn par_resample_bilinear(
    grid: &CoordGrid,
    frame: ArrayView2<u8>,
    boundary: Boundary,
) -> ResampleResult<Array2<u8>> {
    let sampler = Bilinear::new(frame, boundary);
    let mut out = Array2::zeros(grid.shape());
    let errors: Vec<Option<ResampleError>> = out
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .map(|(i, row)| sampler.fill_row(grid, i, row).err())
        .collect();
    match errors.into_iter().flatten().next() {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

/// 不会失败的取样: 越界或非有限坐标一律填充 `fill`.
pub fn resample_bilinear_or(grid: &CoordGrid, frame: ArrayView2<u8>, fill: u8) -> Array2<u8> {
    let sampler = Bilinear::new(frame, Boundary::Constant(fill));
    Zip::from(grid.y())
        .and(grid.x())
        .map_collect(|&y, &x| sampler.at((y, x)).unwrap_or(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array2};

    fn frame() -> Array2<u8> {
        arr2(&[[0, 10, 20, 30], [40, 50, 60, 70], [80, 90, 100, 110]])
    }

    fn grid_of(points: &[Idx2dF]) -> CoordGrid {
        CoordGrid::from_fn((1, points.len()), |(_, j)| points[j])
    }

    #[test]
    fn test_integer_coordinates_are_exact() {
        let f = frame();
        let grid = CoordGrid::from_fn(f.dim(), |(i, j)| (i as f64, j as f64));
        let out = resample_bilinear(&grid, f.view(), Boundary::Reject).unwrap();
        assert_eq!(out, f);
    }

    #[test]
    fn test_degenerate_axes() {
        let f = frame();
        // x 为整数时只在行方向插值, y 为整数时只在列方向插值.
        let grid = grid_of(&[(0.5, 1.0), (1.0, 2.5), (2.0, 3.0), (0.25, 0.0)]);
        let out = resample_bilinear(&grid, f.view(), Boundary::Reject).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![30, 65, 110, 10]);
    }

    #[test]
    fn test_bilinear_blend() {
        let f = frame();
        let grid = grid_of(&[(0.5, 0.5), (1.5, 2.5), (0.1, 0.9)]);
        let out = resample_bilinear(&grid, f.view(), Boundary::Reject).unwrap();
        // (0 + 10 + 40 + 50) / 4 = 25; (60 + 70 + 100 + 110) / 4 = 85;
        // 0.9 * (0.1 * 0 + 0.9 * 10) + 0.1 * (0.1 * 40 + 0.9 * 50) = 13.
        assert_eq!(out.row(0).to_vec(), vec![25, 85, 13]);
    }

    #[test]
    fn test_boundary_policies() {
        let f = frame();
        let grid = grid_of(&[(1.0, 1.0), (-0.5, 1.0), (1.0, 3.5)]);

        let err = resample_bilinear(&grid, f.view(), Boundary::Reject).unwrap_err();
        assert_eq!(
            err,
            ResampleError::OutOfBounds {
                cell: (0, 1),
                x: 1.0,
                y: -0.5,
                shape: (3, 4)
            }
        );

        let out = resample_bilinear(&grid, f.view(), Boundary::Clamp).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![50, 10, 70]);

        let out = resample_bilinear(&grid, f.view(), Boundary::Constant(7)).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![50, 7, 7]);
    }

    #[test]
    fn test_non_finite_coordinates() {
        let f = frame();
        let grid = grid_of(&[(0.0, 0.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)]);

        for boundary in [Boundary::Reject, Boundary::Clamp] {
            let err = resample_bilinear(&grid, f.view(), boundary).unwrap_err();
            assert!(matches!(err, ResampleError::NonFinite { cell: (0, 1), .. }));
        }
        let out = resample_bilinear(&grid, f.view(), Boundary::Constant(3)).unwrap();
        assert_eq!(out.row(0).to_vec(), vec![0, 3, 3]);
        assert_eq!(resample_bilinear_or(&grid, f.view(), 3), out);
    }

    #[test]
    fn test_empty_source_and_grid() {
        let empty = Array2::<u8>::zeros((0, 4));
        let grid = grid_of(&[(0.0, 0.0)]);
        assert!(resample_bilinear(&grid, empty.view(), Boundary::Clamp).is_err());
        assert_eq!(resample_bilinear_or(&grid, empty.view(), 9)[(0, 0)], 9);

        let grid = CoordGrid::from_fn((0, 5), |_| (0.0, 0.0));
        let out = resample_bilinear(&grid, frame().view(), Boundary::Reject).unwrap();
        assert_eq!(out.dim(), (0, 5));
    }

    #[test]
    fn test_source_untouched() {
        let f = frame();
        let before = f.clone();
        let grid = CoordGrid::from_fn((5, 7), |(i, j)| (i as f64 * 0.4, j as f64 * 0.45));
        let _ = resample_bilinear(&grid, f.view(), Boundary::Clamp).unwrap();
        assert_eq!(f, before);
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_parallel_matches_serial() {
        let f = Array2::from_shape_fn((40, 60), |(i, j)| ((i * 7 + j * 3) % 256) as u8);
        let grid = CoordGrid::from_fn((90, 70), |(i, j)| {
            (i as f64 * 0.47 - 1.3, j as f64 * 0.91 - 2.2)
        });
        for boundary in [Boundary::Clamp, Boundary::Constant(0)] {
            let serial = resample_bilinear(&grid, f.view(), boundary).unwrap();
            let parallel = par_resample_bilinear(&grid, f.view(), boundary).unwrap();
            assert_eq!(serial, parallel);
        }

        // 多个越界单元时, 两者报告同一个 (行优先意义下第一个) 错误.
        let serial = resample_bilinear(&grid, f.view(), Boundary::Reject).unwrap_err();
        let parallel = par_resample_bilinear(&grid, f.view(), Boundary::Reject).unwrap_err();
        assert_eq!(serial, parallel);
        assert!(matches!(serial, ResampleError::OutOfBounds { cell: (0, 0), .. }));
    }
}
