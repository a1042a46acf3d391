//! 将展平图像重新投影为扇形图像.

use crate::consts::gray::BLACK;
use crate::mapping::CoordGrid;
use crate::resample::resample_bilinear_or;
use crate::sector::{arc_to_angle, FanSector, InitFanError};
use ndarray::{Array2, ArrayView2};

/// 将 "深度 × 角度" 展平图像 `masked` 重新投影为扇形图像, 画布上 1 像素 = 1 毫米.
///
/// - `depth`: 扇区可用深度 (毫米);
/// - `alpha_rad`: 扇区半角 (弧度);
/// - `offset`: 顶点到扇区内弧的距离 (毫米), 取整后作为内半径.
///
/// `masked` 的第 `i` 行对应半径 `floor(offset) + i`, 第 `j` 列对应角度 `j - round(alpha)` 度,
/// 与 [`crate::mapping::build_sampling_grid`] 的输出一致.
/// 扇区以外的像素为黑色; 扇区以内的坐标被钳制到 `masked` 的范围内.
///
/// # 返回值
///
/// - `masked` 为空时, 返回 `0 × 0` 图像;
/// - 扇区参数非法时, 返回 [`InitFanError`].
pub fn interp_img(
    masked: ArrayView2<u8>,
    depth: f64,
    alpha_rad: f64,
    offset: f64,
) -> Result<Array2<u8>, InitFanError> {
    let (rows, cols) = masked.dim();
    if rows == 0 || cols == 0 {
        return Ok(Array2::zeros((0, 0)));
    }

    let inner = offset.floor();
    let fan = FanSector::new((0.0, 0.0), alpha_rad, inner, inner + depth)?;
    let ((h_min, w_min), (h_max, w_max)) = fan.bounding_box();
    let (top, left) = (h_min.floor(), w_min.floor());
    let height = (h_max.ceil() - top) as usize + 1;
    let width = (w_max.ceil() - left) as usize + 1;

    let alpha_steps = fan.half_angle().round();
    let (last_row, last_col) = ((rows - 1) as f64, (cols - 1) as f64);
    let grid = CoordGrid::from_fn((height, width), |(i, j)| {
        let p = (top + i as f64, left + j as f64);
        if !fan.contains(p) {
            return (f64::NAN, f64::NAN);
        }
        let (r, arc) = fan.polar_of(p);
        (
            (r - fan.inner()).clamp(0.0, last_row),
            (arc_to_angle(arc) + alpha_steps).clamp(0.0, last_col),
        )
    });
    log::trace!("reprojected canvas {:?} for {:?}", grid.shape(), fan);
    Ok(resample_bilinear_or(&grid, masked, BLACK))
}

#[cfg(test)]
mod tests {
    use super::interp_img;
    use crate::sector::{angle_to_arc, InitFanError};
    use ndarray::Array2;

    #[test]
    fn test_interp_img_canvas() {
        // 深度 50 毫米, 半角 30 度, 顶点偏移 20 毫米.
        let flat = Array2::from_shape_fn((50, 60), |(i, _)| i as u8);
        let img = interp_img(flat.view(), 50.0, angle_to_arc(30.0), 20.0).unwrap();
        // 高: ceil(70) - floor(20 cos 30) + 1; 宽: 2 * ceil(70 sin 30) + 1.
        assert_eq!(img.dim(), (54, 71));

        // 中轴 (第 35 列) 上半径 45 处, 即展平图像第 25 行.
        assert_eq!(img[(45 - 17, 35)], 25);
        // 左上角在扇区之外.
        assert_eq!(img[(0, 0)], 0);
        // 中轴上内弧以内.
        assert_eq!(img[(0, 35)], 0);
    }

    #[test]
    fn test_interp_img_uniform_fan() {
        let flat = Array2::from_elem((30, 40), 100u8);
        let img = interp_img(flat.view(), 30.0, angle_to_arc(20.0), 10.5).unwrap();
        let bright = img.iter().filter(|&&p| p == 100).count();
        assert!(bright > 0);
        assert!(img.iter().all(|&p| p == 0 || p == 100));
        // 外弧最深处.
        let (h, w) = img.dim();
        assert_eq!(img[(h - 1, w / 2)], 100);
    }

    #[test]
    fn test_interp_img_degenerate() {
        let empty = Array2::<u8>::zeros((0, 10));
        let img = interp_img(empty.view(), 10.0, 0.5, 5.0).unwrap();
        assert_eq!(img.dim(), (0, 0));

        let flat = Array2::<u8>::zeros((4, 4));
        let err = interp_img(flat.view(), 10.0, 2.0, 5.0).unwrap_err();
        assert_eq!(err, InitFanError::HalfArcOutOfRange);
        let err = interp_img(flat.view(), 0.0, 0.5, 5.0).unwrap_err();
        assert_eq!(err, InitFanError::EmptyRadius);
    }
}
