//! 测试用的合成扫描仪截图.

use crate::mapping::{CoordGrid, PolarMap};
use crate::resample::{resample_bilinear, Boundary};
use crate::{Idx2d, RawFrame};
use ndarray::{s, Array2, ArrayView2};

const HEADER: u8 = 10;
const TICK: u8 = 255;
const TICK_START: usize = 10;
const SCALE_LINE: usize = 2;
const EDGE: u8 = 180;

/// 合成帧的布局. 所有坐标都以原始帧为参考系.
///
/// - 第 `[0, content_row)` 行是亮度为 10 的界面条;
/// - 第 2 列 (行方向) 与第 2 行 (列方向) 从 10 开始按 `tick_pitch` 画刻度;
/// - `probe_row` 上的 `edges` 两列各有一个单像素亮点;
/// - `body_rows` × `body_cols` (闭区间) 填充亮度 `body_value`.
#[derive(Clone, Debug)]
pub(crate) struct ScannerLayout {
    pub shape: Idx2d,
    pub tick_pitch: Idx2d,
    pub content_row: usize,
    pub probe_row: Option<usize>,
    pub edges: Idx2d,
    pub body_rows: Idx2d,
    pub body_cols: Idx2d,
    pub body_value: u8,
}

impl Default for ScannerLayout {
    fn default() -> Self {
        Self {
            shape: (512, 512),
            tick_pitch: (20, 20),
            content_row: 50,
            probe_row: Some(60),
            edges: (200, 312),
            body_rows: (61, 400),
            body_cols: (200, 312),
            body_value: 100,
        }
    }
}

impl ScannerLayout {
    pub fn build(&self) -> RawFrame {
        let (h, w) = self.shape;
        let mut data = Array2::<u8>::zeros(self.shape);
        data.slice_mut(s![..self.content_row, ..]).fill(HEADER);

        for r in (TICK_START..h).step_by(self.tick_pitch.0) {
            data[(r, SCALE_LINE)] = TICK;
        }
        for c in (TICK_START..w).step_by(self.tick_pitch.1) {
            data[(SCALE_LINE, c)] = TICK;
        }

        if let Some(row) = self.probe_row {
            data[(row, self.edges.0)] = EDGE;
            data[(row, self.edges.1)] = EDGE;
        }

        if self.body_value != 0 {
            let (top, bottom) = self.body_rows;
            let (left, right) = self.body_cols;
            data.slice_mut(s![top..=bottom, left..=right])
                .fill(self.body_value);
        }
        RawFrame::from_array(data)
    }
}

/// 将展平图像 `flat` 按 `map` 正向投影回 `shape` 大小的工作帧.
///
/// `flat` 的第 `(i, j)` 个像素对应深度 `depth_start + i` 毫米, 角度 `j - alpha_steps` 度.
/// 扇区以外的像素为 0.
pub(crate) fn forward_project(
    flat: ArrayView2<u8>,
    map: &PolarMap,
    depth_start: f64,
    alpha_steps: i64,
    shape: Idx2d,
) -> Array2<u8> {
    let grid = CoordGrid::from_fn(shape, |(y, x)| {
        let (r_mm, angle_deg) = map.to_polar((y as f64, x as f64));
        (r_mm - depth_start, angle_deg + alpha_steps as f64)
    });
    match resample_bilinear(&grid, flat, Boundary::Constant(0)) {
        Ok(work) => work,
        Err(e) => panic!("constant boundary never fails: {e}"),
    }
}
