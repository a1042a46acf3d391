//! 从像素强度推断扇区几何.
//!
//! 输入是扫描仪的屏幕截图, 而不是原始波束合成数据. 因此这里的一切都建立在界面布局的经验规则上:
//!
//! 1. 画面边缘的刻度尺给出行、列两个方向上的 "每厘米像素数";
//! 2. 顶部界面条的行和很高, 行和首次跌落到阈值以下的行是内容边界;
//! 3. 裁剪、清洗后的工作帧中, 第一个行和足够大的行 (探测行) 横穿扇区两侧边缘,
//!   两侧边缘表现为两个相距较远的峰值;
//! 4. 扇区中轴列上第一个和最后一个非零像素给出扇区的深度范围.
//!
//! 所有阈值见 [`LayoutSpec`].

mod error;
mod layout;
mod peaks;

pub use error::{GeometryError, ScaleAxis};
pub use layout::LayoutSpec;
pub use peaks::find_peaks;

use crate::consts::gray::{is_black, BLACK};
use crate::sector::{angle_to_arc, arc_to_angle};
use crate::{Idx2d, RawFrame};
use ndarray::{s, Array2, ArrayView1, ArrayView2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 几何推断运行时错误.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// 扇区几何参数.
///
/// 该结构完全透明. 除 `row_cm`, `column_cm` 以外, 所有像素量都以 **工作帧** 为参考系.
///
/// # 注意
///
/// `row_cm` 和 `column_cm` 是刻度尺刻度的像素间距, 即 **每厘米像素数**,
/// 而不是每像素厘米数. 下游所有公式都按此含义使用它们.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryParams {
    /// 行方向 (深度方向) 每厘米像素数.
    pub row_cm: f64,

    /// 列方向 (横向) 每厘米像素数.
    pub column_cm: f64,

    /// 经像素纵横比修正后的扇区半角 (弧度).
    pub alpha_real: f64,

    /// 顶点到探测行扇区边缘的距离 (像素, 按行方向尺度).
    pub offset: f64,

    /// 顶点到探测行扇区边缘的距离 (厘米).
    pub offset_cm: f64,

    /// 扇区可用深度 (厘米).
    pub r_cm: f64,

    /// 扇区中轴所在列.
    pub middle_column: usize,

    /// 中轴列上第一个非零像素所在行.
    pub first_row_index: usize,

    /// 原始帧中的内容边界行.
    pub content_row: usize,

    /// 工作帧中的探测行.
    pub probe_row: usize,

    /// 探测行上扇区左右两侧边缘所在列.
    pub edges: Idx2d,
}

impl GeometryParams {
    /// 顶点偏移 (毫米).
    #[inline]
    pub fn offset_mm(&self) -> f64 {
        self.offset_cm * 10.0
    }

    /// 扇区可用深度 (毫米).
    #[inline]
    pub fn r_mm(&self) -> f64 {
        self.r_cm * 10.0
    }

    /// 扇区半角 (角度).
    #[inline]
    pub fn alpha_deg(&self) -> f64 {
        arc_to_angle(self.alpha_real)
    }

    /// 取整后的扇区半角 (整数度), 展平网格的角度轴覆盖 `[-alpha, alpha)`.
    #[inline]
    pub fn alpha_steps(&self) -> i64 {
        self.alpha_deg().round() as i64
    }

    /// 展平网格深度轴的毫米范围 `[floor(offset_mm), floor(offset_mm + r_mm))`.
    #[inline]
    pub fn depth_bounds(&self) -> (i64, i64) {
        let offset_mm = self.offset_mm();
        (
            offset_mm.floor() as i64,
            (offset_mm + self.r_mm()).floor() as i64,
        )
    }

    /// 展平网格的形状 `(深度步数, 角度步数)`.
    pub fn flat_shape(&self) -> Idx2d {
        let (start, end) = self.depth_bounds();
        let depth = (end - start).max(0) as usize;
        let angle = (2 * self.alpha_steps()).max(0) as usize;
        (depth, angle)
    }
}

/// 几何推断结果: 几何参数与裁剪、清洗后的工作帧.
#[derive(Debug, Clone)]
pub struct Inference {
    params: GeometryParams,
    work: Array2<u8>,
}

impl Inference {
    /// 由已知的几何参数 `params` 与工作帧 `work` 直接组装, 跳过推断.
    ///
    /// 调用方负责确保两者相互对应.
    #[inline]
    pub fn new(params: GeometryParams, work: Array2<u8>) -> Self {
        Self { params, work }
    }

    /// 几何参数.
    #[inline]
    pub fn params(&self) -> &GeometryParams {
        &self.params
    }

    /// 工作帧的不可变视图.
    #[inline]
    pub fn work(&self) -> ArrayView2<u8> {
        self.work.view()
    }

    /// 工作帧的形状 (高, 宽).
    #[inline]
    pub fn work_shape(&self) -> Idx2d {
        self.work.dim()
    }

    /// 消费自我, 获得几何参数与工作帧.
    #[inline]
    pub fn into_parts(self) -> (GeometryParams, Array2<u8>) {
        (self.params, self.work)
    }
}

/// 以默认布局 [`LayoutSpec::default`] 推断 `frame` 的扇区几何.
#[inline]
pub fn infer_geometry(frame: &RawFrame) -> GeometryResult<Inference> {
    infer_geometry_with(frame, &LayoutSpec::default())
}

/// 以布局 `spec` 推断 `frame` 的扇区几何.
///
/// 任何一个地标缺失都会返回对应的 [`GeometryError`], 不会以默认值代替.
pub fn infer_geometry_with(frame: &RawFrame, spec: &LayoutSpec) -> GeometryResult<Inference> {
    let view = frame.view();
    let row_cm = scale_bar(view, ScaleAxis::Row, spec)?;
    let column_cm = scale_bar(view, ScaleAxis::Column, spec)?;

    let content_row = content_boundary(view, spec)?;
    let work = working_frame(view, content_row, spec)?;
    let probe_row = probe_row(work.view(), spec)?;
    let (left, right) = sector_edges(work.row(probe_row), probe_row, spec)?;

    let d = (right - left) as f64 / 2.0;
    let d_cm = d / column_cm;
    let middle_column = (left as f64 + d).floor() as usize;

    // 标称半角按像素纵横比修正.
    let alpha_image = angle_to_arc(spec.design_half_angle_deg());
    let alpha_real = (alpha_image.tan() * (row_cm / column_cm)).atan();
    let offset_cm = d_cm / alpha_real.sin();
    let offset = offset_cm * row_cm;

    let (first, last) = bisector_extent(work.view(), middle_column)?;
    let r_cm = (last - first) as f64 / row_cm;

    let params = GeometryParams {
        row_cm,
        column_cm,
        alpha_real,
        offset,
        offset_cm,
        r_cm,
        middle_column,
        first_row_index: first,
        content_row,
        probe_row,
        edges: (left, right),
    };
    log::debug!(
        "sector geometry: scale {:.3}x{:.3} px/cm, alpha {:.3}°, offset {:.3} cm, depth {:.3} cm, edges {:?} on row {}",
        row_cm,
        column_cm,
        params.alpha_deg(),
        offset_cm,
        r_cm,
        params.edges,
        probe_row
    );
    Ok(Inference { params, work })
}

/// 行和.
#[inline]
fn row_sum(row: ArrayView1<u8>) -> u64 {
    row.iter().map(|&p| p as u64).sum()
}

/// 由刻度尺求 `axis` 方向的每厘米像素数.
///
/// 第一个标记像素被视为边界伪影并跳过: `(last - marks[1]) / (len - 2)`.
fn scale_bar(view: ArrayView2<u8>, axis: ScaleAxis, spec: &LayoutSpec) -> GeometryResult<f64> {
    let index = spec.scale_bar_probe_index();
    let (h, w) = view.dim();
    let line = match axis {
        ScaleAxis::Row if index < w => Some(view.column(index)),
        ScaleAxis::Column if index < h => Some(view.row(index)),
        _ => None,
    };
    let marks: Vec<usize> = line
        .map(|line| {
            line.indexed_iter()
                .filter(|(_, &p)| p > spec.scale_bar_threshold())
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default();

    if marks.len() < 3 {
        return Err(GeometryError::ScaleBar {
            axis,
            found: marks.len(),
        });
    }
    let span = marks[marks.len() - 1] - marks[1];
    let scale = span as f64 / (marks.len() - 2) as f64;
    // 标记索引严格递增, 因此 `span > 0`.
    debug_assert!(scale.is_finite() && scale > 0.0);
    Ok(scale)
}

/// 第一个行和低于阈值的行.
fn content_boundary(view: ArrayView2<u8>, spec: &LayoutSpec) -> GeometryResult<usize> {
    let threshold = spec.content_row_sum_max();
    view.rows()
        .into_iter()
        .position(|row| row_sum(row) < threshold)
        .ok_or(GeometryError::NoContentBoundary { threshold })
}

/// 裁剪出工作帧, 清洗像素并清零覆盖层区域. 返回全新的数组.
fn working_frame(
    view: ArrayView2<u8>,
    content_row: usize,
    spec: &LayoutSpec,
) -> GeometryResult<Array2<u8>> {
    let (h, w) = view.dim();
    let crop = spec.crop_left();
    if content_row >= h || crop >= w {
        return Err(GeometryError::EmptyWorkingFrame {
            shape: (h.saturating_sub(content_row), w.saturating_sub(crop)),
        });
    }

    let mut work = view.slice(s![content_row.., crop..]).mapv(|p| spec.clamp(p));
    let (wh, ww) = work.dim();

    let (lh, lw) = spec.overlay_left();
    work.slice_mut(s![..lh.min(wh), ..lw.min(ww)]).fill(BLACK);
    let (rh, rw) = spec.overlay_right();
    work.slice_mut(s![..rh.min(wh), ww.saturating_sub(rw)..])
        .fill(BLACK);
    Ok(work)
}

/// 工作帧中第一个行和高于阈值的行.
fn probe_row(work: ArrayView2<u8>, spec: &LayoutSpec) -> GeometryResult<usize> {
    let threshold = spec.probe_row_sum_min();
    work.rows()
        .into_iter()
        .position(|row| row_sum(row) > threshold)
        .ok_or(GeometryError::NoProbeRow { threshold })
}

/// 探测行上的两个主峰 (左, 右).
fn sector_edges(row: ArrayView1<u8>, index: usize, spec: &LayoutSpec) -> GeometryResult<Idx2d> {
    let peaks = find_peaks(row, spec.peak_min_distance());
    match peaks[..] {
        [left, right] => Ok((left, right)),
        _ => Err(GeometryError::PeakCount {
            row: index,
            found: peaks.len(),
        }),
    }
}

/// 中轴列上第一个和最后一个非零像素所在行.
fn bisector_extent(work: ArrayView2<u8>, column: usize) -> GeometryResult<Idx2d> {
    if column >= work.ncols() {
        return Err(GeometryError::EmptyBisector { column });
    }
    let col = work.column(column);
    let first = col.iter().position(|&p| !is_black(p));
    let last = col.iter().rposition(|&p| !is_black(p));
    match (first, last) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(GeometryError::EmptyBisector { column }),
    }
}
