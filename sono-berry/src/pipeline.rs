//! 完整处理管线.
//!
//! ```text
//! RawFrame --infer_geometry--> Inference --build_sampling_grid--> SamplingGrid
//!          --resample--> 展平图像 --mask--> 去噪图像 --interp_img--> 扇形图像
//! ```
//!
//! 每一步都只读取上一步的输出, 不修改输入帧.

use crate::consts::gray::BLACK;
use crate::geometry::{infer_geometry_with, GeometryError, GeometryParams, Inference, LayoutSpec};
use crate::mapping::build_sampling_grid;
use crate::post_proc::{interp_img, TopNoiseMask};
use crate::resample::{Boundary, ResampleError};
use crate::sector::InitFanError;
use crate::{Idx2d, RawFrame};
use ndarray::{Array1, Array2};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use crate::resample::par_resample_bilinear as resample;
    } else {
        use crate::resample::resample_bilinear as resample;
    }
}

/// 展平运行时错误.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlattenError {
    /// 几何推断失败.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// 取样失败. 只会在 [`Boundary::Reject`] 或 [`Boundary::Clamp`] 下出现.
    #[error(transparent)]
    Resample(#[from] ResampleError),

    /// 展平网格的深度轴或角度轴为空.
    #[error("sampling grid {shape:?} has an empty axis")]
    EmptyGrid {
        /// 网格形状 `(深度步数, 角度步数)`.
        shape: Idx2d,
    },

    /// 重投影的扇区参数非法.
    #[error("cannot reproject: {0}")]
    Reproject(#[from] InitFanError),
}

/// 展平结果.
pub type FlattenResult<T> = Result<T, FlattenError>;

/// 读入并处理单帧时的错误.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// 图像无法读取或解码.
    #[error("cannot load frame: {0}")]
    Image(#[from] image::ImageError),

    /// 处理失败.
    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

/// 读入并处理单帧的结果.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// 展平参数.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenSpec {
    /// 几何推断所用的界面布局.
    pub layout: LayoutSpec,

    /// 取样越界策略. 默认填充黑色.
    pub boundary: Boundary,
}

impl Default for FlattenSpec {
    fn default() -> Self {
        Self {
            layout: LayoutSpec::default(),
            boundary: Boundary::Constant(BLACK),
        }
    }
}

/// 展平结果.
#[derive(Debug, Clone)]
pub struct Flattened {
    /// "深度 × 角度" 展平图像, 行对应深度 (毫米), 列对应角度 (度).
    pub image: Array2<u8>,

    /// 几何推断结果.
    pub inference: Inference,

    /// 深度轴 (毫米).
    pub depth_mm: Array1<f64>,

    /// 角度轴 (度).
    pub angle_deg: Array1<f64>,
}

impl Flattened {
    /// 几何参数.
    #[inline]
    pub fn params(&self) -> &GeometryParams {
        self.inference.params()
    }
}

/// 以默认参数 [`FlattenSpec::default`] 展平 `frame`.
#[inline]
pub fn transform_curved_to_flat(frame: &RawFrame) -> FlattenResult<Flattened> {
    transform_curved_to_flat_with(frame, &FlattenSpec::default())
}

/// 以参数 `spec` 展平 `frame`.
pub fn transform_curved_to_flat_with(
    frame: &RawFrame,
    spec: &FlattenSpec,
) -> FlattenResult<Flattened> {
    let inference = infer_geometry_with(frame, &spec.layout)?;
    flatten_inference(inference, spec.boundary)
}

/// 对已完成几何推断的工作帧取样.
fn flatten_inference(inference: Inference, boundary: Boundary) -> FlattenResult<Flattened> {
    let grid = build_sampling_grid(inference.params(), inference.work_shape());
    if grid.is_empty() {
        return Err(FlattenError::EmptyGrid {
            shape: grid.shape(),
        });
    }
    let image = resample(&grid, inference.work(), boundary)?;
    Ok(Flattened {
        image,
        inference,
        depth_mm: grid.depth_mm().clone(),
        angle_deg: grid.angle_deg().clone(),
    })
}

/// 完整管线参数.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineSpec {
    /// 展平参数.
    pub flatten: FlattenSpec,

    /// 去噪规则.
    pub mask: TopNoiseMask,
}

/// 完整管线的所有中间结果.
#[derive(Debug, Clone)]
pub struct Processed {
    /// 展平图像.
    pub transformed: Array2<u8>,

    /// 去噪后的展平图像.
    pub masked: Array2<u8>,

    /// 重投影后的扇形图像 (1 像素 = 1 毫米).
    pub final_image: Array2<u8>,

    /// 扇区可用深度 (毫米).
    pub depth: f64,

    /// 顶点偏移 (毫米).
    pub offset: f64,

    /// 扇区半角 (弧度).
    pub alpha: f64,

    /// 几何参数.
    pub params: GeometryParams,
}

/// 对 `frame` 依次执行展平、去噪、重投影.
pub fn process_frame(frame: &RawFrame, spec: &PipelineSpec) -> FlattenResult<Processed> {
    let flat = transform_curved_to_flat_with(frame, &spec.flatten)?;
    let params = flat.inference.into_parts().0;
    let masked = spec.mask.apply(flat.image.view());
    let (depth, offset, alpha) = (params.r_mm(), params.offset_mm(), params.alpha_real);
    let final_image = interp_img(masked.view(), depth, alpha, offset)?;
    log::debug!(
        "processed frame {:?}: flat {:?}, fan {:?}",
        frame.shape(),
        flat.image.dim(),
        final_image.dim()
    );
    Ok(Processed {
        transformed: flat.image,
        masked,
        final_image,
        depth,
        offset,
        alpha,
        params,
    })
}

/// 从磁盘路径 `path` 读入一帧, 以默认参数执行完整管线.
pub fn process_ultrasound_image<P: AsRef<Path>>(path: P) -> ProcessResult<Processed> {
    let frame = RawFrame::open(path)?;
    Ok(process_frame(&frame, &PipelineSpec::default())?)
}
