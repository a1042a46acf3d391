//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF};

pub use crate::data::{ImgWriteRaw, NpyWrite, RawFrame};

pub use crate::geometry::{
    infer_geometry, infer_geometry_with, GeometryError, GeometryParams, Inference, LayoutSpec,
};
pub use crate::mapping::{build_sampling_grid, CoordGrid, PolarMap, SamplingGrid};
pub use crate::resample::{resample_bilinear, resample_bilinear_or, Boundary, ResampleError};

#[cfg(feature = "rayon")]
pub use crate::resample::par_resample_bilinear;

pub use crate::post_proc::{interp_img, mask, TopNoiseMask};

pub use crate::pipeline::{
    process_frame, process_ultrasound_image, transform_curved_to_flat,
    transform_curved_to_flat_with, FlattenError, FlattenSpec, Flattened, PipelineSpec, ProcessError,
    Processed,
};

pub use crate::sector::FanSector;
