//! 展平之后的后处理流程集合.

mod mask;
mod reproject;

pub use mask::{mask, TopNoiseMask};

pub use reproject::interp_img;
