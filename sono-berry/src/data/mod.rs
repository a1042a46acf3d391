//! 超声帧的基础数据结构.

use crate::Idx2d;
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::{GrayImage, ImageResult};
use ndarray::{Array2, ArrayView2};
use std::ops::Index;
use std::path::Path;

mod save;
pub mod sector;

pub use save::{ImgWriteRaw, NpyWrite};

/// 拥有所有权的单通道 8-bit 灰度超声帧 (扫描仪截图).
///
/// 行优先存储, 原点在左上角. 本 crate 的所有算法都不会修改它.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    data: Array2<u8>,
}

impl RawFrame {
    /// 从磁盘路径 `path` 打开图像, 并转换为单通道 8-bit 灰度帧.
    ///
    /// 支持 `image` crate 能解码的所有栅格格式. 彩色图像按照 `Luma` 规则转换.
    pub fn open<P: AsRef<Path>>(path: P) -> ImageResult<Self> {
        let img = image::open(path)?.into_luma8();
        Self::try_from_gray_image(img)
    }

    /// 从 `image::GrayImage` 构建.
    pub fn try_from_gray_image(img: GrayImage) -> ImageResult<Self> {
        let (width, height) = img.dimensions();
        let data = Array2::from_shape_vec((height as usize, width as usize), img.into_raw())
            .map_err(|_| {
                ImageError::Parameter(ParameterError::from_kind(
                    ParameterErrorKind::DimensionMismatch,
                ))
            })?;
        Ok(Self { data })
    }

    /// 直接从 `(h, w)` 形状的二维数组初始化.
    #[inline]
    pub fn from_array(data: Array2<u8>) -> Self {
        Self { data }
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn view(&self) -> ArrayView2<u8> {
        self.data.view()
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 消费自我, 获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<u8> {
        self.data
    }
}

impl Index<Idx2d> for RawFrame {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array2<u8>> for RawFrame {
    #[inline]
    fn from(data: Array2<u8>) -> Self {
        Self::from_array(data)
    }
}

#[cfg(test)]
mod tests {
    use super::RawFrame;
    use image::{GrayImage, Luma};

    #[test]
    fn test_gray_image_layout() {
        // 3 宽 2 高.
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(2, 0, Luma([7]));
        img.put_pixel(0, 1, Luma([9]));

        let frame = RawFrame::try_from_gray_image(img).unwrap();
        assert_eq!(frame.shape(), (2, 3));
        assert_eq!(frame[(0, 2)], 7);
        assert_eq!(frame[(1, 0)], 9);
        assert_eq!(frame.view().get((2, 0)), None);
    }
}
