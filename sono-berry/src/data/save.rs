//! 图像的持久化存储.

use crate::RawFrame;
use image::ImageResult;
use ndarray::{Array2, ArrayView2};
use ndarray_npy::WriteNpyError;
use std::path::Path;

/// 表明一个可以通过 **按原样** 模式持久化存储的灰度图像对象.
///
/// 像素值不做任何窗口化或映射, 输出格式由 `path` 的扩展名决定.
pub trait ImgWriteRaw {
    /// 按原样将图片保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以保存为 numpy `.npy` 文件的灰度网格, 便于下游分析.
pub trait NpyWrite {
    /// 将底层 `u8` 网格写入 `path`.
    fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteNpyError>;
}

/// 将 `(h, w)` 网格逐像素写入 `GrayImage` 并保存.
fn write_gray<P: AsRef<Path>>(data: ArrayView2<u8>, path: P) -> ImageResult<()> {
    let (height, width) = data.dim();
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in data.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, image::Luma([pix]));
    }
    buf.save(path)
}

macro_rules! impl_gray_write {
    ($($grid: ty),+) => {
        $(
            /// 按原样存储.
            impl ImgWriteRaw for $grid {
                fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
                    write_gray(self.view(), path)
                }
            }

            /// 以 `u8` 元素类型存储.
            impl NpyWrite for $grid {
                fn save_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteNpyError> {
                    ndarray_npy::write_npy(path, &self.view())
                }
            }
        )+
    };
}

impl_gray_write!(RawFrame, Array2<u8>, ArrayView2<'_, u8>);
