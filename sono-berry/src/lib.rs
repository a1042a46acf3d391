#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 将扫描仪屏幕截取的曲面 (扇形) 超声 B 模式图像展平为 "深度 × 角度" 的矩形网格,
//! 并提供去除组织上方噪声、重新投影回扇形的后处理.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 只适配一种已知的扫描仪界面布局: 单个扇区, 单一焦点几何,
//!   以及画面边缘的一条刻度尺. 布局阈值集中在 [`consts::layout`] 和
//!   [`geometry::LayoutSpec`] 中, 更换扫描仪型号时需要重新标定.
//! 2. 这不是经过标定的医学影像管线, 不保证临床精度.
//! 3. 输入不符合预期布局时, 程序返回带有失败地标信息的错误, 而不是猜测缺失参数.
//!
//! # 开发计划
//!
//! ### 从像素强度推断扇区几何 ✅
//!
//! 刻度尺 -> 像素尺度, 行和 -> 内容边界 / 探测行, 峰值检测 -> 扇区两侧边缘,
//! 中轴列 -> 深度范围.
//!
//! 实现位于 `sono-berry/src/geometry`.
//!
//! ### 逆极坐标映射 ✅
//!
//! 为每个 "深度 (毫米) × 角度 (度)" 网格单元求出其在工作帧中的亚像素坐标.
//!
//! 实现位于 `sono-berry/src/mapping`.
//!
//! ### 双线性重采样 ✅
//!
//! 越界策略显式化 ([`resample::Boundary`]); 整数坐标直接取值, 不会产生 NaN.
//! 开启 `rayon` feature 时按行并行, 结果与串行版本逐位一致.
//!
//! 实现位于 `sono-berry/src/resample`.
//!
//! ### 去噪与重投影 ✅
//!
//! 1. 去除展平图像中组织上方的噪声 (`mask`). ✅
//! 2. 将展平图像重新投影为 1 像素 = 1 毫米的扇形图像 (`interp_img`). ✅
//!
//! 实现位于 `sono-berry/src/post_proc`.
//!
//! ### 完整管线 ✅
//!
//! 几何推断 -> 逆映射 -> 重采样 -> 去噪 -> 重投影.
//!
//! 实现位于 `sono-berry/src/pipeline.rs`.
//!
//! ### 坐标约定
//!
//! 所有二维数据均按行优先存储, 索引为 `(row, col)` 即 `(h, w)`.
//! 扇区的 "深度" 方向为 h 增加的方向 (弧度 `0`), 横向为 w 增加的方向 (弧度 `pi / 2`).

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 高精度通用索引 / 向量, 格式为 `(h, w)`.
pub type Idx2dF = (f64, f64);

/// 超声帧基础数据结构与持久化.
mod data;

pub use data::{ImgWriteRaw, NpyWrite, RawFrame};

pub use data::sector;

pub mod consts;

pub mod geometry;

pub mod mapping;

pub mod resample;

pub mod post_proc;

pub mod pipeline;

pub mod prelude;

#[cfg(test)]
mod synth;
