//! 超声帧目录的加载器.

use image::ImageResult;
use sono_berry::RawFrame;
use std::path::{Path, PathBuf};
use std::{fs, io};

/// 被视为超声帧的文件扩展名 (不区分大小写).
pub const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tif"];

/// 返回 `$HOME/dataset/<it...>`. 无法获取用户目录时返回 `None`.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 获取超声帧目录.
///
/// 1. 若 `dir` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/ultrasound`.
pub fn frame_dir_or_home(dir: Option<PathBuf>) -> Option<PathBuf> {
    match dir {
        Some(d) if !d.as_os_str().is_empty() => Some(d),
        _ => home_dataset_dir_with(["ultrasound"]),
    }
}

/// 获取输出目录.
///
/// 1. 若 `output` 非空, 则返回其值;
/// 2. 否则, 返回 `<input>/flat`.
pub fn output_dir_or<P: AsRef<Path>>(output: Option<PathBuf>, input: P) -> PathBuf {
    match output {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => input.as_ref().join("flat"),
    }
}

/// 路径是否具有超声帧扩展名?
pub fn is_frame_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FRAME_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// 列出 `dir` 下 (不递归) 的全部超声帧路径, 按路径排序.
pub fn frame_paths<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_frame_path(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// 超声帧加载器. 按给定顺序逐个解码, 解码失败不会中断迭代.
#[derive(Debug, Clone)]
pub struct FrameLoader {
    paths_rev: Vec<PathBuf>,
}

impl FrameLoader {
    /// 按 `paths` 的顺序加载.
    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let mut paths_rev: Vec<PathBuf> = paths.into_iter().collect();
        paths_rev.reverse();
        Self { paths_rev }
    }
}

impl Iterator for FrameLoader {
    type Item = (PathBuf, ImageResult<RawFrame>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths_rev.pop()?;
        let frame = RawFrame::open(&path);
        Some((path, frame))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl ExactSizeIterator for FrameLoader {
    #[inline]
    fn len(&self) -> usize {
        self.paths_rev.len()
    }
}
