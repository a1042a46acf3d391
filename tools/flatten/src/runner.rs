//! 程序运行函数.

use crate::profile::{Failure, Profile};
use crate::result::RunResult;
use log::{debug, info, warn};
use ndarray_npy::WriteNpyError;
use sono_berry::pipeline::{process_frame, PipelineSpec, Processed};
use sono_berry::{ImgWriteRaw, NpyWrite};
use std::path::{Path, PathBuf};
use std::{fs, io, thread};
use utils::loader::{self, FrameLoader};

/// 写盘错误.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// 图像编码或写入失败.
    #[error("cannot write image: {0}")]
    Image(#[from] image::ImageError),

    /// `.npy` 写入失败.
    #[error("cannot write npy: {0}")]
    Npy(#[from] WriteNpyError),
}

/// 将 `processed` 的各阶段图像写入 `output`, 文件名以 `input` 的文件名 (不含扩展名) 为前缀.
pub fn save_outputs(input: &Path, output: &Path, processed: &Processed) -> Result<(), SaveError> {
    let stem = input
        .file_stem()
        .map_or_else(|| "frame".into(), |s| s.to_string_lossy());
    let name = |suffix: &str| output.join(format!("{stem}_{suffix}"));

    processed.transformed.save_raw(name("flat.png"))?;
    processed.transformed.save_npy(name("flat.npy"))?;
    processed.masked.save_raw(name("masked.png"))?;
    if !processed.final_image.is_empty() {
        processed.final_image.save_raw(name("final.png"))?;
    }
    Ok(())
}

/// 依次处理 `paths` 中的全部帧.
fn run_part(paths: &[PathBuf], output: &Path, spec: &PipelineSpec) -> Profile {
    let mut profile = Profile::new();
    for (path, frame) in FrameLoader::from_paths(paths.iter().cloned()) {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{}: {e}", path.display());
                profile.count_failure(Failure::Load);
                continue;
            }
        };

        profile.frame_start();
        let processed = process_frame(&frame, spec);
        profile.frame_elapsed();

        match processed {
            Ok(processed) => match save_outputs(&path, output, &processed) {
                Ok(()) => {
                    debug!(
                        "{}: flat {:?}, depth {:.2} mm, offset {:.2} mm",
                        path.display(),
                        processed.transformed.dim(),
                        processed.depth,
                        processed.offset
                    );
                    profile.count_done();
                }
                Err(e) => {
                    warn!("{}: {e}", path.display());
                    profile.count_failure(Failure::Save);
                }
            },
            Err(e) => {
                warn!("{}: {e}", path.display());
                profile.count_failure(Failure::from(&e));
            }
        }
    }
    profile.finish()
}

/// 实际运行: 将 `input` 下的全部帧展平并写入 `output`.
pub fn run(input: &Path, output: &Path) -> io::Result<RunResult> {
    let paths = loader::frame_paths(input)?;
    fs::create_dir_all(output)?;

    let workers = utils::cpus().min(paths.len()).max(1);
    let chunk = paths.len().div_ceil(workers).max(1);
    info!(
        "flattening {} frames from {} into {} with {} workers",
        paths.len(),
        input.display(),
        output.display(),
        workers
    );

    let spec = PipelineSpec::default();
    let profiles: Vec<Profile> = thread::scope(|s| {
        let spec = &spec;
        let handles: Vec<_> = paths
            .chunks(chunk)
            .map(|part| s.spawn(move || run_part(part, output, spec)))
            .collect();
        handles
            .into_iter()
            .map(|th| th.join().expect("Thread joining error"))
            .collect()
    });
    Ok(RunResult::new(
        input.to_path_buf(),
        output.to_path_buf(),
        profiles,
    ))
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::profile::Failure;
    use sono_berry::ImgWriteRaw;
    use std::{env, fs};

    #[test]
    fn test_run_counts_failures() {
        let root = env::temp_dir().join(format!("sono-flatten-{}", std::process::id()));
        let (input, output) = (root.join("in"), root.join("out"));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&input).unwrap();

        // 全黑帧: 找不到刻度尺.
        let blank = image::GrayImage::new(64, 64);
        sono_berry::RawFrame::try_from_gray_image(blank)
            .unwrap()
            .save_raw(input.join("blank.png"))
            .unwrap();
        fs::write(input.join("broken.png"), b"broken").unwrap();

        let result = run(&input, &output).unwrap();
        let total = result.total();
        assert_eq!(total.get_done(), 0);
        assert_eq!(total.get_failed(Failure::Load), 1);
        assert_eq!(total.get_failed(Failure::Geometry), 1);
        assert!(output.is_dir());

        fs::remove_dir_all(&root).unwrap();
    }
}
