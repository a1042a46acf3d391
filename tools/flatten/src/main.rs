//! 批量展平目录下的全部超声帧.
//!
//! 用法: `flatten [INPUT_DIR] [-o OUTPUT_DIR]`.
//!
//! - `INPUT_DIR` 缺省时依次读取 `$SONO_FRAME_DIR`, `$HOME/dataset/ultrasound`;
//! - `OUTPUT_DIR` 缺省时读取 `$SONO_OUTPUT_DIR`, 再缺省为 `INPUT_DIR/flat`;
//! - 日志级别默认为 `info`, 可通过 `$RUST_LOG` 覆写.

mod profile;
mod result;
mod runner;

use clap::Parser;
use log::{error, LevelFilter};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;
use utils::loader;

/// 命令行参数.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Flatten curved ultrasound frames into depth × angle images"
)]
struct Args {
    /// Directory of input frames (png, jpg, jpeg, bmp, tif)
    #[arg(env = "SONO_FRAME_DIR")]
    input: Option<PathBuf>,

    /// Directory for flattened outputs [default: <INPUT>/flat]
    #[arg(short, long, env = "SONO_OUTPUT_DIR")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
    {
        eprintln!("cannot initialize logger: {e}");
    }

    let Some(input) = loader::frame_dir_or_home(args.input) else {
        error!("no input directory given and home directory is unknown");
        return ExitCode::FAILURE;
    };
    if !input.is_dir() {
        error!("{} is not a directory", input.display());
        return ExitCode::FAILURE;
    }
    let output = loader::output_dir_or(args.output, &input);

    match runner::run(&input, &output) {
        Ok(result) => {
            if let Err(e) = result.analyze() {
                error!("cannot write report: {e}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
