//! 批处理结果.

use crate::profile::{Failure, Profile};
use std::io::{self, Write};
use std::path::PathBuf;

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.3}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Flattened frames: {}", p.get_done())?;
    writeln!(w, "{S4}Failed frames: {}", p.get_failed_total())?;
    for kind in Failure::ALL {
        writeln!(w, "{S4}{S4}{}: {}", kind.name(), p.get_failed(kind))?;
    }
    writeln!(w, "{S4}Pipeline total time: {} us", p.get_frame_time_us())?;
    writeln!(
        w,
        "{S4}Pipeline average time: {} us",
        f64_to_display(p.get_avg_frame_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.get_real_time_us())?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros() as f64);
    write!(w, "{S4}Most time-consuming frame costs {} us", f64_to_display(t))?;
    Ok(())
}

/// 批处理最终结果.
pub struct RunResult {
    input: PathBuf,
    output: PathBuf,
    workers: Vec<Profile>,
}

impl RunResult {
    /// 由输入、输出目录与各工作线程的统计构建.
    pub fn new(input: PathBuf, output: PathBuf, workers: Vec<Profile>) -> Self {
        Self {
            input,
            output,
            workers,
        }
    }

    /// 全部工作线程的合并统计.
    pub fn total(&self) -> Profile {
        self.workers
            .iter()
            .fold(Profile::new().finish(), |acc, p| acc.merge(p))
    }

    /// 分析运行结果, 输出到 `w`.
    pub fn analyze_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        utils::sep_to(&mut *w)?;
        writeln!(w, "Input: {}", self.input.display())?;
        writeln!(w, "Output: {}", self.output.display())?;
        utils::sep_to(&mut *w)?;

        if self.workers.len() > 1 {
            for (i, profile) in self.workers.iter().enumerate() {
                describe_into(&format!("worker-{i}"), profile, w)?;
                writeln!(w)?;
                utils::sep_to(&mut *w)?;
            }
        }
        describe_into("total", &self.total(), w)?;
        writeln!(w)?;
        utils::sep_to(&mut *w)
    }

    /// 分析运行结果, 输出到标准输出.
    pub fn analyze(&self) -> io::Result<()> {
        let stdout = io::stdout();
        self.analyze_into(&mut stdout.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::RunResult;
    use crate::profile::{Failure, Profile};
    use std::path::PathBuf;

    #[test]
    fn test_analyze_report() {
        let mut a = Profile::new();
        a.count_done();
        let mut b = Profile::new();
        b.count_failure(Failure::Geometry);

        let result = RunResult::new(
            PathBuf::from("in"),
            PathBuf::from("out"),
            vec![a.finish(), b.finish()],
        );
        assert_eq!(result.total().get_done(), 1);

        let mut buf = Vec::new();
        result.analyze_into(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Profile `worker-1`:"));
        assert!(text.contains("Profile `total`:"));
        assert!(text.contains("Flattened frames: 1"));
        assert!(text.contains("geometry: 1"));
    }
}
