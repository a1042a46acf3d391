//! 批处理运行统计.

use sono_berry::pipeline::FlattenError;
use std::time::{Duration, Instant};

/// 批处理计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间 (以微秒为单位).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 单帧失败的原因分类.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Failure {
    /// 读取或解码失败.
    Load,
    /// 几何推断失败.
    Geometry,
    /// 取样失败 (含空网格).
    Resample,
    /// 重投影失败.
    Reproject,
    /// 结果写盘失败.
    Save,
}

impl Failure {
    /// 全部分类.
    pub const ALL: [Failure; 5] = [
        Failure::Load,
        Failure::Geometry,
        Failure::Resample,
        Failure::Reproject,
        Failure::Save,
    ];

    /// 简短名称.
    pub fn name(self) -> &'static str {
        match self {
            Failure::Load => "load",
            Failure::Geometry => "geometry",
            Failure::Resample => "resample",
            Failure::Reproject => "reproject",
            Failure::Save => "save",
        }
    }
}

impl From<&FlattenError> for Failure {
    fn from(e: &FlattenError) -> Self {
        match e {
            FlattenError::Geometry(_) => Failure::Geometry,
            FlattenError::Resample(_) | FlattenError::EmptyGrid { .. } => Failure::Resample,
            FlattenError::Reproject(_) => Failure::Reproject,
        }
    }
}

/// 批处理数据统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 成功处理并写盘的帧数.
    done: u64,

    /// 各类失败的帧数, 按 `Failure::ALL` 的顺序排列.
    failed: [u64; 5],

    /// 管线本身花费的总时间 (不含读写盘).
    frame_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一帧所消耗的时间.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            done: 0,
            failed: [0; 5],
            frame_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
        }
    }

    /// 记录一帧成功.
    #[inline]
    pub fn count_done(&mut self) {
        self.done += 1;
    }

    /// 记录一帧失败.
    #[inline]
    pub fn count_failure(&mut self, kind: Failure) {
        self.failed[kind as usize] += 1;
    }

    /// 开始一次单帧管线计时.
    #[inline]
    pub fn frame_start(&mut self) {
        self.frame_time.start();
    }

    /// 结束一次单帧管线计时.
    #[inline]
    pub fn frame_elapsed(&mut self) {
        let d = self.frame_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 将另一个 (通常来自其它线程的) 统计合并进来. 总自然时间取两者较大值.
    pub fn merge(mut self, other: &Profile) -> Self {
        self.done += other.done;
        for (a, b) in self.failed.iter_mut().zip(other.failed) {
            *a += b;
        }
        self.frame_time.consumed += other.frame_time.consumed;
        self.real_time.consumed = self.real_time.consumed.max(other.real_time.consumed);
        self.most = match (self.most, other.most) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self
    }

    /// 成功帧数.
    #[inline]
    pub fn get_done(&self) -> u64 {
        self.done
    }

    /// 某一类失败的帧数.
    #[inline]
    pub fn get_failed(&self, kind: Failure) -> u64 {
        self.failed[kind as usize]
    }

    /// 失败帧总数.
    #[inline]
    pub fn get_failed_total(&self) -> u64 {
        self.failed.iter().sum()
    }

    /// 以微秒为单位获得管线的总花费时间.
    #[inline]
    pub fn get_frame_time_us(&self) -> u64 {
        self.frame_time.total_us()
    }

    /// 以微秒为单位获得总自然时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    /// 以微秒为单位获得每帧管线的平均时间. 没有进入管线的帧时返回 `None`.
    pub fn get_avg_frame_time_us(&self) -> Option<f64> {
        let timed = self.done + self.get_failed_total() - self.get_failed(Failure::Load);
        match timed {
            0 => None,
            n => Some(self.get_frame_time_us() as f64 / n as f64),
        }
    }

    /// 获取最耗时的一帧所消耗的时间.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Failure, Profile};
    use sono_berry::geometry::GeometryError;
    use sono_berry::pipeline::FlattenError;
    use std::time::Duration;

    #[test]
    fn test_profile_counts_and_merge() {
        let mut a = Profile::new();
        a.count_done();
        a.count_failure(Failure::Load);
        a.most = Some(Duration::from_millis(3));

        let mut b = Profile::new();
        b.count_done();
        b.count_failure(Failure::Geometry);
        b.count_failure(Failure::Geometry);
        b.most = Some(Duration::from_millis(5));

        let total = a.merge(&b);
        assert_eq!(total.get_done(), 2);
        assert_eq!(total.get_failed(Failure::Load), 1);
        assert_eq!(total.get_failed(Failure::Geometry), 2);
        assert_eq!(total.get_failed_total(), 3);
        assert_eq!(total.get_most_time_consuming(), Some(Duration::from_millis(5)));
        assert!(Profile::new().get_avg_frame_time_us().is_none());
    }

    #[test]
    fn test_failure_kind() {
        let e = FlattenError::Geometry(GeometryError::NoProbeRow { threshold: 200 });
        assert_eq!(Failure::from(&e), Failure::Geometry);
        let e = FlattenError::EmptyGrid { shape: (0, 84) };
        assert_eq!(Failure::from(&e), Failure::Resample);
        assert!(Failure::ALL
            .iter()
            .enumerate()
            .all(|(i, &f)| f as usize == i));
    }
}
