//! 一维信号的峰值检测.

use binary_heap_plus::BinaryHeap;
use ndarray::ArrayView1;

/// 查找 `signal` 中的局部极大值, 并保证任意两个保留峰值的间隔不小于 `distance`.
///
/// 返回按索引升序排列的峰值位置.
///
/// # 规则
///
/// 1. 首尾两个样本永远不是峰值.
/// 2. 平台 (连续相等的极大值) 取其中点, 偶数长度时偏左.
/// 3. 间隔筛选按峰高从高到低进行: 每保留一个峰值, 就剔除与其间隔小于 `distance`
///   的其它峰值. 峰高相同时, 索引较大者优先
///   (与 SciPy `find_peaks(distance=...)` 的稳定排序一致).
///
/// 如果 `distance == 0`, 则程序 panic.
pub fn find_peaks(signal: ArrayView1<u8>, distance: usize) -> Vec<usize> {
    assert_ne!(distance, 0, "峰值间隔至少为 1");
    let peaks = local_maxima(signal);
    if peaks.len() < 2 {
        return peaks;
    }

    let keep = select_by_distance(signal, &peaks, distance);
    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

/// 按峰高从高到低筛选 `peaks`, 返回每个峰值是否被保留.
fn select_by_distance(signal: ArrayView1<u8>, peaks: &[usize], distance: usize) -> Vec<bool> {
    let mut heap: BinaryHeap<usize, _> = BinaryHeap::new_by(|a: &usize, b: &usize| {
        signal[peaks[*a]]
            .cmp(&signal[peaks[*b]])
            .then_with(|| a.cmp(b))
    });
    heap.extend(0..peaks.len());

    let mut keep = vec![true; peaks.len()];
    while let Some(j) = heap.pop() {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }
    keep
}

/// 查找所有局部极大值 (含平台中点), 不含首尾样本.
fn local_maxima(signal: ArrayView1<u8>) -> Vec<usize> {
    let n = signal.len();
    let mut ans = Vec::new();
    if n < 3 {
        return ans;
    }

    let last = n - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                ans.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    ans
}

#[cfg(test)]
mod tests {
    use super::{find_peaks, local_maxima};
    use ndarray::{arr1, Array1};

    #[test]
    fn test_local_maxima() {
        let s = arr1(&[0u8, 3, 1, 5, 5, 5, 2, 4, 4, 0, 9]);
        // 首尾不算; 平台 [3, 5] 取 4; 平台 [7, 8] 偏左取 7.
        assert_eq!(local_maxima(s.view()), vec![1, 4, 7]);

        // 单调上升直到末尾的平台不是峰值.
        let s = arr1(&[0u8, 1, 2, 2, 2]);
        assert!(local_maxima(s.view()).is_empty());

        assert!(local_maxima(arr1(&[1u8, 2]).view()).is_empty());
    }

    #[test]
    fn test_peak_distance_prefers_higher() {
        let mut s = Array1::<u8>::zeros(400);
        s[50] = 100;
        s[120] = 180; // 与 50 间隔 70, 更高, 保留.
        s[200] = 90; // 与 120 间隔 80, 被剔除.
        s[220] = 150; // 与 120 间隔 100, 恰好保留.
        assert_eq!(find_peaks(s.view(), 100), vec![120, 220]);
        assert_eq!(find_peaks(s.view(), 1), vec![50, 120, 200, 220]);
    }

    #[test]
    fn test_peak_tie_prefers_right() {
        let mut s = Array1::<u8>::zeros(100);
        s[10] = 50;
        s[30] = 50;
        assert_eq!(find_peaks(s.view(), 40), vec![30]);
    }

    #[test]
    fn test_peak_tie_doubled_edge() {
        // 左边缘是相距 20 的两条等高刻线.
        let mut s = Array1::<u8>::zeros(400);
        s[140] = 180;
        s[160] = 180;
        s[300] = 180;
        // 先保留 300, 再保留 160 并剔除 140.
        assert_eq!(find_peaks(s.view(), 100), vec![160, 300]);

        // 更高的左刻线仍然优先.
        s[140] = 181;
        assert_eq!(find_peaks(s.view(), 100), vec![140, 300]);
    }
}
