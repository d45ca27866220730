//! 샘플 이력.
//!
//! 시각 순으로 정렬된 추가 전용 로그. 엔진은 항목을 삭제하지 않는다.

use howsnet_core::models::sample::TimedSample;

/// 추가된 샘플의 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 끝에 추가됨 (정상 경로)
    Appended,
    /// 마지막 샘플보다 이른 시각이라 정렬 위치에 삽입됨
    Reordered { index: usize },
}

/// 시각 순 샘플 이력
///
/// 순서가 어긋난 샘플은 거부하지 않고, 같은 시각의 기존 샘플들 뒤에 삽입한다.
/// 같은 입력 순서는 항상 같은 이력을 만든다.
#[derive(Debug, Clone)]
pub struct SampleHistory<S> {
    samples: Vec<S>,
}

impl<S: TimedSample> SampleHistory<S> {
    /// 빈 이력 생성
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// 샘플 추가. 순서대로 들어오면 O(1) (분할 상환)
    pub fn append(&mut self, sample: S) -> Placement {
        match self.samples.last() {
            Some(last) if sample.timestamp() < last.timestamp() => {
                let index = self
                    .samples
                    .partition_point(|s| s.timestamp() <= sample.timestamp());
                self.samples.insert(index, sample);
                Placement::Reordered { index }
            }
            _ => {
                self.samples.push(sample);
                Placement::Appended
            }
        }
    }

    /// 분석기용 읽기 전용 뷰
    pub fn as_slice(&self) -> &[S] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 가장 최근 샘플
    pub fn last(&self) -> Option<&S> {
        self.samples.last()
    }
}

impl<S: TimedSample> Default for SampleHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TimedSample> FromIterator<S> for SampleHistory<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut history = Self::new();
        for sample in iter {
            history.append(sample);
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use howsnet_core::models::sample::ConnectivitySample;

    fn sample(ts: i64, latency: i64) -> ConnectivitySample {
        ConnectivitySample {
            timestamp: ts,
            latency_ms: latency,
        }
    }

    fn timestamps(history: &SampleHistory<ConnectivitySample>) -> Vec<i64> {
        history.as_slice().iter().map(|s| s.timestamp).collect()
    }

    #[test]
    fn in_order_samples_are_appended() {
        let mut history = SampleHistory::new();
        assert_eq!(history.append(sample(0, 10)), Placement::Appended);
        assert_eq!(history.append(sample(10, 12)), Placement::Appended);
        assert_eq!(history.append(sample(10, -1)), Placement::Appended);
        assert_eq!(timestamps(&history), vec![0, 10, 10]);
    }

    #[test]
    fn late_sample_inserted_after_equal_timestamps() {
        let mut history = SampleHistory::new();
        history.append(sample(0, 10));
        history.append(sample(10, 11));
        history.append(sample(30, 12));

        let placement = history.append(sample(10, -1));
        assert_eq!(placement, Placement::Reordered { index: 2 });
        assert_eq!(timestamps(&history), vec![0, 10, 10, 30]);
        assert_eq!(history.as_slice()[2].latency_ms, -1);
    }

    #[test]
    fn sample_older_than_everything_goes_first() {
        let mut history = SampleHistory::new();
        history.append(sample(20, 10));
        assert_eq!(history.append(sample(5, 10)), Placement::Reordered { index: 0 });
        assert_eq!(timestamps(&history), vec![5, 20]);
    }

    #[test]
    fn collect_from_iterator_sorts() {
        let history: SampleHistory<_> = [sample(30, 1), sample(10, 1), sample(20, 1)]
            .into_iter()
            .collect();
        assert_eq!(timestamps(&history), vec![10, 20, 30]);
        assert_eq!(history.last().map(|s| s.timestamp), Some(30));
    }
}
