//! 대역폭 분석.
//!
//! 단조 증가하는 누적 사용량 이력으로부터 순간/평균 속도를 계산한다.

use howsnet_core::models::sample::BandwidthSample;
use howsnet_core::models::statistics::BandwidthStatistics;
use std::time::Duration;

use crate::Analyzer;

/// 대역폭 분석기
#[derive(Debug, Clone, Copy)]
pub struct BandwidthAnalyzer {
    /// 예상 틱 간격 (초) — 시간 간격이 없을 때 속도 추정에 사용
    expected_tick_secs: f64,
}

impl BandwidthAnalyzer {
    /// 새 분석기 생성
    pub fn new(expected_tick: Duration) -> Self {
        Self {
            expected_tick_secs: expected_tick.as_secs_f64(),
        }
    }

    /// 예상 틱 간격당 속도 (간격이 0이면 0)
    fn per_tick(&self, kbits: f64) -> f64 {
        if self.expected_tick_secs > 0.0 {
            kbits / self.expected_tick_secs
        } else {
            0.0
        }
    }

    /// 이력 전체로부터 대역폭 통계 스냅샷 계산
    ///
    /// 빈 이력은 `None`. 샘플이 하나뿐이면 누적값 전체를 이번 틱 사용량으로 보고
    /// 예상 틱 간격으로 나눈 추정 속도를 반환한다.
    pub fn analyze(&self, history: &[BandwidthSample]) -> Option<BandwidthStatistics> {
        let first = history.first()?;
        let last = history.last()?;

        if history.len() == 1 {
            let rate = self.per_tick(last.cumulative_kbits);
            return Some(BandwidthStatistics {
                timestamp: last.timestamp,
                current_use_kbits: last.cumulative_kbits,
                current_rate_kbits: rate,
                mean_rate_kbits: rate,
                total_duration_secs: 0,
                total_use_kbits: last.cumulative_kbits,
                estimated: true,
            });
        }

        let previous = &history[history.len() - 2];
        let current_use_kbits = last.cumulative_kbits - previous.cumulative_kbits;
        let current_rate_kbits = latest_valid_rate(history).unwrap_or(0.0);

        let total_duration_secs = last.timestamp.saturating_sub(first.timestamp);
        let (mean_rate_kbits, estimated) = if total_duration_secs > 0 {
            (
                (last.cumulative_kbits - first.cumulative_kbits) / total_duration_secs as f64,
                false,
            )
        } else {
            (self.per_tick(last.cumulative_kbits), true)
        };

        Some(BandwidthStatistics {
            timestamp: last.timestamp,
            current_use_kbits,
            current_rate_kbits,
            mean_rate_kbits,
            total_duration_secs,
            total_use_kbits: last.cumulative_kbits,
            estimated,
        })
    }
}

impl Analyzer<BandwidthSample> for BandwidthAnalyzer {
    type Output = Option<BandwidthStatistics>;

    fn analyze(&self, history: &[BandwidthSample]) -> Option<BandwidthStatistics> {
        BandwidthAnalyzer::analyze(self, history)
    }
}

/// 시간 간격이 있는 가장 최근 연속 샘플 쌍의 속도.
///
/// 최근 두 샘플의 시각이 같으면(중복 시각) 그 이전 쌍의 속도를 쓴다.
fn latest_valid_rate(history: &[BandwidthSample]) -> Option<f64> {
    history.windows(2).rev().find_map(|pair| {
        let elapsed = pair[1].timestamp.saturating_sub(pair[0].timestamp);
        (elapsed > 0).then(|| (pair[1].cumulative_kbits - pair[0].cumulative_kbits) / elapsed as f64)
    })
}
