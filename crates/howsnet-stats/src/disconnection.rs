//! 연결 끊김 분석.
//!
//! 연결 확인 이력에서 끊김 구간을 추출하고 끊김/지연 시간 통계를 계산한다.
//!
//! 마지막 샘플까지 이어지는 끊김 구간은 실제 종료 시각을 아직 모른다.
//! 이 경우 길이를 `마지막 시각 - 시작 시각 + 예상 틱 간격`으로 추정하고
//! `estimated`로 표시한다. 다음 샘플이 들어오면 정확한 값으로 대체된다.

use howsnet_core::models::sample::ConnectivitySample;
use howsnet_core::models::statistics::{ConnectionStatistics, DisconnectionEpisode};
use std::time::Duration;

use crate::{tick_secs, Analyzer};

const SECS_PER_HOUR: f64 = 3600.0;

/// 길이를 잰 끊김 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasuredEpisode {
    /// 구간 시작 시각
    pub start_time: i64,
    /// 길이 (초)
    pub duration_secs: i64,
    /// 열린 구간이라 추정값인지
    pub estimated: bool,
}

/// 연결된 샘플의 지연 시간 요약
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub min_ms: i64,
    pub max_ms: i64,
    pub mean_ms: f64,
    /// 연결된 샘플 수
    pub count: usize,
}

/// 이력을 한 번 훑어 최대 연속 끊김 구간을 순서대로 반환
pub fn find_episodes(history: &[ConnectivitySample]) -> Vec<DisconnectionEpisode> {
    let mut episodes = Vec::new();
    let mut start: Option<usize> = None;

    for (i, sample) in history.iter().enumerate() {
        match (sample.is_connected(), start) {
            (false, None) => start = Some(i),
            (true, Some(start_index)) => {
                episodes.push(DisconnectionEpisode {
                    start_index,
                    end_index: i,
                });
                start = None;
            }
            _ => {}
        }
    }

    if let Some(start_index) = start {
        episodes.push(DisconnectionEpisode {
            start_index,
            end_index: history.len(),
        });
    }

    episodes
}

/// 현재 상태(연결/끊김)가 유지된 시간. 상태가 바뀐 틱에는 0
pub fn current_state_secs(history: &[ConnectivitySample]) -> i64 {
    let Some(last) = history.last() else {
        return 0;
    };
    let state = last.is_connected();
    let run_start = history
        .iter()
        .rposition(|s| s.is_connected() != state)
        .map_or(0, |i| i + 1);
    last.timestamp.saturating_sub(history[run_start].timestamp)
}

/// 연결된 샘플만으로 최소/최대/평균 지연 시간 계산 (점진적 평균)
pub fn latency_summary(history: &[ConnectivitySample]) -> Option<LatencySummary> {
    let mut summary: Option<LatencySummary> = None;

    for latency in history
        .iter()
        .filter(|s| s.is_connected())
        .map(|s| s.latency_ms)
    {
        summary = Some(match summary {
            None => LatencySummary {
                min_ms: latency,
                max_ms: latency,
                mean_ms: latency as f64,
                count: 1,
            },
            Some(mut acc) => {
                acc.count += 1;
                acc.min_ms = acc.min_ms.min(latency);
                acc.max_ms = acc.max_ms.max(latency);
                acc.mean_ms += (latency as f64 - acc.mean_ms) / acc.count as f64;
                acc
            }
        });
    }

    summary
}

/// 연결 끊김 분석기
#[derive(Debug, Clone, Copy)]
pub struct DisconnectionAnalyzer {
    /// 예상 틱 간격 (초) — 열린 구간 길이 추정에 사용
    expected_tick_secs: i64,
}

impl DisconnectionAnalyzer {
    /// 새 분석기 생성
    pub fn new(expected_tick: Duration) -> Self {
        Self {
            expected_tick_secs: tick_secs(expected_tick),
        }
    }

    /// 구간 길이 계산. 닫힌 구간은 정확한 값, 열린 구간은 추정값
    pub fn measure(
        &self,
        history: &[ConnectivitySample],
        episode: &DisconnectionEpisode,
    ) -> MeasuredEpisode {
        let start_time = history[episode.start_index].timestamp;

        if episode.is_open(history.len()) {
            let last_time = history[history.len() - 1].timestamp;
            MeasuredEpisode {
                start_time,
                duration_secs: last_time
                    .saturating_sub(start_time)
                    .saturating_add(self.expected_tick_secs),
                estimated: true,
            }
        } else {
            MeasuredEpisode {
                start_time,
                duration_secs: history[episode.end_index].timestamp.saturating_sub(start_time),
                estimated: false,
            }
        }
    }

    /// 이력 전체로부터 연결 통계 스냅샷 계산
    ///
    /// 빈 이력은 `ConnectionStatistics::default()`를 반환한다.
    pub fn analyze(&self, history: &[ConnectivitySample]) -> ConnectionStatistics {
        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return ConnectionStatistics::default();
        };

        let episodes = find_episodes(history);

        // 동률이면 먼저 나온 구간 유지
        let mut longest: Option<MeasuredEpisode> = None;
        let mut total_secs: i64 = 0;
        for episode in &episodes {
            let measured = self.measure(history, episode);
            total_secs = total_secs.saturating_add(measured.duration_secs);
            if longest.map_or(true, |l| measured.duration_secs > l.duration_secs) {
                longest = Some(measured);
            }
        }

        let count = episodes.len();
        let mean_disconnection_secs = if count > 0 {
            total_secs as f64 / count as f64
        } else {
            0.0
        };

        let span_secs = last.timestamp.saturating_sub(first.timestamp);
        let disconnections_per_hour = if span_secs > 0 {
            count as f64 / (span_secs as f64 / SECS_PER_HOUR)
        } else {
            0.0
        };

        let ongoing_disconnection = episodes
            .last()
            .is_some_and(|e| e.is_open(history.len()));

        let latency = latency_summary(history);

        ConnectionStatistics {
            timestamp: last.timestamp,
            currently_connected: last.is_connected(),
            current_latency_ms: last.latency_ms,
            current_state_secs: current_state_secs(history),
            longest_disconnection_secs: longest.map_or(0, |l| l.duration_secs),
            longest_disconnection_start: longest.map_or(0, |l| l.start_time),
            longest_is_estimate: longest.is_some_and(|l| l.estimated),
            mean_disconnection_secs,
            disconnection_count: count,
            disconnections_per_hour,
            ongoing_disconnection,
            min_latency_ms: latency.map(|l| l.min_ms),
            max_latency_ms: latency.map(|l| l.max_ms),
            mean_latency_ms: latency.map(|l| l.mean_ms),
        }
    }
}

impl Analyzer<ConnectivitySample> for DisconnectionAnalyzer {
    type Output = ConnectionStatistics;

    fn analyze(&self, history: &[ConnectivitySample]) -> ConnectionStatistics {
        DisconnectionAnalyzer::analyze(self, history)
    }
}
