//! 통계 스냅샷 모델.
//!
//! 매 틱마다 전체 이력으로부터 새로 계산되는 불변 결과.
//! 생성 이후 수정되지 않으며, 만든 샘플의 시각을 가진다.

use serde::{Deserialize, Serialize};

/// 연결 끊김 구간
///
/// 이력 내 연속된 연결 끊김 샘플의 최대 구간. `end_index`는 배타적이며,
/// `end_index == 이력 길이`이면 아직 끝나지 않은(열린) 구간이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectionEpisode {
    /// 첫 번째 끊김 샘플 인덱스
    pub start_index: usize,
    /// 끊김 이후 첫 연결 샘플 인덱스 (배타적)
    pub end_index: usize,
}

impl DisconnectionEpisode {
    /// 이력 끝까지 이어지는 구간인지
    pub fn is_open(&self, history_len: usize) -> bool {
        self.end_index >= history_len
    }
}

/// 연결 통계 스냅샷
///
/// 이력이 비어 있으면 `Default` 값(0/None)을 가진다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatistics {
    /// 스냅샷을 만든 샘플의 시각
    pub timestamp: i64,
    /// 현재 연결 상태
    pub currently_connected: bool,
    /// 현재 지연 시간 (ms, 끊김이면 센티널)
    pub current_latency_ms: i64,
    /// 현재 상태가 유지된 시간 (초)
    pub current_state_secs: i64,
    /// 가장 긴 연결 끊김 시간 (초)
    pub longest_disconnection_secs: i64,
    /// 가장 긴 연결 끊김 시작 시각
    pub longest_disconnection_start: i64,
    /// 가장 긴 끊김이 아직 진행 중이라 추정값인지
    pub longest_is_estimate: bool,
    /// 평균 연결 끊김 시간 (초)
    pub mean_disconnection_secs: f64,
    /// 연결 끊김 횟수
    pub disconnection_count: usize,
    /// 시간당 평균 연결 끊김 횟수
    pub disconnections_per_hour: f64,
    /// 마지막 샘플까지 끊김이 진행 중인지 (종료 시각 미확정)
    pub ongoing_disconnection: bool,
    /// 최소 지연 시간 (연결된 샘플만)
    pub min_latency_ms: Option<i64>,
    /// 최대 지연 시간 (연결된 샘플만)
    pub max_latency_ms: Option<i64>,
    /// 평균 지연 시간 (연결된 샘플만)
    pub mean_latency_ms: Option<f64>,
}

/// 대역폭 통계 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandwidthStatistics {
    /// 스냅샷을 만든 샘플의 시각
    pub timestamp: i64,
    /// 직전 샘플 이후 사용량 (Kbit)
    pub current_use_kbits: f64,
    /// 직전 샘플 이후 속도 (Kbit/s)
    pub current_rate_kbits: f64,
    /// 이력 시작 이후 평균 속도 (Kbit/s)
    pub mean_rate_kbits: f64,
    /// 이력이 다루는 전체 시간 (초)
    pub total_duration_secs: i64,
    /// 세션 누적 사용량 (Kbit)
    pub total_use_kbits: f64,
    /// 시간 간격이 없어 예상 틱 간격으로 나눈 추정값인지
    pub estimated: bool,
}
