//! 샘플 모델.
//!
//! 주기적으로 수집되는 관측값 두 종류: 연결 확인(지연 시간)과 누적 대역폭 사용량.
//! 타임스탬프는 Unix epoch 기준 초 단위 정수.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 시각이 있는 샘플 공통 인터페이스
pub trait TimedSample: Copy + Send + Sync + 'static {
    /// 샘플 수집 시각 (Unix epoch 초)
    fn timestamp(&self) -> i64;
}

/// 현재 Unix 시각 (초)
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 연결 확인 결과
///
/// 연결 실패는 에러가 아니라 정상적인 관측값이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 연결 성공 — 연결 수립까지 걸린 시간
    Connected(Duration),
    /// 타임아웃/거부 등으로 연결 실패
    Disconnected,
}

/// 연결 확인 대상
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTarget {
    /// 호스트 (IP 또는 도메인)
    pub host: String,
    /// 포트
    pub port: u16,
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// 연결 확인 샘플
///
/// `latency_ms > 0` 이면 연결됨, `<= 0` 이면 연결 끊김(센티널).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivitySample {
    /// 수집 시각 (Unix epoch 초)
    pub timestamp: i64,
    /// 연결 수립 시간 (ms), 연결 끊김이면 센티널 값
    pub latency_ms: i64,
}

impl ConnectivitySample {
    /// 연결 끊김 센티널
    pub const DISCONNECTED_LATENCY_MS: i64 = -1;

    /// 연결 성공 샘플. 1ms 미만 지연은 1ms로 올려 센티널과 구분한다.
    pub fn connected(timestamp: i64, latency_ms: i64) -> Self {
        Self {
            timestamp,
            latency_ms: latency_ms.max(1),
        }
    }

    /// 연결 끊김 샘플
    pub fn disconnected(timestamp: i64) -> Self {
        Self {
            timestamp,
            latency_ms: Self::DISCONNECTED_LATENCY_MS,
        }
    }

    /// 연결 확인 결과로부터 샘플 생성
    pub fn from_outcome(timestamp: i64, outcome: ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Connected(latency) => {
                let ms = i64::try_from(latency.as_millis()).unwrap_or(i64::MAX);
                Self::connected(timestamp, ms)
            }
            ProbeOutcome::Disconnected => Self::disconnected(timestamp),
        }
    }

    /// 연결 상태 여부
    pub fn is_connected(&self) -> bool {
        self.latency_ms > 0
    }
}

impl TimedSample for ConnectivitySample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// 대역폭 샘플
///
/// 세션 시작 시점의 OS 카운터를 기준으로 한 누적 사용량 (Kbit).
/// 단조 증가한다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandwidthSample {
    /// 수집 시각 (Unix epoch 초)
    pub timestamp: i64,
    /// 세션 시작 이후 누적 사용량 (Kbit)
    pub cumulative_kbits: f64,
}

impl BandwidthSample {
    pub fn new(timestamp: i64, cumulative_kbits: f64) -> Self {
        Self {
            timestamp,
            cumulative_kbits,
        }
    }
}

impl TimedSample for BandwidthSample {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// 바이트 수를 Kbit로 변환
pub fn bytes_to_kbits(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 * 8.0
}

/// 샘플 종류 (로그/경고 구분용)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    Connectivity,
    Bandwidth,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::Connectivity => write!(f, "connectivity"),
            SampleKind::Bandwidth => write!(f, "bandwidth"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_millisecond_latency_is_still_connected() {
        let sample = ConnectivitySample::from_outcome(10, ProbeOutcome::Connected(Duration::from_micros(300)));
        assert!(sample.is_connected());
        assert_eq!(sample.latency_ms, 1);
    }

    #[test]
    fn disconnected_outcome_uses_sentinel() {
        let sample = ConnectivitySample::from_outcome(10, ProbeOutcome::Disconnected);
        assert!(!sample.is_connected());
        assert_eq!(sample.latency_ms, ConnectivitySample::DISCONNECTED_LATENCY_MS);
    }

    #[test]
    fn zero_latency_counts_as_disconnected() {
        let sample = ConnectivitySample {
            timestamp: 0,
            latency_ms: 0,
        };
        assert!(!sample.is_connected());
    }

    #[test]
    fn bytes_to_kbits_conversion() {
        assert_eq!(bytes_to_kbits(1024), 8.0);
        assert_eq!(bytes_to_kbits(0), 0.0);
    }

    #[test]
    fn probe_target_display() {
        let target = ProbeTarget {
            host: "8.8.8.8".to_string(),
            port: 53,
        };
        assert_eq!(target.to_string(), "8.8.8.8:53");
    }
}
