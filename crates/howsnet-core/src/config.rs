//! 애플리케이션 설정 구조체.
//!
//! 연결 확인/대역폭 루프 주기, 로그 영속화, 재생, 출력 형식을 정의한다.
//! `config` crate를 통해 파일/환경변수에서 로드 (`config_manager` 참조).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::sample::ProbeTarget;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 연결 확인 루프 설정
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    /// 대역폭 루프 설정
    #[serde(default)]
    pub bandwidth: BandwidthConfig,
    /// 원시 샘플 로그 설정
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// 저장된 로그 재생 설정
    #[serde(default)]
    pub replay: ReplayConfig,
    /// 통계 출력 형식
    #[serde(default)]
    pub output: OutputFormat,
}

// ============================================================
// 연결 확인 설정
// ============================================================

/// 연결 확인 루프 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// 루프 실행 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 실시간 통계 계산/출력 여부 (false면 로그만 기록)
    #[serde(default = "default_true")]
    pub live_statistics: bool,
    /// 연결 대상 호스트
    #[serde(default = "default_host")]
    pub host: String,
    /// 연결 대상 포트
    #[serde(default = "default_port")]
    pub port: u16,
    /// 연결 타임아웃 (ms)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// 확인 간격 (ms). 부하에 따라 정확히 지켜지지 않을 수 있음
    #[serde(default = "default_connectivity_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            live_statistics: true,
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            interval_ms: default_connectivity_interval_ms(),
        }
    }
}

impl ConnectivityConfig {
    /// 연결 확인 대상
    pub fn target(&self) -> ProbeTarget {
        ProbeTarget {
            host: self.host.clone(),
            port: self.port,
        }
    }

    /// 연결 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 확인 간격을 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

// ============================================================
// 대역폭 설정
// ============================================================

/// 대역폭 루프 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandwidthConfig {
    /// 루프 실행 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 실시간 통계 계산/출력 여부 (false면 로그만 기록)
    #[serde(default = "default_true")]
    pub live_statistics: bool,
    /// 측정 간격 (ms)
    #[serde(default = "default_bandwidth_interval_ms")]
    pub interval_ms: u64,
}

impl Default for BandwidthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            live_statistics: true,
            interval_ms: default_bandwidth_interval_ms(),
        }
    }
}

impl BandwidthConfig {
    /// 측정 간격을 Duration으로 반환
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

// ============================================================
// 영속화/재생 설정
// ============================================================

/// 로그 파일의 시각 표기
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// Unix epoch 초 (기본값)
    #[default]
    Epoch,
    /// 로컬 시각 `YYYY-MM-DD HH:MM:SS`
    DateTime,
}

/// 원시 샘플 로그 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// 연결 확인 샘플 로그 경로
    #[serde(default)]
    pub connectivity_log: Option<PathBuf>,
    /// 대역폭 샘플 로그 경로
    #[serde(default)]
    pub bandwidth_log: Option<PathBuf>,
    /// 시각 표기
    #[serde(default)]
    pub timestamp_format: TimestampFormat,
}

/// 저장된 로그 재생 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// 재생할 연결 확인 로그
    #[serde(default)]
    pub connectivity_log: Option<PathBuf>,
    /// 재생할 대역폭 로그
    #[serde(default)]
    pub bandwidth_log: Option<PathBuf>,
    /// 재생 후 파일에 추가되는 줄을 계속 따라 읽을지
    #[serde(default)]
    pub follow: bool,
}

impl ReplayConfig {
    /// 재생할 파일이 하나라도 있는지
    pub fn is_requested(&self) -> bool {
        self.connectivity_log.is_some() || self.bandwidth_log.is_some()
    }
}

/// 통계 출력 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// 사람이 읽는 콘솔 텍스트
    #[default]
    Console,
    /// 스냅샷당 JSON 한 줄
    JsonLines,
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 연결 확인 루프가 할 일이 있는지 (실시간 통계 또는 로그 기록)
    pub fn connectivity_active(&self) -> bool {
        self.connectivity.enabled
            && (self.connectivity.live_statistics || self.persistence.connectivity_log.is_some())
    }

    /// 대역폭 루프가 할 일이 있는지 (실시간 통계 또는 로그 기록)
    pub fn bandwidth_active(&self) -> bool {
        self.bandwidth.enabled
            && (self.bandwidth.live_statistics || self.persistence.bandwidth_log.is_some())
    }

    /// 설정 유효성 검증
    ///
    /// 간격/타임아웃이 0이거나, 실행할 루프와 재생할 파일이 모두 없으면 거부.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.connectivity.host.trim().is_empty() {
            return Err(CoreError::Config("연결 확인 호스트가 비어 있음".to_string()));
        }
        if self.connectivity.timeout_ms == 0 {
            return Err(CoreError::Config("연결 타임아웃은 0보다 커야 함".to_string()));
        }
        if self.connectivity.interval_ms == 0 || self.bandwidth.interval_ms == 0 {
            return Err(CoreError::Config("측정 간격은 0보다 커야 함".to_string()));
        }
        if !self.connectivity_active() && !self.bandwidth_active() && !self.replay.is_requested() {
            return Err(CoreError::Config(
                "실행할 작업 없음: 연결 확인, 대역폭 측정, 로그 기록, 로그 재생 중 하나 이상 필요"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}
fn default_host() -> String {
    "8.8.8.8".to_string()
}
fn default_port() -> u16 {
    53
}
fn default_timeout_ms() -> u64 {
    3_000
}
fn default_connectivity_interval_ms() -> u64 {
    10_000
}
fn default_bandwidth_interval_ms() -> u64 {
    30_000
}
