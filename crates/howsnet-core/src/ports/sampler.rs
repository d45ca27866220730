//! 샘플러 포트.
//!
//! 구현: `howsnet-monitor` crate (tokio TCP 연결, sysinfo 네트워크 카운터)

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::sample::{ProbeOutcome, ProbeTarget};

/// 연결 확인 (참조 호스트에 TCP 연결 시도)
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// 대상에 연결을 시도하고 결과 반환.
    ///
    /// 타임아웃/거부는 `ProbeOutcome::Disconnected`로 표현하며 `timeout`을 넘지 않는다.
    async fn probe(&self, target: &ProbeTarget, timeout: Duration) -> ProbeOutcome;
}

/// 네트워크 인터페이스 누적 바이트 카운터
#[async_trait]
pub trait ByteCounter: Send + Sync {
    /// 전체 인터페이스의 송수신 누적 바이트 합계
    async fn read_total_bytes(&self) -> Result<u64, CoreError>;
}
