//! 통계 출력 포트.
//!
//! 구현: `howsnet-app` (콘솔 텍스트, JSON Lines)
//! 출력 변형은 조합 시점에 선택한다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::sample::SampleKind;
use crate::models::statistics::{BandwidthStatistics, ConnectionStatistics};

/// 통계 스냅샷 수신자 (push 콜백)
///
/// 스냅샷은 불변이며, 틱을 넘어 보관하려면 복제해야 한다.
#[async_trait]
pub trait StatisticsSink: Send + Sync {
    /// 연결 통계 갱신
    async fn on_connection_stats(&self, stats: &ConnectionStatistics) -> Result<(), CoreError>;

    /// 대역폭 통계 갱신
    async fn on_bandwidth_stats(&self, stats: &BandwidthStatistics) -> Result<(), CoreError>;

    /// 치명적이지 않은 경고 (로그 기록 실패 등). 기본 구현은 무시.
    async fn on_warning(&self, _kind: SampleKind, _message: &str) -> Result<(), CoreError> {
        Ok(())
    }
}
