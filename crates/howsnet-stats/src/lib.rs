//! # howsnet-stats
//!
//! 통계 산출 엔진.
//! 추가 전용 샘플 이력으로부터 시점별 통계 스냅샷을 계산한다.
//! 분석기는 이력에 대한 순수 함수이며, 이력의 단일 작성자는 [`pipeline::StatsPipeline`]이다.

pub mod bandwidth;
pub mod disconnection;
pub mod history;
pub mod pipeline;

use std::time::Duration;

pub use bandwidth::BandwidthAnalyzer;
pub use disconnection::DisconnectionAnalyzer;
pub use history::{Placement, SampleHistory};
pub use pipeline::{BandwidthPipeline, ConnectivityPipeline, StatsPipeline};

/// 이력 → 스냅샷 분석기
pub trait Analyzer<S>: Send + Sync {
    /// 스냅샷 타입
    type Output: Send;

    /// 정렬된 이력 전체로부터 스냅샷 계산. 실패하지 않는다.
    fn analyze(&self, history: &[S]) -> Self::Output;
}

/// 예상 틱 간격을 정수 초로 반올림
pub(crate) fn tick_secs(expected_tick: Duration) -> i64 {
    expected_tick.as_secs_f64().round() as i64
}
