//! 이력 + 분석기 파이프라인.
//!
//! 이력의 단일 작성자. `record`는 추가와 분석을 하나의 잠금 안에서 수행하므로
//! 분석이 진행 중인 추가와 겹치지 않는다. 실시간 루프와 로그 재생이 같은 경로를 쓰므로
//! 같은 샘플 순서는 같은 스냅샷 순서를 만든다.

use howsnet_core::models::sample::{BandwidthSample, ConnectivitySample, TimedSample};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::bandwidth::BandwidthAnalyzer;
use crate::disconnection::DisconnectionAnalyzer;
use crate::history::{Placement, SampleHistory};
use crate::Analyzer;

/// 연결 확인 파이프라인
pub type ConnectivityPipeline = StatsPipeline<ConnectivitySample, DisconnectionAnalyzer>;

/// 대역폭 파이프라인
pub type BandwidthPipeline = StatsPipeline<BandwidthSample, BandwidthAnalyzer>;

/// 샘플 이력을 소유하고 매 샘플마다 스냅샷을 계산
pub struct StatsPipeline<S, A> {
    history: Mutex<SampleHistory<S>>,
    analyzer: A,
}

impl<S, A> StatsPipeline<S, A>
where
    S: TimedSample,
    A: Analyzer<S>,
{
    /// 빈 이력으로 생성
    pub fn new(analyzer: A) -> Self {
        Self {
            history: Mutex::new(SampleHistory::new()),
            analyzer,
        }
    }

    /// 샘플 추가 후 전체 이력으로 스냅샷 계산
    pub fn record(&self, sample: S) -> A::Output {
        let mut history = self.history.lock();
        if let Placement::Reordered { index } = history.append(sample) {
            warn!(
                "시각이 역전된 샘플을 정렬 위치에 삽입: ts={}, index={}/{}",
                sample.timestamp(),
                index,
                history.len()
            );
        }
        debug!("샘플 기록: ts={}, 이력 {}개", sample.timestamp(), history.len());
        self.analyzer.analyze(history.as_slice())
    }

    /// 현재 이력으로 스냅샷 계산 (추가 없음)
    pub fn current(&self) -> A::Output {
        self.analyzer.analyze(self.history.lock().as_slice())
    }

    /// 이력 복제본
    pub fn samples(&self) -> Vec<S> {
        self.history.lock().as_slice().to_vec()
    }

    /// 이력 길이
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }
}

impl ConnectivityPipeline {
    /// 예상 틱 간격으로 연결 확인 파이프라인 생성
    pub fn connectivity(expected_tick: Duration) -> Self {
        Self::new(DisconnectionAnalyzer::new(expected_tick))
    }
}

impl BandwidthPipeline {
    /// 예상 틱 간격으로 대역폭 파이프라인 생성
    pub fn bandwidth(expected_tick: Duration) -> Self {
        Self::new(BandwidthAnalyzer::new(expected_tick))
    }
}
