//! 저장된 샘플 로그 재생.
//!
//! 로그 파일을 한 줄씩 파이프라인에 넣어 실시간 실행과 같은 스냅샷 순서를 재현한다.
//! 실시간 루프와 같은 파이프라인에 넣으면 재생된 이력 위에서 실시간 통계가 이어진다.
//! `follow` 모드에서는 재생 후에도 파일에 추가되는 줄을 계속 읽는다.

use async_trait::async_trait;
use howsnet_core::error::CoreError;
use howsnet_core::models::statistics::{BandwidthStatistics, ConnectionStatistics};
use howsnet_core::ports::sink::StatisticsSink;
use howsnet_stats::{Analyzer, StatsPipeline};
use howsnet_storage::{LogRecord, LogTail};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 파일 추가 확인 간격
pub const FOLLOW_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// 분석 결과를 싱크로 전달
#[async_trait]
pub trait Publish: Send + Sync {
    async fn publish(&self, sink: &dyn StatisticsSink) -> Result<(), CoreError>;
}

#[async_trait]
impl Publish for ConnectionStatistics {
    async fn publish(&self, sink: &dyn StatisticsSink) -> Result<(), CoreError> {
        sink.on_connection_stats(self).await
    }
}

#[async_trait]
impl Publish for Option<BandwidthStatistics> {
    async fn publish(&self, sink: &dyn StatisticsSink) -> Result<(), CoreError> {
        match self {
            Some(stats) => sink.on_bandwidth_stats(stats).await,
            None => Ok(()),
        }
    }
}

/// 로그 파일 하나의 재생 상태
pub struct LogReplay<S, A> {
    tail: LogTail<S>,
    pipeline: Arc<StatsPipeline<S, A>>,
    sink: Arc<dyn StatisticsSink>,
}

impl<S, A> LogReplay<S, A>
where
    S: LogRecord,
    A: Analyzer<S> + 'static,
    A::Output: Publish,
{
    pub fn new(
        path: impl AsRef<Path>,
        pipeline: Arc<StatsPipeline<S, A>>,
        sink: Arc<dyn StatisticsSink>,
    ) -> Self {
        Self {
            tail: LogTail::new(path),
            pipeline,
            sink,
        }
    }

    /// 현재 파일 끝까지 재생. 줄바꿈 없는 마지막 줄도 완성된 줄로 처리한다.
    pub async fn replay_to_end(&mut self) -> Result<usize, CoreError> {
        let mut samples = self.tail.read_available().await?;
        samples.extend(self.tail.finish());
        let count = self.feed(&samples).await;

        info!(
            "{} 로그 재생 완료: {} (샘플 {}개, 건너뛴 줄 {}개)",
            S::KIND,
            self.tail.path().display(),
            count,
            self.tail.skipped()
        );
        Ok(count)
    }

    /// 완성된 줄만 재생. 쓰는 중인 마지막 줄은 다음 읽기로 미룬다.
    pub async fn replay_available(&mut self) -> Result<usize, CoreError> {
        let samples = self.tail.read_available().await?;
        Ok(self.feed(&samples).await)
    }

    /// 종료 신호까지 주기적으로 새 줄을 읽어 재생
    pub async fn follow(mut self, poll: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(
            "{} 로그 추적 시작: {}",
            S::KIND,
            self.tail.path().display()
        );
        let mut interval = tokio::time::interval(poll);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.replay_available().await {
                        Ok(0) => {}
                        Ok(n) => debug!("{} 로그 새 샘플 {n}개", S::KIND),
                        Err(e) => warn!("{} 로그 읽기 실패: {e}", S::KIND),
                    }
                }
                _ = shutdown.changed() => {
                    info!("{} 로그 추적 종료", S::KIND);
                    break;
                }
            }
        }
    }

    async fn feed(&self, samples: &[S]) -> usize {
        for sample in samples {
            let output = self.pipeline.record(*sample);
            if let Err(e) = output.publish(self.sink.as_ref()).await {
                warn!("{} 재생 통계 출력 실패: {e}", S::KIND);
            }
        }
        samples.len()
    }
}
