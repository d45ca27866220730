//! 2-루프 통계 퍼블리셔.
//!
//! 연결 확인(기본 10초)과 대역폭(기본 30초) 루프를 서로 독립된 태스크로 실행한다.
//! 각 틱: 샘플 수집 → 로그 기록 → 이력 추가 + 분석 → 싱크 전달.
//! 로그 기록은 분석보다 먼저 수행되며 실패해도 샘플링은 계속된다.

use howsnet_core::config::AppConfig;
use howsnet_core::models::sample::{
    bytes_to_kbits, unix_now, BandwidthSample, ConnectivitySample, SampleKind,
};
use howsnet_core::ports::sample_log::SampleLog;
use howsnet_core::ports::sampler::{ByteCounter, ConnectivityProbe};
use howsnet_core::ports::sink::StatisticsSink;
use howsnet_stats::{BandwidthPipeline, ConnectivityPipeline};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// 세션 누적 사용량.
///
/// 첫 읽기를 기준값으로 삼고 이후 증가분만 누적한다.
/// OS 카운터가 줄어들면(인터페이스 제거, 카운터 초기화) 그 읽기를 새 기준으로 삼아
/// 누적값이 감소하지 않게 한다.
#[derive(Debug, Default)]
struct SessionUsage {
    last_reading: Option<u64>,
    used_bytes: u64,
}

impl SessionUsage {
    /// 카운터 읽기 반영 후 세션 누적 바이트 반환
    fn update(&mut self, reading: u64) -> u64 {
        match self.last_reading {
            Some(last) if reading >= last => {
                self.used_bytes = self.used_bytes.saturating_add(reading - last);
            }
            Some(last) => {
                warn!("네트워크 카운터 감소 ({last} → {reading}), 기준값 재설정");
            }
            None => debug!("대역폭 기준값: {reading} 바이트"),
        }
        self.last_reading = Some(reading);
        self.used_bytes
    }
}

/// 통계 퍼블리셔
pub struct StatisticsPublisher {
    config: AppConfig,
    probe: Arc<dyn ConnectivityProbe>,
    byte_counter: Arc<dyn ByteCounter>,
    sink: Arc<dyn StatisticsSink>,
    connectivity: Arc<ConnectivityPipeline>,
    bandwidth: Arc<BandwidthPipeline>,
    connectivity_log: Option<Arc<dyn SampleLog<ConnectivitySample>>>,
    bandwidth_log: Option<Arc<dyn SampleLog<BandwidthSample>>>,
}

impl StatisticsPublisher {
    /// 새 퍼블리셔 생성. 이력은 설정된 틱 간격으로 만든 빈 파이프라인에서 시작한다.
    pub fn new(
        config: AppConfig,
        probe: Arc<dyn ConnectivityProbe>,
        byte_counter: Arc<dyn ByteCounter>,
        sink: Arc<dyn StatisticsSink>,
    ) -> Self {
        let connectivity = Arc::new(ConnectivityPipeline::connectivity(
            config.connectivity.interval(),
        ));
        let bandwidth = Arc::new(BandwidthPipeline::bandwidth(config.bandwidth.interval()));
        Self {
            config,
            probe,
            byte_counter,
            sink,
            connectivity,
            bandwidth,
            connectivity_log: None,
            bandwidth_log: None,
        }
    }

    /// 연결 확인 샘플 로그 설정
    pub fn with_connectivity_log(mut self, log: Arc<dyn SampleLog<ConnectivitySample>>) -> Self {
        self.connectivity_log = Some(log);
        self
    }

    /// 대역폭 샘플 로그 설정
    pub fn with_bandwidth_log(mut self, log: Arc<dyn SampleLog<BandwidthSample>>) -> Self {
        self.bandwidth_log = Some(log);
        self
    }

    /// 연결 확인 이력 (재생으로 미리 채울 때 사용)
    pub fn connectivity_pipeline(&self) -> Arc<ConnectivityPipeline> {
        self.connectivity.clone()
    }

    /// 대역폭 이력 (재생으로 미리 채울 때 사용)
    pub fn bandwidth_pipeline(&self) -> Arc<BandwidthPipeline> {
        self.bandwidth.clone()
    }

    /// 활성화된 루프를 시작하고 모두 끝날 때까지 대기
    pub async fn run(&self, shutdown_rx: watch::Receiver<bool>) {
        let mut tasks: Vec<JoinHandle<()>> = Vec::new();

        if self.config.connectivity_active() {
            tasks.push(self.spawn_connectivity_loop(shutdown_rx.clone()));
        } else {
            info!("연결 확인 루프 비활성");
        }

        if self.config.bandwidth_active() {
            tasks.push(self.spawn_bandwidth_loop(shutdown_rx.clone()));
        } else {
            info!("대역폭 루프 비활성");
        }

        for task in tasks {
            if let Err(e) = task.await {
                warn!("퍼블리셔 루프 비정상 종료: {e}");
            }
        }
        info!("퍼블리셔 종료");
    }

    // ============================================================
    // 1. 연결 확인 루프
    // ============================================================
    fn spawn_connectivity_loop(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let probe = self.probe.clone();
        let sink = self.sink.clone();
        let pipeline = self.connectivity.clone();
        let log = self.connectivity_log.clone();
        let target = self.config.connectivity.target();
        let timeout = self.config.connectivity.timeout();
        let period = self.config.connectivity.interval();
        let live = self.config.connectivity.live_statistics;

        info!(
            "연결 확인 루프 시작: 대상={target}, 간격={}ms, 타임아웃={}ms, 실시간={live}",
            period.as_millis(),
            timeout.as_millis()
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let outcome = probe.probe(&target, timeout).await;
                        let sample = ConnectivitySample::from_outcome(unix_now(), outcome);
                        debug!("연결 확인: ts={}, 지연={}ms", sample.timestamp, sample.latency_ms);

                        if let Some(ref log) = log {
                            if let Err(e) = log.append(&sample).await {
                                report_warning(sink.as_ref(), SampleKind::Connectivity, LOG_FAILURE, &e.to_string()).await;
                            }
                        }

                        if live {
                            let stats = pipeline.record(sample);
                            if let Err(e) = sink.on_connection_stats(&stats).await {
                                warn!("연결 통계 출력 실패: {e}");
                            }
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("연결 확인 루프 종료");
                        break;
                    }
                }
            }
        })
    }

    // ============================================================
    // 2. 대역폭 루프
    // ============================================================
    fn spawn_bandwidth_loop(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let counter = self.byte_counter.clone();
        let sink = self.sink.clone();
        let pipeline = self.bandwidth.clone();
        let log = self.bandwidth_log.clone();
        let period = self.config.bandwidth.interval();
        let live = self.config.bandwidth.live_statistics;

        info!(
            "대역폭 루프 시작: 간격={}ms, 실시간={live}",
            period.as_millis()
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut usage = SessionUsage::default();

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let reading = match counter.read_total_bytes().await {
                            Ok(bytes) => bytes,
                            Err(e) => {
                                report_warning(sink.as_ref(), SampleKind::Bandwidth, "네트워크 카운터 읽기 실패", &e.to_string()).await;
                                continue;
                            }
                        };
                        let sample = BandwidthSample::new(unix_now(), bytes_to_kbits(usage.update(reading)));
                        debug!("대역폭: ts={}, 누적={:.1}Kbit", sample.timestamp, sample.cumulative_kbits);

                        if let Some(ref log) = log {
                            if let Err(e) = log.append(&sample).await {
                                report_warning(sink.as_ref(), SampleKind::Bandwidth, LOG_FAILURE, &e.to_string()).await;
                            }
                        }

                        if live {
                            if let Some(stats) = pipeline.record(sample) {
                                if let Err(e) = sink.on_bandwidth_stats(&stats).await {
                                    warn!("대역폭 통계 출력 실패: {e}");
                                }
                            }
                        }
                    }
                    _ = shutdown.changed() => {
                        info!("대역폭 루프 종료");
                        break;
                    }
                }
            }
        })
    }
}

const LOG_FAILURE: &str = "샘플 로그 기록 실패";

/// 복구 가능한 실패는 경고로만 알리고 샘플링은 계속한다
async fn report_warning(sink: &dyn StatisticsSink, kind: SampleKind, what: &str, message: &str) {
    warn!("{kind} {what}: {message}");
    if let Err(e) = sink.on_warning(kind, message).await {
        warn!("경고 출력 실패: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use howsnet_core::error::CoreError;
    use howsnet_core::models::sample::{ProbeOutcome, ProbeTarget};
    use howsnet_core::models::statistics::{BandwidthStatistics, ConnectionStatistics};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    // -- 테스트 더블 --

    /// 준비된 결과를 순서대로 반환, 소진되면 연결 성공
    struct ScriptedProbe {
        outcomes: Mutex<VecDeque<ProbeOutcome>>,
        delay: Duration,
    }

    impl ScriptedProbe {
        fn new(outcomes: Vec<ProbeOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                delay: Duration::ZERO,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                outcomes: Mutex::new(VecDeque::new()),
                delay,
            }
        }
    }

    #[async_trait]
    impl ConnectivityProbe for ScriptedProbe {
        async fn probe(&self, _target: &ProbeTarget, _timeout: Duration) -> ProbeOutcome {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcomes
                .lock()
                .pop_front()
                .unwrap_or(ProbeOutcome::Connected(Duration::from_millis(20)))
        }
    }

    /// 읽을 때마다 1024바이트씩 증가
    struct SteppingCounter {
        next: AtomicU64,
    }

    impl SteppingCounter {
        fn starting_at(bytes: u64) -> Self {
            Self {
                next: AtomicU64::new(bytes),
            }
        }
    }

    #[async_trait]
    impl ByteCounter for SteppingCounter {
        async fn read_total_bytes(&self) -> Result<u64, CoreError> {
            Ok(self.next.fetch_add(1024, Ordering::SeqCst))
        }
    }

    struct BrokenCounter;

    #[async_trait]
    impl ByteCounter for BrokenCounter {
        async fn read_total_bytes(&self) -> Result<u64, CoreError> {
            Err(CoreError::Sampler("카운터 없음".to_string()))
        }
    }

    /// 첫 읽기만 실패하고 이후에는 정상
    struct FlakyCounter {
        reads: AtomicU64,
    }

    #[async_trait]
    impl ByteCounter for FlakyCounter {
        async fn read_total_bytes(&self) -> Result<u64, CoreError> {
            match self.reads.fetch_add(1, Ordering::SeqCst) {
                0 => Err(CoreError::Sampler("인터페이스 재시작".to_string())),
                n => Ok(n * 1024),
            }
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        connection: Mutex<Vec<ConnectionStatistics>>,
        bandwidth: Mutex<Vec<BandwidthStatistics>>,
        warnings: Mutex<Vec<(SampleKind, String)>>,
    }

    #[async_trait]
    impl StatisticsSink for CollectingSink {
        async fn on_connection_stats(&self, stats: &ConnectionStatistics) -> Result<(), CoreError> {
            self.connection.lock().push(stats.clone());
            Ok(())
        }

        async fn on_bandwidth_stats(&self, stats: &BandwidthStatistics) -> Result<(), CoreError> {
            self.bandwidth.lock().push(stats.clone());
            Ok(())
        }

        async fn on_warning(&self, kind: SampleKind, message: &str) -> Result<(), CoreError> {
            self.warnings.lock().push((kind, message.to_string()));
            Ok(())
        }
    }

    /// 경고 출력이 항상 실패하는 싱크
    #[derive(Default)]
    struct RejectingWarningSink {
        inner: CollectingSink,
    }

    #[async_trait]
    impl StatisticsSink for RejectingWarningSink {
        async fn on_connection_stats(&self, stats: &ConnectionStatistics) -> Result<(), CoreError> {
            self.inner.on_connection_stats(stats).await
        }

        async fn on_bandwidth_stats(&self, stats: &BandwidthStatistics) -> Result<(), CoreError> {
            self.inner.on_bandwidth_stats(stats).await
        }

        async fn on_warning(&self, kind: SampleKind, message: &str) -> Result<(), CoreError> {
            self.inner.on_warning(kind, message).await?;
            Err(CoreError::Io(std::io::Error::other("stdout 닫힘")))
        }
    }

    struct MemoryLog<S> {
        samples: Mutex<Vec<S>>,
    }

    impl<S> Default for MemoryLog<S> {
        fn default() -> Self {
            Self {
                samples: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl<S: Copy + Send + Sync> SampleLog<S> for MemoryLog<S> {
        async fn append(&self, sample: &S) -> Result<(), CoreError> {
            self.samples.lock().push(*sample);
            Ok(())
        }
    }

    struct FailingLog;

    #[async_trait]
    impl<S: Sync> SampleLog<S> for FailingLog {
        async fn append(&self, _sample: &S) -> Result<(), CoreError> {
            Err(CoreError::Io(std::io::Error::other("디스크 가득 참")))
        }
    }

    fn fast_config() -> AppConfig {
        let mut config = AppConfig::default_config();
        config.connectivity.interval_ms = 10;
        config.connectivity.timeout_ms = 5;
        config.bandwidth.interval_ms = 10;
        config
    }

    /// `duration` 동안 실행 후 종료
    async fn run_for(publisher: StatisticsPublisher, duration: Duration) {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { publisher.run(rx).await });
        tokio::time::sleep(duration).await;
        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn session_usage_starts_at_zero_and_never_decreases() {
        let mut usage = SessionUsage::default();
        assert_eq!(usage.update(10_000), 0);
        assert_eq!(usage.update(10_500), 500);
        assert_eq!(usage.update(200), 500);
        assert_eq!(usage.update(300), 600);
    }

    #[tokio::test(start_paused = true)]
    async fn both_loops_publish_snapshots() {
        let sink = Arc::new(CollectingSink::default());
        let publisher = StatisticsPublisher::new(
            fast_config(),
            Arc::new(ScriptedProbe::new(vec![
                ProbeOutcome::Connected(Duration::from_millis(12)),
                ProbeOutcome::Disconnected,
            ])),
            Arc::new(SteppingCounter::starting_at(1_000_000)),
            sink.clone(),
        );
        let connectivity = publisher.connectivity_pipeline();

        run_for(publisher, Duration::from_millis(55)).await;

        let connection = sink.connection.lock();
        assert!(connection.len() >= 3);
        assert!(connection[0].currently_connected);
        assert_eq!(connection[0].current_latency_ms, 12);
        assert!(!connection[1].currently_connected);
        assert!(connection[1].disconnection_count >= 1);
        assert_eq!(connectivity.len(), connection.len());

        let bandwidth = sink.bandwidth.lock();
        assert!(bandwidth.len() >= 3);
        // 첫 샘플은 기준값 그 자체 → 0
        assert_eq!(bandwidth[0].total_use_kbits, 0.0);
        assert!(bandwidth.last().unwrap().total_use_kbits > 0.0);
        assert!(sink.warnings.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_loop_publishes_nothing() {
        let mut config = fast_config();
        config.bandwidth.enabled = false;
        let sink = Arc::new(CollectingSink::default());
        let publisher = StatisticsPublisher::new(
            config,
            Arc::new(ScriptedProbe::new(vec![])),
            Arc::new(SteppingCounter::starting_at(0)),
            sink.clone(),
        );

        run_for(publisher, Duration::from_millis(35)).await;

        assert!(!sink.connection.lock().is_empty());
        assert!(sink.bandwidth.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn record_only_persists_without_statistics() {
        let mut config = fast_config();
        config.connectivity.live_statistics = false;
        config.bandwidth.enabled = false;
        config.persistence.connectivity_log = Some("internet.log".into());

        let log = Arc::new(MemoryLog::<ConnectivitySample>::default());
        let sink = Arc::new(CollectingSink::default());
        let publisher = StatisticsPublisher::new(
            config,
            Arc::new(ScriptedProbe::new(vec![ProbeOutcome::Disconnected])),
            Arc::new(SteppingCounter::starting_at(0)),
            sink.clone(),
        )
        .with_connectivity_log(log.clone());
        let pipeline = publisher.connectivity_pipeline();

        run_for(publisher, Duration::from_millis(35)).await;

        let samples = log.samples.lock();
        assert!(samples.len() >= 2);
        assert!(!samples[0].is_connected());
        assert!(samples[1].is_connected());
        assert!(sink.connection.lock().is_empty());
        assert!(pipeline.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn log_failure_is_warning_and_sampling_continues() {
        let mut config = fast_config();
        config.bandwidth.enabled = false;
        let sink = Arc::new(CollectingSink::default());
        let publisher = StatisticsPublisher::new(
            config,
            Arc::new(ScriptedProbe::new(vec![])),
            Arc::new(SteppingCounter::starting_at(0)),
            sink.clone(),
        )
        .with_connectivity_log(Arc::new(FailingLog));

        run_for(publisher, Duration::from_millis(35)).await;

        let warnings = sink.warnings.lock();
        let stats = sink.connection.lock();
        assert!(stats.len() >= 2);
        assert_eq!(warnings.len(), stats.len());
        assert!(warnings.iter().all(|(kind, _)| *kind == SampleKind::Connectivity));
    }

    #[tokio::test(start_paused = true)]
    async fn counter_failure_skips_tick() {
        let mut config = fast_config();
        config.connectivity.enabled = false;
        let sink = Arc::new(CollectingSink::default());
        let publisher = StatisticsPublisher::new(
            config,
            Arc::new(ScriptedProbe::new(vec![])),
            Arc::new(BrokenCounter),
            sink.clone(),
        );
        let pipeline = publisher.bandwidth_pipeline();

        run_for(publisher, Duration::from_millis(25)).await;

        assert!(sink.bandwidth.lock().is_empty());
        assert!(!sink.warnings.lock().is_empty());
        assert!(pipeline.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn counter_failure_survives_rejected_warning() {
        let mut config = fast_config();
        config.connectivity.enabled = false;
        let sink = Arc::new(RejectingWarningSink::default());
        let publisher = StatisticsPublisher::new(
            config,
            Arc::new(ScriptedProbe::new(vec![])),
            Arc::new(FlakyCounter {
                reads: AtomicU64::new(0),
            }),
            sink.clone(),
        );

        run_for(publisher, Duration::from_millis(25)).await;

        assert_eq!(sink.inner.warnings.lock().len(), 1);
        assert!(!sink.inner.bandwidth.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_does_not_block_bandwidth_loop() {
        let mut config = fast_config();
        config.connectivity.interval_ms = 1_000;
        let sink = Arc::new(CollectingSink::default());
        let publisher = StatisticsPublisher::new(
            config,
            Arc::new(ScriptedProbe::slow(Duration::from_secs(10))),
            Arc::new(SteppingCounter::starting_at(0)),
            sink.clone(),
        );

        // 진행 중인 연결 확인은 종료 신호로 끊기지 않으므로 실행 중에 확인
        let (_tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { publisher.run(rx).await });
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(sink.connection.lock().is_empty());
        assert!(sink.bandwidth.lock().len() >= 5);
        handle.abort();
    }
}
