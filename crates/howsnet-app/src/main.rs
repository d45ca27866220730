//! # howsnet-app
//!
//! HOWSNET 바이너리 진입점.
//! 설정 로드, 어댑터 와이어링, 로그 재생, 퍼블리셔 실행, 종료 처리.

mod lifecycle;
mod publisher;
mod replay;
mod sinks;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use howsnet_core::config::{AppConfig, OutputFormat, TimestampFormat};
use howsnet_core::config_manager::ConfigManager;
use howsnet_core::models::sample::{BandwidthSample, ConnectivitySample};
use howsnet_core::ports::sink::StatisticsSink;
use howsnet_monitor::{SysInfoByteCounter, TcpConnectProbe};
use howsnet_stats::{BandwidthPipeline, ConnectivityPipeline};
use howsnet_storage::LineLogWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::LifecycleManager;
use crate::publisher::StatisticsPublisher;
use crate::replay::{LogReplay, FOLLOW_POLL_INTERVAL};

/// 통계 출력 형식
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputArg {
    /// 사람이 읽는 텍스트
    Console,
    /// 스냅샷당 JSON 한 줄
    JsonLines,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Console => OutputFormat::Console,
            OutputArg::JsonLines => OutputFormat::JsonLines,
        }
    }
}

/// HOWSNET 네트워크 상태 모니터
///
/// 참조 호스트로의 연결 끊김과 네트워크 사용량을 주기적으로 측정하고 통계를 출력한다.
#[derive(Parser, Debug)]
#[command(name = "howsnet")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 연결 확인 대상 호스트
    #[arg(long)]
    host: Option<String>,

    /// 연결 확인 대상 포트
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 연결 타임아웃 (초)
    #[arg(long, short = 't')]
    timeout: Option<f64>,

    /// 연결 확인 간격 (초). 부하에 따라 정확히 지켜지지 않을 수 있음
    #[arg(long = "delay-internet")]
    delay_internet: Option<f64>,

    /// 대역폭 측정 간격 (초)
    #[arg(long = "delay-bandwidth")]
    delay_bandwidth: Option<f64>,

    /// 연결 확인 루프 끄기
    #[arg(long)]
    no_connectivity: bool,

    /// 대역폭 루프 끄기
    #[arg(long)]
    no_bandwidth: bool,

    /// 통계 없이 로그 파일에만 기록
    #[arg(long)]
    record_only: bool,

    /// 연결 확인 샘플을 기록할 파일
    #[arg(long = "file-internet")]
    file_internet: Option<PathBuf>,

    /// 대역폭 샘플을 기록할 파일
    #[arg(long = "file-bandwidth")]
    file_bandwidth: Option<PathBuf>,

    /// 로그 파일에 epoch 초 대신 로컬 날짜시각 기록
    #[arg(long)]
    datetime: bool,

    /// 저장된 연결 확인 로그 재생
    #[arg(long = "read-internet-file")]
    read_internet_file: Option<PathBuf>,

    /// 저장된 대역폭 로그 재생
    #[arg(long = "read-bandwidth-file")]
    read_bandwidth_file: Option<PathBuf>,

    /// 재생 후 파일에 추가되는 줄을 계속 읽기
    #[arg(long)]
    follow: bool,

    /// 통계 출력 형식
    #[arg(long, short = 'o', value_enum)]
    output: Option<OutputArg>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// 초 단위 CLI 값을 ms로 변환 (음수는 0 → 검증에서 거부)
fn secs_to_ms(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

/// CLI 인자로 설정 덮어쓰기 (파일/환경변수보다 우선)
fn apply_overrides(args: &Args, config: &mut AppConfig) {
    if let Some(ref host) = args.host {
        config.connectivity.host = host.clone();
    }
    if let Some(port) = args.port {
        config.connectivity.port = port;
    }
    if let Some(timeout) = args.timeout {
        config.connectivity.timeout_ms = secs_to_ms(timeout);
    }
    if let Some(delay) = args.delay_internet {
        config.connectivity.interval_ms = secs_to_ms(delay);
    }
    if let Some(delay) = args.delay_bandwidth {
        config.bandwidth.interval_ms = secs_to_ms(delay);
    }
    if args.no_connectivity {
        config.connectivity.enabled = false;
    }
    if args.no_bandwidth {
        config.bandwidth.enabled = false;
    }
    if args.record_only {
        config.connectivity.live_statistics = false;
        config.bandwidth.live_statistics = false;
    }
    if args.file_internet.is_some() {
        config.persistence.connectivity_log = args.file_internet.clone();
    }
    if args.file_bandwidth.is_some() {
        config.persistence.bandwidth_log = args.file_bandwidth.clone();
    }
    if args.datetime {
        config.persistence.timestamp_format = TimestampFormat::DateTime;
    }
    if args.read_internet_file.is_some() {
        config.replay.connectivity_log = args.read_internet_file.clone();
    }
    if args.read_bandwidth_file.is_some() {
        config.replay.bandwidth_log = args.read_bandwidth_file.clone();
    }
    if args.follow {
        config.replay.follow = true;
    }
    if let Some(output) = args.output {
        config.output = output.into();
    }
}

/// 설정 로드: 파일 ← 환경변수 ← CLI
fn load_config(args: &Args) -> Result<AppConfig> {
    let manager = match args.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => match ConfigManager::new() {
            Ok(manager) => manager,
            Err(e) => {
                warn!("설정 경로 결정 실패, 현재 디렉토리 사용: {e}");
                ConfigManager::with_path(PathBuf::from("howsnet.json"))
            }
        },
    };
    info!("설정 파일: {}", manager.config_path().display());

    let mut config = manager.load().context("설정 로드 실패")?;
    apply_overrides(args, &mut config);
    config.validate().context("설정 검증 실패")?;
    Ok(config)
}

/// 퍼블리셔 생성 및 로그 기록기 연결
async fn build_publisher(
    config: &AppConfig,
    sink: Arc<dyn StatisticsSink>,
) -> Result<StatisticsPublisher> {
    let format = config.persistence.timestamp_format;
    let mut publisher = StatisticsPublisher::new(
        config.clone(),
        Arc::new(TcpConnectProbe::new()),
        Arc::new(SysInfoByteCounter::new()),
        sink,
    );

    if config.connectivity.enabled {
        if let Some(ref path) = config.persistence.connectivity_log {
            let writer = LineLogWriter::<ConnectivitySample>::open(path, format)
                .await
                .with_context(|| format!("연결 확인 로그 열기 실패: {}", path.display()))?;
            publisher = publisher.with_connectivity_log(Arc::new(writer));
        }
    }

    if config.bandwidth.enabled {
        if let Some(ref path) = config.persistence.bandwidth_log {
            let writer = LineLogWriter::<BandwidthSample>::open(path, format)
                .await
                .with_context(|| format!("대역폭 로그 열기 실패: {}", path.display()))?;
            publisher = publisher.with_bandwidth_log(Arc::new(writer));
        }
    }

    Ok(publisher)
}

/// 저장된 로그 재생.
///
/// 같은 종류의 실시간 루프가 통계를 내고 `follow`가 아니면 실시간 이력을 미리 채운다.
/// 그 외에는 재생 전용 이력을 쓴다. `follow` 태스크 핸들을 반환한다.
async fn run_replays(
    config: &AppConfig,
    publisher: &StatisticsPublisher,
    sink: &Arc<dyn StatisticsSink>,
    lifecycle: &LifecycleManager,
) -> Result<Vec<JoinHandle<()>>> {
    let mut followers = Vec::new();
    let follow = config.replay.follow;

    if let Some(ref path) = config.replay.connectivity_log {
        let seeds_live = !follow && config.connectivity_active() && config.connectivity.live_statistics;
        let pipeline = if seeds_live {
            publisher.connectivity_pipeline()
        } else {
            Arc::new(ConnectivityPipeline::connectivity(config.connectivity.interval()))
        };

        let mut replay = LogReplay::new(path, pipeline, sink.clone());
        let replayed = if follow {
            replay.replay_available().await
        } else {
            replay.replay_to_end().await
        };
        replayed.with_context(|| format!("연결 확인 로그 재생 실패: {}", path.display()))?;

        if follow {
            followers.push(tokio::spawn(
                replay.follow(FOLLOW_POLL_INTERVAL, lifecycle.subscribe()),
            ));
        }
    }

    if let Some(ref path) = config.replay.bandwidth_log {
        let seeds_live = !follow && config.bandwidth_active() && config.bandwidth.live_statistics;
        let pipeline = if seeds_live {
            publisher.bandwidth_pipeline()
        } else {
            Arc::new(BandwidthPipeline::bandwidth(config.bandwidth.interval()))
        };

        let mut replay = LogReplay::new(path, pipeline, sink.clone());
        let replayed = if follow {
            replay.replay_available().await
        } else {
            replay.replay_to_end().await
        };
        replayed.with_context(|| format!("대역폭 로그 재생 실패: {}", path.display()))?;

        if follow {
            followers.push(tokio::spawn(
                replay.follow(FOLLOW_POLL_INTERVAL, lifecycle.subscribe()),
            ));
        }
    }

    Ok(followers)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화 (stdout은 통계 출력용이므로 stderr로)
    let log_filter = format!(
        "howsnet={},howsnet_app={},howsnet_core={},howsnet_stats={},howsnet_monitor={},howsnet_storage={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("HOWSNET 시작 (v{})", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let sink = sinks::stdout_sink(config.output);
    let lifecycle = Arc::new(LifecycleManager::new());

    let publisher = build_publisher(&config, sink.clone()).await?;
    let followers = run_replays(&config, &publisher, &sink, &lifecycle).await?;

    let live = config.connectivity_active() || config.bandwidth_active();
    if !live && followers.is_empty() {
        info!("재생 완료, 종료");
        return Ok(());
    }

    let shutdown_rx = lifecycle.subscribe();
    let publisher_task = tokio::spawn(async move {
        publisher.run(shutdown_rx).await;
    });

    info!("HOWSNET 실행 중 (Ctrl+C로 종료)");

    // OS 시그널 대기
    lifecycle.wait_for_signal().await;

    if let Err(e) = publisher_task.await {
        warn!("퍼블리셔 태스크 종료 실패: {e}");
    }
    for follower in followers {
        if let Err(e) = follower.await {
            warn!("로그 추적 태스크 종료 실패: {e}");
        }
    }

    info!("HOWSNET 종료");
    Ok(())
}
