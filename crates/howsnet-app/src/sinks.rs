//! 통계 출력 어댑터.
//!
//! `StatisticsSink` 포트 구현 두 가지:
//! - `ConsoleClient`: 사람이 읽는 텍스트 블록
//! - `JsonLinesClient`: 스냅샷당 JSON 한 줄 (`{"kind": ..., "stats": ...}`)
//!
//! 기본 출력은 stdout. 로그(tracing)는 stderr로 가므로 섞이지 않는다.

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use howsnet_core::config::OutputFormat;
use howsnet_core::error::CoreError;
use howsnet_core::models::sample::SampleKind;
use howsnet_core::models::statistics::{BandwidthStatistics, ConnectionStatistics};
use howsnet_core::ports::sink::StatisticsSink;
use howsnet_core::units::{duration_to_str, kbits_to_str, ping_to_str};
use parking_lot::Mutex;
use serde::Serialize;
use std::io::{self, Stdout, Write};
use std::sync::Arc;

/// 출력 형식에 맞는 stdout 싱크 생성
pub fn stdout_sink(format: OutputFormat) -> Arc<dyn StatisticsSink> {
    match format {
        OutputFormat::Console => Arc::new(ConsoleClient::stdout()),
        OutputFormat::JsonLines => Arc::new(JsonLinesClient::stdout()),
    }
}

// ============================================================
// 콘솔 텍스트
// ============================================================

/// 콘솔 텍스트 출력
pub struct ConsoleClient<W = Stdout> {
    out: Mutex<W>,
}

impl ConsoleClient<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleClient<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, block: &str) -> Result<(), CoreError> {
        let mut out = self.out.lock();
        writeln!(out)?;
        out.write_all(block.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// 내부 출력 대상을 돌려받는다
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

/// 연결 통계 텍스트 블록
pub fn render_connection(stats: &ConnectionStatistics) -> String {
    let state = if stats.currently_connected {
        "연결됨"
    } else {
        "연결 끊김"
    };
    let latency = |ms: Option<i64>| ms.map_or_else(|| "-".to_string(), |v| ping_to_str(v as f64));
    let mean_latency = stats
        .mean_latency_ms
        .map_or_else(|| "-".to_string(), ping_to_str);

    let mut block = String::new();
    block.push_str(&format!(
        "현재 상태: {state} ({}, {} 유지)\n",
        ping_to_str(stats.current_latency_ms as f64),
        duration_to_str(stats.current_state_secs)
    ));

    if stats.disconnection_count > 0 {
        let estimate = if stats.longest_is_estimate {
            " (진행 중, 추정)"
        } else {
            ""
        };
        block.push_str(&format!(
            "최장 끊김: {}{estimate}, 시작 {}\n",
            duration_to_str(stats.longest_disconnection_secs),
            format_local(stats.longest_disconnection_start)
        ));
    } else {
        block.push_str("최장 끊김: -\n");
    }

    block.push_str(&format!(
        "평균 끊김 시간: {:.0}s\n",
        stats.mean_disconnection_secs
    ));
    block.push_str(&format!("총 끊김 횟수: {}\n", stats.disconnection_count));
    block.push_str(&format!(
        "시간당 평균 끊김: {:.2}\n",
        stats.disconnections_per_hour
    ));
    block.push_str(&format!(
        "지연 시간: 최소 {} / 최대 {} / 평균 {}\n",
        latency(stats.min_latency_ms),
        latency(stats.max_latency_ms),
        mean_latency
    ));
    block
}

/// 대역폭 통계 텍스트 블록
pub fn render_bandwidth(stats: &BandwidthStatistics) -> String {
    let estimate = if stats.estimated { " (추정)" } else { "" };

    let mut block = String::new();
    block.push_str(&format!(
        "직전 측정 이후 사용량: {}\n",
        kbits_to_str(stats.current_use_kbits)
    ));
    block.push_str(&format!(
        "직전 측정 이후 속도: {}/s\n",
        kbits_to_str(stats.current_rate_kbits)
    ));
    block.push_str(&format!(
        "시작 이후 평균 속도: {}/s{estimate}\n",
        kbits_to_str(stats.mean_rate_kbits)
    ));
    block.push_str(&format!(
        "총 사용량: {}\n",
        kbits_to_str(stats.total_use_kbits)
    ));
    block.push_str(&format!(
        "총 모니터링 시간: {}\n",
        duration_to_str(stats.total_duration_secs)
    ));
    block
}

fn format_local(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

#[async_trait]
impl<W: Write + Send> StatisticsSink for ConsoleClient<W> {
    async fn on_connection_stats(&self, stats: &ConnectionStatistics) -> Result<(), CoreError> {
        self.emit(&render_connection(stats))
    }

    async fn on_bandwidth_stats(&self, stats: &BandwidthStatistics) -> Result<(), CoreError> {
        self.emit(&render_bandwidth(stats))
    }

    async fn on_warning(&self, kind: SampleKind, message: &str) -> Result<(), CoreError> {
        self.emit(&format!("경고 [{kind}]: {message}\n"))
    }
}

// ============================================================
// JSON Lines
// ============================================================

/// 한 줄 레코드
#[derive(Serialize)]
#[serde(tag = "kind", content = "stats", rename_all = "snake_case")]
enum Record<'a> {
    Connection(&'a ConnectionStatistics),
    Bandwidth(&'a BandwidthStatistics),
    Warning { sample: SampleKind, message: &'a str },
}

/// 스냅샷당 JSON 한 줄 출력
pub struct JsonLinesClient<W = Stdout> {
    out: Mutex<W>,
}

impl JsonLinesClient<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesClient<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, record: &Record<'_>) -> Result<(), CoreError> {
        let line = serde_json::to_string(record)?;
        let mut out = self.out.lock();
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send> StatisticsSink for JsonLinesClient<W> {
    async fn on_connection_stats(&self, stats: &ConnectionStatistics) -> Result<(), CoreError> {
        self.emit(&Record::Connection(stats))
    }

    async fn on_bandwidth_stats(&self, stats: &BandwidthStatistics) -> Result<(), CoreError> {
        self.emit(&Record::Bandwidth(stats))
    }

    async fn on_warning(&self, kind: SampleKind, message: &str) -> Result<(), CoreError> {
        self.emit(&Record::Warning {
            sample: kind,
            message,
        })
    }
}
