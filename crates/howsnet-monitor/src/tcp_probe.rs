//! TCP 연결 확인.
//!
//! `ConnectivityProbe` 포트 구현. 참조 호스트에 TCP 연결을 시도하고
//! 연결 수립까지 걸린 시간을 잰다. 연결은 즉시 닫는다.

use async_trait::async_trait;
use howsnet_core::models::sample::{ProbeOutcome, ProbeTarget};
use howsnet_core::ports::sampler::ConnectivityProbe;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::debug;

/// tokio TCP 연결 기반 연결 확인
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnectProbe;

impl TcpConnectProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ConnectivityProbe for TcpConnectProbe {
    async fn probe(&self, target: &ProbeTarget, timeout: Duration) -> ProbeOutcome {
        let started = Instant::now();
        let connect = TcpStream::connect((target.host.as_str(), target.port));

        match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => {
                let elapsed = started.elapsed();
                drop(stream);
                debug!("연결 확인 성공: {target} ({}ms)", elapsed.as_millis());
                ProbeOutcome::Connected(elapsed)
            }
            Ok(Err(e)) => {
                debug!("연결 확인 실패: {target}: {e}");
                ProbeOutcome::Disconnected
            }
            Err(_) => {
                debug!("연결 확인 타임아웃: {target} ({}ms)", timeout.as_millis());
                ProbeOutcome::Disconnected
            }
        }
    }
}
