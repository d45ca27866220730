//! 네트워크 인터페이스 바이트 카운터.
//!
//! `ByteCounter` 포트 구현. sysinfo로 모든 인터페이스의 누적 송수신 바이트를 합산한다.
//! 세션 기준값 차감은 호출자(퍼블리셔)의 몫이다.

use async_trait::async_trait;
use howsnet_core::error::CoreError;
use howsnet_core::ports::sampler::ByteCounter;
use std::sync::Mutex;
use sysinfo::Networks;
use tracing::debug;

/// sysinfo 기반 바이트 카운터
pub struct SysInfoByteCounter {
    networks: Mutex<Networks>,
}

impl SysInfoByteCounter {
    /// 인터페이스 목록을 읽어 생성
    pub fn new() -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
        }
    }
}

impl Default for SysInfoByteCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ByteCounter for SysInfoByteCounter {
    async fn read_total_bytes(&self) -> Result<u64, CoreError> {
        let mut networks = self
            .networks
            .lock()
            .map_err(|e| CoreError::Internal(format!("네트워크 잠금 실패: {e}")))?;

        // 새로 생긴 인터페이스 반영, 사라진 인터페이스 제거
        networks.refresh(true);

        let total = networks
            .list()
            .values()
            .fold(0u64, |acc, data| {
                acc.saturating_add(data.total_received())
                    .saturating_add(data.total_transmitted())
            });

        debug!(
            "네트워크 누적 바이트: {total} (인터페이스 {}개)",
            networks.list().len()
        );
        Ok(total)
    }
}
