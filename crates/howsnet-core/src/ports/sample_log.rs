//! 원시 샘플 로그 포트.
//!
//! 구현: `howsnet-storage` crate (줄 단위 append-only 텍스트 파일)

use async_trait::async_trait;

use crate::error::CoreError;

/// 샘플 영속화 (한 줄에 샘플 하나, 추가 전용)
#[async_trait]
pub trait SampleLog<S: Sync>: Send + Sync {
    /// 샘플 한 건 추가. 분석 성공 여부와 무관하게 호출된다.
    async fn append(&self, sample: &S) -> Result<(), CoreError>;
}
