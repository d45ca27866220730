//! HOWSNET 핵심 에러 타입.
//!
//! 어댑터 crate는 이 타입을 그대로 반환한다.
//! 연결 확인 실패(타임아웃/거부)는 에러가 아니라 `ProbeOutcome::Disconnected` 샘플이다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 저장된 로그 한 줄 파싱 실패 (재생 시 해당 줄만 건너뜀)
    #[error("잘못된 로그 레코드 (줄 {line}): {reason}")]
    MalformedRecord {
        /// 1부터 시작하는 줄 번호 (알 수 없으면 0)
        line: usize,
        /// 실패 사유
        reason: String,
    },

    /// 샘플러(바이트 카운터 등) 읽기 실패
    #[error("샘플러 에러: {0}")]
    Sampler(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 줄 번호 없는 레코드 에러 생성
    pub fn malformed(reason: impl Into<String>) -> Self {
        CoreError::MalformedRecord {
            line: 0,
            reason: reason.into(),
        }
    }

    /// 레코드 에러에 줄 번호 부여 (다른 변형은 그대로)
    pub fn at_line(self, line: usize) -> Self {
        match self {
            CoreError::MalformedRecord { reason, .. } => CoreError::MalformedRecord { line, reason },
            other => other,
        }
    }
}
