//! # howsnet-storage
//!
//! 원시 샘플 로그 어댑터.
//! 한 줄에 샘플 하나(`timestamp,value`)를 추가 전용으로 기록하고,
//! 기록 중인 파일을 이어 읽어 재생 입력으로 제공한다.
//!
//! ## 모듈
//! - `codec`: 줄 ↔ 샘플 변환 (epoch/날짜시각 표기)
//! - `writer`: 추가 전용 기록 (SampleLog 구현)
//! - `reader`: 이어 읽기 (부분 줄 보존, 잘못된 줄 건너뜀)

pub mod codec;
pub mod reader;
pub mod writer;

pub use codec::LogRecord;
pub use reader::LogTail;
pub use writer::LineLogWriter;
