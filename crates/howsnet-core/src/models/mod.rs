//! HOWSNET 도메인 모델.
//!
//! 샘플(입력)과 통계 스냅샷(출력)을 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod sample;
pub mod statistics;
