//! 로그 줄 코덱.
//!
//! 형식: `timestamp,value` (줄바꿈 제외).
//! - 연결 확인: `1700000000,23` (0 이하 지연 = 연결 끊김)
//! - 대역폭: `1700000000,4000.5` (세션 시작 이후 누적 Kbit)
//!
//! 시각은 epoch 초 또는 UTC 오프셋을 붙인 로컬 시각 `YYYY-MM-DD HH:MM:SS+09:00`으로
//! 기록할 수 있다. 오프셋이 있어야 일광 절약 시간이 끝나는 한 시간 동안의
//! 같은 벽시계 시각을 구분할 수 있다. 읽을 때는 줄마다 epoch, 오프셋 포함 시각,
//! 오프셋 없는 예전 로컬 시각을 모두 받아들인다.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fmt::Display;
use howsnet_core::config::TimestampFormat;
use howsnet_core::error::CoreError;
use howsnet_core::models::sample::{BandwidthSample, ConnectivitySample, SampleKind, TimedSample};

/// 오프셋 포함 로컬 시각 표기
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// 읽기 시 소수 초까지 허용
const DATETIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// 오프셋 없는 예전 로그 형식
const LEGACY_DATETIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// 로그 한 줄로 기록/복원 가능한 샘플
pub trait LogRecord: TimedSample + Sized {
    /// 샘플 종류
    const KIND: SampleKind;

    /// 값 필드 문자열
    fn value_field(&self) -> String;

    /// 시각과 값 필드로부터 복원
    fn from_fields(timestamp: i64, value: &str) -> Result<Self, CoreError>;
}

impl LogRecord for ConnectivitySample {
    const KIND: SampleKind = SampleKind::Connectivity;

    fn value_field(&self) -> String {
        self.latency_ms.to_string()
    }

    fn from_fields(timestamp: i64, value: &str) -> Result<Self, CoreError> {
        let latency_ms = value
            .parse::<i64>()
            .map_err(|e| CoreError::malformed(format!("지연 시간 '{value}': {e}")))?;
        // 0 이하 값은 원래 값 그대로 보존 (센티널)
        Ok(ConnectivitySample {
            timestamp,
            latency_ms,
        })
    }
}

impl LogRecord for BandwidthSample {
    const KIND: SampleKind = SampleKind::Bandwidth;

    fn value_field(&self) -> String {
        // Display는 f64를 손실 없이 왕복시킨다
        self.cumulative_kbits.to_string()
    }

    fn from_fields(timestamp: i64, value: &str) -> Result<Self, CoreError> {
        let kbits = value
            .parse::<f64>()
            .map_err(|e| CoreError::malformed(format!("누적 사용량 '{value}': {e}")))?;
        if !kbits.is_finite() || kbits < 0.0 {
            return Err(CoreError::malformed(format!(
                "누적 사용량은 0 이상의 유한값이어야 함: {value}"
            )));
        }
        Ok(BandwidthSample::new(timestamp, kbits))
    }
}

/// 샘플을 로그 한 줄로 변환 (줄바꿈 미포함)
pub fn encode_line<S: LogRecord>(sample: &S, format: TimestampFormat) -> String {
    format!(
        "{},{}",
        format_timestamp(sample.timestamp(), format),
        sample.value_field()
    )
}

/// 로그 한 줄을 샘플로 변환
pub fn decode_line<S: LogRecord>(line: &str) -> Result<S, CoreError> {
    let (ts, value) = line
        .trim()
        .split_once(',')
        .ok_or_else(|| CoreError::malformed(format!("구분자 ',' 없음: '{line}'")))?;
    let timestamp = parse_timestamp(ts.trim())?;
    S::from_fields(timestamp, value.trim())
}

/// 시각 필드 문자열
pub fn format_timestamp(timestamp: i64, format: TimestampFormat) -> String {
    match format {
        TimestampFormat::Epoch => timestamp.to_string(),
        TimestampFormat::DateTime => format_datetime(&Local, timestamp),
    }
}

/// 주어진 시간대의 오프셋 포함 시각 표기. 표현할 수 없는 시각은 epoch 초로 남긴다
pub fn format_datetime<Tz>(tz: &Tz, timestamp: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format(DATETIME_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

/// epoch 초 또는 날짜시각 문자열을 epoch 초로 변환
///
/// epoch 값은 날짜로 표현 가능한 범위 안이어야 한다.
pub fn parse_timestamp(field: &str) -> Result<i64, CoreError> {
    if let Ok(secs) = field.parse::<i64>() {
        return match DateTime::from_timestamp(secs, 0) {
            Some(_) => Ok(secs),
            None => Err(CoreError::malformed(format!(
                "표현 범위를 벗어난 시각: {secs}"
            ))),
        };
    }

    if let Ok(dt) = DateTime::parse_from_str(field, DATETIME_PARSE_FORMAT) {
        return Ok(dt.timestamp());
    }

    let naive = NaiveDateTime::parse_from_str(field, LEGACY_DATETIME_PARSE_FORMAT)
        .map_err(|e| CoreError::malformed(format!("시각 '{field}': {e}")))?;

    // 일광 절약 시간 전환으로 모호하면 이른 쪽
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| CoreError::malformed(format!("존재하지 않는 로컬 시각: '{field}'")))
}
