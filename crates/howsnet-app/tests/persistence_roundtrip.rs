//! 샘플 로그 통합 테스트.
//!
//! 기록기 → 파일 → 이어 읽기 전체 흐름: 형식, 잘못된 줄, 쓰는 중인 줄, 재시작 후 추가.

use assert_matches::assert_matches;
use howsnet_core::config::TimestampFormat;
use howsnet_core::error::CoreError;
use howsnet_core::models::sample::{BandwidthSample, ConnectivitySample};
use howsnet_core::ports::sample_log::SampleLog;
use howsnet_storage::{LineLogWriter, LogTail};
use std::io::Write;
use tempfile::TempDir;

#[tokio::test]
async fn written_lines_use_plain_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internet.log");

    let writer = LineLogWriter::<ConnectivitySample>::open(&path, TimestampFormat::Epoch)
        .await
        .unwrap();
    writer.append(&ConnectivitySample::connected(100, 31)).await.unwrap();
    writer.append(&ConnectivitySample::disconnected(110)).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "100,31\n110,-1\n");
}

#[tokio::test]
async fn reader_skips_corruption_and_keeps_going() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bandwidth.log");

    let writer = LineLogWriter::<BandwidthSample>::open(&path, TimestampFormat::Epoch)
        .await
        .unwrap();
    writer.append(&BandwidthSample::new(0, 0.0)).await.unwrap();
    {
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "30;900").unwrap();
        writeln!(file, "not,a number").unwrap();
    }
    writer.append(&BandwidthSample::new(60, 1800.25)).await.unwrap();

    let mut tail = LogTail::<BandwidthSample>::new(&path);
    let samples = tail.read_available().await.unwrap();

    assert_eq!(
        samples,
        vec![BandwidthSample::new(0, 0.0), BandwidthSample::new(60, 1800.25)]
    );
    assert_eq!(tail.skipped(), 2);
}

#[tokio::test]
async fn tail_resumes_after_writer_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internet.log");
    let mut tail = LogTail::<ConnectivitySample>::new(&path);

    {
        let writer = LineLogWriter::<ConnectivitySample>::open(&path, TimestampFormat::Epoch)
            .await
            .unwrap();
        writer.append(&ConnectivitySample::connected(0, 12)).await.unwrap();
    }
    assert_eq!(tail.read_available().await.unwrap().len(), 1);

    // 새 세션에서 같은 파일에 이어 기록 (datetime 형식 혼용)
    let writer = LineLogWriter::<ConnectivitySample>::open(&path, TimestampFormat::DateTime)
        .await
        .unwrap();
    writer.append(&ConnectivitySample::disconnected(1_700_000_000)).await.unwrap();

    let resumed = tail.read_available().await.unwrap();
    assert_eq!(resumed, vec![ConnectivitySample::disconnected(1_700_000_000)]);
}

#[tokio::test]
async fn truncated_log_is_reread_from_start() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("internet.log");
    std::fs::write(&path, "0,10\n10,11\n20,12\n").unwrap();

    let mut tail = LogTail::<ConnectivitySample>::new(&path);
    assert_eq!(tail.read_available().await.unwrap().len(), 3);

    std::fs::write(&path, "30,-1\n").unwrap();
    let after = tail.read_available().await.unwrap();
    assert_eq!(after, vec![ConnectivitySample::disconnected(30)]);
}

#[tokio::test]
async fn unwritable_log_path_is_io_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();

    // 일반 파일 아래에 디렉토리를 만들 수 없음
    let result =
        LineLogWriter::<ConnectivitySample>::open(blocker.join("internet.log"), TimestampFormat::Epoch).await;
    assert_matches!(result, Err(CoreError::Io(_)));
}
