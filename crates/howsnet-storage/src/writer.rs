//! 추가 전용 로그 기록.
//!
//! `SampleLog` 포트 구현. 샘플마다 한 줄을 쓰고 즉시 flush하여
//! 다른 프로세스(`--follow` 재생)가 바로 읽을 수 있게 한다.

use async_trait::async_trait;
use howsnet_core::config::TimestampFormat;
use howsnet_core::error::CoreError;
use howsnet_core::ports::sample_log::SampleLog;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::codec::{encode_line, LogRecord};

/// 줄 단위 샘플 로그 기록기
#[derive(Debug)]
pub struct LineLogWriter<S> {
    path: PathBuf,
    format: TimestampFormat,
    file: Mutex<File>,
    _sample: PhantomData<fn(&S)>,
}

impl<S: LogRecord> LineLogWriter<S> {
    /// 로그 파일을 추가 모드로 연다 (없으면 생성, 상위 디렉토리 포함)
    pub async fn open(path: impl AsRef<Path>, format: TimestampFormat) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        info!("{} 샘플 로그 열림: {}", S::KIND, path.display());

        Ok(Self {
            path,
            format,
            file: Mutex::new(file),
            _sample: PhantomData,
        })
    }

    /// 로그 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<S: LogRecord> SampleLog<S> for LineLogWriter<S> {
    async fn append(&self, sample: &S) -> Result<(), CoreError> {
        let mut line = encode_line(sample, self.format);
        line.push('\n');

        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!("{} 샘플 기록: {}", S::KIND, line.trim_end());
        Ok(())
    }
}
