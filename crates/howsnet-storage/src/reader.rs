//! 로그 이어 읽기.
//!
//! 기록 중인 로그 파일을 마지막으로 읽은 위치부터 다시 읽는다.
//! 줄바꿈으로 끝나지 않은 마지막 줄은 아직 쓰는 중일 수 있으므로 다음 읽기까지 보류한다.
//! 잘못된 줄은 경고 후 건너뛰고 나머지는 계속 읽는다.

use howsnet_core::error::CoreError;
use std::io::SeekFrom;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, warn};

use crate::codec::{decode_line, LogRecord};

/// 샘플 로그 이어 읽기 상태
pub struct LogTail<S> {
    path: PathBuf,
    /// 다음 읽기 시작 바이트 위치
    offset: u64,
    /// 아직 줄바꿈을 만나지 못한 바이트
    pending: Vec<u8>,
    /// 지금까지 처리한 줄 수 (1부터 시작하는 줄 번호용)
    line_no: usize,
    /// 건너뛴 잘못된 줄 수
    skipped: usize,
    _sample: PhantomData<fn() -> S>,
}

impl<S: LogRecord> LogTail<S> {
    /// 파일 처음부터 읽는 상태로 생성
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            offset: 0,
            pending: Vec::new(),
            line_no: 0,
            skipped: 0,
            _sample: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 건너뛴 잘못된 줄 수
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 마지막 읽기 이후 완성된 줄을 파일 순서대로 샘플로 반환
    pub async fn read_available(&mut self) -> Result<Vec<S>, CoreError> {
        let mut file = File::open(&self.path).await?;
        let len = file.metadata().await?.len();

        if len < self.offset {
            warn!(
                "{} 로그가 잘렸음, 처음부터 다시 읽음: {}",
                S::KIND,
                self.path.display()
            );
            self.offset = 0;
            self.pending.clear();
            self.line_no = 0;
        }
        if len == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset)).await?;
        let mut buf = Vec::with_capacity((len - self.offset) as usize);
        let read = file.read_to_end(&mut buf).await?;
        self.offset += read as u64;
        self.pending.extend_from_slice(&buf);

        let mut samples = Vec::new();
        while let Some(newline) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            if let Some(sample) = self.decode(&line[..newline]) {
                samples.push(sample);
            }
        }

        debug!(
            "{} 로그 읽기: 샘플 {}개, 위치 {}",
            S::KIND,
            samples.len(),
            self.offset
        );
        Ok(samples)
    }

    /// 줄바꿈 없이 끝난 마지막 줄을 완성된 줄로 처리 (더 이상 기록되지 않는 파일용)
    pub fn finish(&mut self) -> Option<S> {
        if self.pending.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.pending);
        self.decode(&line)
    }

    fn decode(&mut self, raw: &[u8]) -> Option<S> {
        self.line_no += 1;

        let parsed = std::str::from_utf8(raw)
            .map_err(|e| CoreError::malformed(format!("UTF-8 아님: {e}")))
            .and_then(|line| {
                let line = line.trim();
                if line.is_empty() {
                    Ok(None)
                } else {
                    decode_line::<S>(line).map(Some)
                }
            });

        match parsed {
            Ok(sample) => sample,
            Err(e) => {
                self.skipped += 1;
                warn!("{} 로그 줄 건너뜀: {}", S::KIND, e.at_line(self.line_no));
                None
            }
        }
    }
}
