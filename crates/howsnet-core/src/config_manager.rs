//! 설정 파일 관리.
//!
//! 플랫폼별 설정 디렉토리의 JSON 파일과 `HOWSNET__` 환경변수를 겹쳐 로드하고,
//! 현재 설정을 JSON 파일로 저장한다.

use crate::config::AppConfig;
use crate::error::CoreError;
use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 환경변수 접두사 (`HOWSNET__CONNECTIVITY__HOST=1.1.1.1`)
const ENV_PREFIX: &str = "HOWSNET";

/// 환경변수 구분자
const ENV_SEPARATOR: &str = "__";

/// 설정 관리자
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 설정 파일 경로
    config_path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 기본 경로로 설정 관리자 생성
    ///
    /// - Linux: `~/.config/howsnet/config.json`
    /// - macOS: `~/Library/Application Support/com.howsnet.howsnet/config.json`
    /// - Windows: `%APPDATA%\howsnet\howsnet\config\config.json`
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self::with_path(Self::default_config_path()?))
    }

    /// 지정된 경로로 설정 관리자 생성
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// 기본 설정 파일 경로
    pub fn default_config_path() -> Result<PathBuf, CoreError> {
        ProjectDirs::from("com", "howsnet", "howsnet")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없음".to_string()))
    }

    /// 설정 파일 경로
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 설정 로드: 기본값 ← 파일(있으면) ← 환경변수
    pub fn load(&self) -> Result<AppConfig, CoreError> {
        let exists = self.config_path.exists();
        debug!(
            "설정 로드: {} (파일 존재: {})",
            self.config_path.display(),
            exists
        );

        let settings = Config::builder()
            .add_source(
                File::from(self.config_path.as_path())
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CoreError::Config(format!("설정 소스 로드 실패: {e}")))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| CoreError::Config(format!("설정 역직렬화 실패: {e}")))?;

        Ok(config)
    }

    /// 설정을 JSON 파일로 저장 (디렉토리가 없으면 생성)
    pub fn save(&self, config: &AppConfig) -> Result<(), CoreError> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json)?;
        info!("설정 저장: {}", self.config_path.display());
        Ok(())
    }
}
