//! 설정 관리: composegenie.toml 파싱 및 런타임 설정
//!
//! [`ComposeGenieConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`COMPOSEGENIE_CATALOG_DEBOUNCE_MS=500` 형식)
//! 3. 설정 파일 (`composegenie.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), composegenie_core::error::ComposeGenieError> {
//! use composegenie_core::config::ComposeGenieConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ComposeGenieConfig::load("composegenie.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ComposeGenieConfig::parse("[catalog]\ndebounce_ms = 150")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ComposeGenieError, ConfigError};

/// 디바운스 지연 상한 (밀리초)
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// 선택 저장소의 기본 키
pub const DEFAULT_STORAGE_KEY: &str = "composerSelections";

/// ComposeGenie 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComposeGenieConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 카탈로그 설정
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// 선택 저장소 설정
    #[serde(default)]
    pub selection: SelectionConfig,
    /// compose 출력 설정
    #[serde(default)]
    pub compose: ComposeConfig,
}

impl ComposeGenieConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ComposeGenieError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값을 사용하는 [`load`](Self::load) 변형입니다.
    ///
    /// 파일이 존재하지만 파싱에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ComposeGenieError> {
        let path = path.as_ref();
        let mut config = match Self::from_file(path).await {
            Ok(config) => config,
            Err(ComposeGenieError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ComposeGenieError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ComposeGenieError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ComposeGenieError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, ComposeGenieError> {
        toml::from_str(toml_str).map_err(|e| {
            ComposeGenieError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `COMPOSEGENIE_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "COMPOSEGENIE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "COMPOSEGENIE_GENERAL_LOG_FORMAT");

        // Catalog
        override_string(
            &mut self.catalog.dataset_path,
            "COMPOSEGENIE_CATALOG_DATASET_PATH",
        );
        override_u64(&mut self.catalog.debounce_ms, "COMPOSEGENIE_CATALOG_DEBOUNCE_MS");

        // Selection
        override_bool(&mut self.selection.persist, "COMPOSEGENIE_SELECTION_PERSIST");
        override_string(
            &mut self.selection.store_path,
            "COMPOSEGENIE_SELECTION_STORE_PATH",
        );
        override_string(
            &mut self.selection.storage_key,
            "COMPOSEGENIE_SELECTION_STORAGE_KEY",
        );

        // Compose
        override_string(&mut self.compose.version, "COMPOSEGENIE_COMPOSE_VERSION");
        override_string(&mut self.compose.default_restart, "COMPOSEGENIE_COMPOSE_DEFAULT_RESTART");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ComposeGenieError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.catalog.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::InvalidValue {
                field: "catalog.debounce_ms".to_owned(),
                reason: format!("must be 0-{MAX_DEBOUNCE_MS}"),
            }
            .into());
        }

        if self.selection.storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "selection.storage_key".to_owned(),
                reason: "storage key must not be empty".to_owned(),
            }
            .into());
        }

        if self.compose.version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "compose.version".to_owned(),
                reason: "version marker must not be empty".to_owned(),
            }
            .into());
        }

        let valid_restarts = ["no", "always", "on-failure", "unless-stopped"];
        if !valid_restarts.contains(&self.compose.default_restart.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "compose.default_restart".to_owned(),
                reason: format!("must be one of: {}", valid_restarts.join(", ")),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 카탈로그 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 카탈로그 JSON 경로 (비어 있으면 내장 데이터셋 사용)
    pub dataset_path: String,
    /// 검색 입력 디바운스 지연 (밀리초)
    pub debounce_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            dataset_path: String::new(),
            debounce_ms: 300,
        }
    }
}

/// 선택 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// 디스크 영속화 여부 (false면 프로세스 메모리에만 보관)
    pub persist: bool,
    /// 저장 파일 경로 (비어 있으면 `$HOME/.local/share/composegenie/selections.json`)
    pub store_path: String,
    /// 선택 목록을 저장하는 키
    pub storage_key: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            persist: true,
            store_path: String::new(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl SelectionConfig {
    /// 실제로 사용할 저장 파일 경로를 계산합니다.
    ///
    /// 영속화가 꺼져 있거나 `HOME`을 알 수 없으면 `None`을 반환합니다.
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        if !self.persist {
            return None;
        }
        if !self.store_path.is_empty() {
            return Some(PathBuf::from(&self.store_path));
        }
        match std::env::var("HOME") {
            Ok(home) => Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("composegenie")
                    .join("selections.json"),
            ),
            Err(_) => {
                warn!("HOME is not set, selections will not be persisted");
                None
            }
        }
    }
}

/// compose 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// 최상위 version 마커
    pub version: String,
    /// 프리셋이 없는 서비스의 재시작 정책
    pub default_restart: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            version: "3.8".to_owned(),
            default_restart: "unless-stopped".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
