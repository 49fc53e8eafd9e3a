//! 설정 관리 — pagehint.toml 파싱 및 스캔 설정
//!
//! [`PagehintConfig`]는 로깅, 스캔, 힌트별 설정을 담는 최상위 구조체입니다.
//! 스캔이 시작되면 설정은 불변 값으로 힌트 팩토리에 주입됩니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PAGEHINT_SCAN_BROWSERS=chrome 120,ie 11` 형식)
//! 3. 설정 파일 (`pagehint.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pagehint_core::error::PagehintError> {
//! use pagehint_core::config::PagehintConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = PagehintConfig::load("pagehint.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PagehintConfig::parse("[scan]\nbrowsers = [\"ie 11\"]")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PagehintError};
use crate::types::{BrowserTarget, Severity};

/// 지원하는 커넥터 이름
pub const CONNECTORS: &[&str] = &["local"];

/// pagehint 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagehintConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 힌트별 설정 (키: 힌트 ID)
    #[serde(default)]
    pub hints: BTreeMap<String, HintConfig>,
}

impl PagehintConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PagehintError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PagehintError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PagehintError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PagehintError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PagehintError> {
        toml::from_str(toml_str).map_err(|e| {
            PagehintError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PAGEHINT_{SECTION}_{FIELD}`
    /// 예: `PAGEHINT_GENERAL_LOG_LEVEL=debug`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PAGEHINT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PAGEHINT_GENERAL_LOG_FORMAT");

        // Scan
        override_csv(&mut self.scan.browsers, "PAGEHINT_SCAN_BROWSERS");
        override_string(&mut self.scan.connector, "PAGEHINT_SCAN_CONNECTOR");
        override_usize(
            &mut self.scan.max_source_snippet,
            "PAGEHINT_SCAN_MAX_SOURCE_SNIPPET",
        );
        override_bool(
            &mut self.scan.fetch_subresources,
            "PAGEHINT_SCAN_FETCH_SUBRESOURCES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PagehintError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // connector 검증
        if !CONNECTORS.contains(&self.scan.connector.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "scan.connector".to_owned(),
                reason: format!("must be one of: {}", CONNECTORS.join(", ")),
            }
            .into());
        }

        // browsers 검증
        self.browser_targets()?;

        // 힌트 ID 검증
        if let Some(id) = self.hints.keys().find(|id| id.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("hints.{id}"),
                reason: "hint id must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }

    /// 대상 브라우저 목록을 파싱합니다.
    pub fn browser_targets(&self) -> Result<Vec<BrowserTarget>, PagehintError> {
        self.scan
            .browsers
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry.parse::<BrowserTarget>().map_err(|e| {
                    PagehintError::Config(ConfigError::InvalidValue {
                        field: format!("scan.browsers[{i}]"),
                        reason: e.to_string(),
                    })
                })
            })
            .collect()
    }

    /// 힌트 설정을 조회합니다.
    pub fn hint(&self, id: &str) -> Option<&HintConfig> {
        self.hints.get(id)
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

/// 스캔 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 대상 브라우저 (`"<name> <version>"`)
    pub browsers: Vec<String>,
    /// 커넥터 이름
    pub connector: String,
    /// Problem마다 보관할 외부 HTML 최대 문자 수 (0이면 보관하지 않음)
    pub max_source_snippet: usize,
    /// 하위 리소스 fetch 여부
    pub fetch_subresources: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            browsers: Vec::new(),
            connector: "local".to_owned(),
            max_source_snippet: 200,
            fetch_subresources: true,
        }
    }
}

/// 힌트별 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    /// 심각도 (없으면 힌트 메타데이터의 기본값)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// 힌트 옵션 (힌트의 옵션 스키마로 검증)
    pub options: toml::Table,
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

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
