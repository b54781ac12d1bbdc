use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use whatlang::Lang;

use crate::error::{ChatError, Result};
use crate::language::{RetryPolicy, TranslationPolicy};

pub const DEFAULT_CONFIG_FILE: &str = "chatlens.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopwordsConfig {
    #[serde(default = "default_stopwords_path")]
    pub path: PathBuf,
}

fn default_stopwords_path() -> PathBuf {
    PathBuf::from("data").join("roman-urdu-stopwords.txt")
}

impl Default for StopwordsConfig {
    fn default() -> Self {
        Self {
            path: default_stopwords_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// ISO 639-3 code of the language whose tokens get translated
    #[serde(default = "default_detect_language")]
    pub detect_language: String,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Stop translating after this many tokens in a row fail (0 = never)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "http://localhost:5000/translate".to_string()
}

fn default_detect_language() -> String {
    "urd".to_string()
}

fn default_source_language() -> String {
    "ur".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_initial_backoff_ms() -> u64 {
    250
}

fn default_max_consecutive_failures() -> u32 {
    3
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
            api_key: None,
            detect_language: default_detect_language(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

impl TranslationConfig {
    pub fn policy(&self) -> Result<TranslationPolicy> {
        let detect = Lang::from_code(&self.detect_language).ok_or_else(|| {
            ChatError::Config(format!(
                "unknown detect_language {:?} (expected an ISO 639-3 code)",
                self.detect_language
            ))
        })?;
        Ok(TranslationPolicy {
            detect,
            source_code: self.source_language.clone(),
            target_code: self.target_language.clone(),
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                initial_backoff_ms: self.initial_backoff_ms,
                ..RetryPolicy::default()
            },
            max_consecutive_failures: self.max_consecutive_failures,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_vocabulary_limit")]
    pub vocabulary_limit: usize,
}

fn default_vocabulary_limit() -> usize {
    100
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            vocabulary_limit: default_vocabulary_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Daily-rolling log files are written here when set
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stopwords: StopwordsConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Explicit path first, then `chatlens.toml` in the working directory,
    /// then built-in defaults. Also returns where the values came from, so the
    /// caller can report it once logging is up.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let source = ConfigSource::locate(explicit, Path::new(DEFAULT_CONFIG_FILE));
        let config = match &source {
            ConfigSource::File(path) => Self::from_file(path)?,
            ConfigSource::Defaults => Self::default(),
        };
        Ok((config, source))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl ConfigSource {
    fn locate(explicit: Option<&Path>, fallback: &Path) -> Self {
        match explicit {
            Some(path) => Self::File(path.to_path_buf()),
            None if fallback.exists() => Self::File(fallback.to_path_buf()),
            None => Self::Defaults,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}
