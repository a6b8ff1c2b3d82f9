use crate::utils::errors::{Result, TranslatorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "LIBRETRANSLATE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub scheduler: SchedulerConfig,
    pub paths: PathsConfig,
    pub defaults: LanguageDefaults,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub markup_aware: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub min_chunk_size: usize,
    pub fanout_factor: usize,
    pub max_workers: usize,
    pub chunk_timeout_seconds: Option<u64>,
    pub shutdown_grace_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub column_config: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageDefaults {
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            api_key: String::new(),
            timeout_seconds: 60,
            max_retries: 3,
            markup_aware: true,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_chunk_size: 10,
            fanout_factor: 4,
            max_workers: 8,
            chunk_timeout_seconds: None,
            shutdown_grace_seconds: 5,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            column_config: "column_data.json".to_string(),
        }
    }
}

impl Default for LanguageDefaults {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "id".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| TranslatorError::ConfigError(e.to_string()))?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| TranslatorError::ConfigError(e.to_string()))?;
        config.apply_env();
        Ok(config)
    }

    /// A missing config file is not an error; a malformed one is logged and ignored.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(p) = path else {
            let mut config = Self::default();
            config.apply_env();
            return config;
        };

        if !p.exists() {
            let mut config = Self::default();
            config.apply_env();
            return config;
        }

        match Self::load_from_file(p) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %p.display(), error = %e, "Ignoring unreadable config file");
                let mut config = Self::default();
                config.apply_env();
                config
            }
        }
    }

    fn apply_env(&mut self) {
        if self.engine.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.engine.api_key = key;
            }
        }
    }

    pub fn column_config_path(&self) -> PathBuf {
        self.paths.input_dir.join(&self.paths.column_config)
    }

    pub fn output_dir_for(&self, target_lang: &str) -> PathBuf {
        self.paths.output_dir.join(target_lang)
    }
}

impl SchedulerConfig {
    /// Caps the requested worker count at `max_workers`.
    pub fn resolve_concurrency(&self, requested: usize) -> Result<usize> {
        let concurrency = requested.min(self.max_workers);
        if concurrency == 0 {
            return Err(TranslatorError::WorkerPoolUnavailable(format!(
                "requested {} workers with a cap of {}",
                requested, self.max_workers
            )));
        }
        Ok(concurrency)
    }

    /// `max(min_chunk_size, total_rows / (concurrency * fanout_factor))`
    pub fn chunk_size(&self, total_rows: usize, concurrency: usize) -> usize {
        let divisor = concurrency.max(1) * self.fanout_factor.max(1);
        (total_rows / divisor).max(self.min_chunk_size).max(1)
    }

    pub fn chunk_timeout(&self) -> Option<Duration> {
        self.chunk_timeout_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

/// Worker count used when the caller does not ask for one.
pub fn default_concurrency(max_workers: usize) -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(max_workers)
}

/// What to translate for one job. Fixed for the lifetime of the job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSpec {
    pub source_lang: String,
    pub target_lang: String,
    pub translate_fields: Vec<String>,
}

impl TranslationSpec {
    pub fn new<I, S>(source_lang: impl Into<String>, target_lang: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut translate_fields: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !translate_fields.contains(&field) {
                translate_fields.push(field);
            }
        }

        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            translate_fields,
        }
    }

    pub fn has_fields(&self) -> bool {
        !self.translate_fields.is_empty()
    }
}
