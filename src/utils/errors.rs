use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Translation engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Translation package not available: {source_lang} -> {target_lang}")]
    UnsupportedLanguagePair {
        source_lang: String,
        target_lang: String,
    },

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("Unknown field in translate list: {0}")]
    UnknownField(String),

    #[error("Record set has no schema but translation of {0} field(s) was requested")]
    MissingSchema(usize),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No column configuration found for {0}")]
    NotConfigured(String),

    #[error("Cannot start worker pool: {0}")]
    WorkerPoolUnavailable(String),

    #[error("Row count mismatch: expected {expected}, got {got}")]
    RowCountMismatch { expected: usize, got: usize },

    #[error("Record position {position} produced more than once")]
    PositionConflict { position: usize },

    #[error("Job cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, TranslatorError>;

impl TranslatorError {
    /// Errors that may clear up on a second attempt against the engine.
    pub fn is_transient(&self) -> bool {
        match self {
            TranslatorError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TranslatorError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
