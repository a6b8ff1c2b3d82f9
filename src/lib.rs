pub mod cli;
pub mod csv_processor;
pub mod pipeline;
pub mod state;
pub mod translation;
pub mod utils;

pub use csv_processor::{Chunk, Chunker, ColumnConfig, Record, RecordSet, Resequencer};
pub use pipeline::{BatchScheduler, FileReport, JobOutput, TranslationJob};
pub use state::{JobStats, ProgressEvent, ProgressReporter};
pub use translation::{
    EngineFactory, LanguagePair, LibreTranslateFactory, MockEngineFactory, MockMode, TranslationEngine,
};
pub use utils::{AppConfig, Result, SchedulerConfig, TranslationSpec, TranslatorError};
