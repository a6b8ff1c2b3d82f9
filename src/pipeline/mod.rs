pub mod job;
pub mod scheduler;

pub use job::{FileReport, TranslationJob};
pub use scheduler::{BatchScheduler, JobOutput};
