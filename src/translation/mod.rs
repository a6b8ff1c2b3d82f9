pub mod client;
pub mod engine;
pub mod field;
pub mod mock;
pub mod worker;

pub use client::{LibreTranslateEngine, LibreTranslateFactory};
pub use engine::{EngineFactory, LanguagePair, TranslationEngine};
pub use field::{is_markup, FieldTranslator};
pub use mock::{MockEngine, MockEngineFactory, MockMode};
pub use worker::BatchWorker;
