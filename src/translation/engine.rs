use crate::utils::{Result, TranslationSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.source.eq_ignore_ascii_case(&self.target)
    }
}

impl From<&TranslationSpec> for LanguagePair {
    fn from(spec: &TranslationSpec) -> Self {
        Self::new(spec.source_lang.clone(), spec.target_lang.clone())
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate plain text.
    async fn translate_text(&self, text: &str) -> Result<String>;

    /// Translate text containing markup, keeping the tags intact.
    async fn translate_markup(&self, text: &str) -> Result<String>;

    /// Whether [`translate_markup`](Self::translate_markup) can be used for this
    /// handle's language pair.
    fn markup_available(&self) -> bool;

    fn engine_name(&self) -> &str;
}

#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Open a new handle for `pair`. Fails if the engine cannot serve the pair.
    async fn connect(&self, pair: &LanguagePair) -> Result<Box<dyn TranslationEngine>>;

    /// Language pairs the engine can translate.
    async fn available_pairs(&self) -> Result<Vec<LanguagePair>>;

    async fn supports(&self, pair: &LanguagePair) -> Result<bool> {
        Ok(self.available_pairs().await?.contains(pair))
    }
}
