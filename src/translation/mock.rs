//! Network-free engine. `Suffix` maps `hello` to `hello_<target>`; the markup path adds `_markup`.

use crate::translation::engine::{EngineFactory, LanguagePair, TranslationEngine};
use crate::utils::{Result, TranslatorError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append `_<target>`.
    Suffix,
    /// Upper-case the text.
    Uppercase,
    /// Every call fails with this message.
    Error(String),
}

#[derive(Debug, Clone)]
pub struct MockEngine {
    mode: MockMode,
    pair: LanguagePair,
    markup_available: bool,
    fail_on: Arc<HashSet<String>>,
    panic_on: Arc<HashSet<String>>,
    delay_ms: u64,
    calls: Arc<AtomicUsize>,
}

impl MockEngine {
    pub fn new(mode: MockMode, pair: LanguagePair) -> Self {
        Self {
            mode,
            pair,
            markup_available: true,
            fail_on: Arc::default(),
            panic_on: Arc::default(),
            delay_ms: 0,
            calls: Arc::default(),
        }
    }

    pub fn without_markup(mut self) -> Self {
        self.markup_available = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn apply(&self, text: &str, markup: bool) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.delay_ms > 0 {
            // Spread by content so chunks finish out of dispatch order.
            let jitter = text.bytes().map(u64::from).sum::<u64>() % (self.delay_ms + 1);
            tokio::time::sleep(Duration::from_millis(self.delay_ms + jitter)).await;
        }

        if self.panic_on.contains(text) {
            panic!("mock engine crashed on {:?}", text);
        }
        if self.fail_on.contains(text) {
            return Err(TranslatorError::TranslationFailed(format!(
                "mock failure for {:?}",
                text
            )));
        }

        let translated = match &self.mode {
            MockMode::Suffix => format!("{}_{}", text, self.pair.target),
            MockMode::Uppercase => text.to_uppercase(),
            MockMode::Error(msg) => return Err(TranslatorError::TranslationFailed(msg.clone())),
        };

        Ok(if markup {
            format!("{}_markup", translated)
        } else {
            translated
        })
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    async fn translate_text(&self, text: &str) -> Result<String> {
        self.apply(text, false).await
    }

    async fn translate_markup(&self, text: &str) -> Result<String> {
        if !self.markup_available {
            return Err(TranslatorError::EngineUnavailable(
                "markup translation not initialised".to_string(),
            ));
        }
        self.apply(text, true).await
    }

    fn markup_available(&self) -> bool {
        self.markup_available
    }

    fn engine_name(&self) -> &str {
        "Mock Engine"
    }
}

/// Hands out a fresh [`MockEngine`] per `connect` and counts the connections.
#[derive(Debug, Clone)]
pub struct MockEngineFactory {
    mode: MockMode,
    pairs: Vec<LanguagePair>,
    markup_available: bool,
    fail_connect: bool,
    fail_on: Arc<HashSet<String>>,
    panic_on: Arc<HashSet<String>>,
    delay_ms: u64,
    connections: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockEngineFactory {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            pairs: vec![LanguagePair::new("en", "id"), LanguagePair::new("id", "en")],
            markup_available: true,
            fail_connect: false,
            fail_on: Arc::default(),
            panic_on: Arc::default(),
            delay_ms: 0,
            connections: Arc::default(),
            calls: Arc::default(),
        }
    }

    pub fn without_markup(mut self) -> Self {
        self.markup_available = false;
        self
    }

    /// Every `connect` fails.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Texts whose translation returns an error.
    pub fn fail_on<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fail_on = Arc::new(texts.into_iter().map(Into::into).collect());
        self
    }

    /// Texts whose translation panics, taking the surrounding chunk task down.
    pub fn panic_on<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.panic_on = Arc::new(texts.into_iter().map(Into::into).collect());
        self
    }

    /// Base per-call delay; each call adds a content-derived jitter up to the same amount.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Engine calls across every handle this factory produced.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineFactory for MockEngineFactory {
    async fn connect(&self, pair: &LanguagePair) -> Result<Box<dyn TranslationEngine>> {
        self.connections.fetch_add(1, Ordering::SeqCst);

        if self.fail_connect {
            return Err(TranslatorError::EngineUnavailable(
                "mock engine refused connection".to_string(),
            ));
        }
        if !self.pairs.contains(pair) {
            return Err(TranslatorError::UnsupportedLanguagePair {
                source_lang: pair.source.clone(),
                target_lang: pair.target.clone(),
            });
        }

        Ok(Box::new(MockEngine {
            mode: self.mode.clone(),
            pair: pair.clone(),
            markup_available: self.markup_available,
            fail_on: self.fail_on.clone(),
            panic_on: self.panic_on.clone(),
            delay_ms: self.delay_ms,
            calls: self.calls.clone(),
        }))
    }

    async fn available_pairs(&self) -> Result<Vec<LanguagePair>> {
        Ok(self.pairs.clone())
    }
}
