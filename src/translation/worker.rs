use crate::csv_processor::{Chunk, ChunkResult};
use crate::translation::engine::{EngineFactory, LanguagePair, TranslationEngine};
use crate::translation::field::FieldTranslator;
use std::sync::Arc;
use tracing::{debug, error};

/// Translates the configured fields of every record in a chunk.
///
/// A worker owns its engine handle. If connecting failed the worker still runs,
/// handing every chunk back untranslated.
#[derive(Clone)]
pub struct BatchWorker {
    id: usize,
    engine: Option<Arc<dyn TranslationEngine>>,
    fields: Arc<[String]>,
}

impl BatchWorker {
    pub async fn connect(
        id: usize,
        factory: &dyn EngineFactory,
        pair: &LanguagePair,
        fields: Arc<[String]>,
    ) -> Self {
        let engine: Option<Arc<dyn TranslationEngine>> = match factory.connect(pair).await {
            Ok(engine) => {
                debug!(worker = id, engine = engine.engine_name(), pair = %pair, "Worker engine ready");
                Some(Arc::from(engine))
            }
            Err(e) => {
                error!(
                    worker = id,
                    pair = %pair,
                    error = %e,
                    "Engine initialization failed, this worker's chunks stay untranslated"
                );
                None
            }
        };

        Self { id, engine, fields }
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub async fn translate_chunk(&self, chunk: Chunk) -> ChunkResult {
        let Some(engine) = self.engine.as_deref() else {
            debug!(worker = self.id, chunk = chunk.sequence, "No engine, chunk left untranslated");
            return ChunkResult::fallback(chunk);
        };

        let translator = FieldTranslator::new(engine);
        let Chunk {
            sequence,
            offset,
            mut records,
        } = chunk;

        for record in records.iter_mut() {
            for field in self.fields.iter() {
                let value = match record.get(field) {
                    Some(value) if !value.is_empty() => value.to_string(),
                    _ => continue,
                };
                let translated = translator.translate(&value).await;
                record.insert(field.as_str(), translated);
            }
        }

        ChunkResult::translated(sequence, offset, records)
    }
}
