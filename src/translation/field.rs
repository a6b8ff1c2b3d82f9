use crate::translation::engine::TranslationEngine;
use crate::utils::preview;
use tracing::warn;

const PREVIEW_CHARS: usize = 50;

/// A value is treated as markup when it has both an opening and a closing angle bracket.
pub fn is_markup(value: &str) -> bool {
    value.contains('<') && value.contains('>')
}

/// Translates single field values. Never fails: on any engine error the
/// original value comes back.
pub struct FieldTranslator<'a> {
    engine: &'a dyn TranslationEngine,
}

impl<'a> FieldTranslator<'a> {
    pub fn new(engine: &'a dyn TranslationEngine) -> Self {
        Self { engine }
    }

    pub async fn translate(&self, value: &str) -> String {
        if value.trim().is_empty() {
            return value.to_string();
        }

        let result = if is_markup(value) {
            if self.engine.markup_available() {
                self.engine.translate_markup(value).await
            } else {
                warn!(
                    engine = self.engine.engine_name(),
                    "Markup translation not available, using plain text translation"
                );
                self.engine.translate_text(value).await
            }
        } else {
            self.engine.translate_text(value).await
        };

        match result {
            Ok(translated) => translated,
            Err(e) => {
                warn!(
                    text = %preview(value, PREVIEW_CHARS),
                    error = %e,
                    "Translation error, keeping original text"
                );
                value.to_string()
            }
        }
    }
}
