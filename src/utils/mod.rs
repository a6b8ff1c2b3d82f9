pub mod config;
pub mod errors;

pub use config::{
    default_concurrency, AppConfig, EngineConfig, SchedulerConfig, TranslationSpec,
};
pub use errors::{Result, TranslatorError};

/// First `max_chars` characters of `value`, for log lines.
pub fn preview(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("hello", 10), "hello");
        assert_eq!(preview("hello world", 5), "hello...");
        assert_eq!(preview("ñandú ñandú", 5), "ñandú...");
    }
}
