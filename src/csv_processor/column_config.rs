use crate::utils::{Result, TranslationSpec, TranslatorError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Per-file settings from `column_data.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileColumns {
    #[serde(default)]
    pub translate: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ColumnConfig {
    input_dir: PathBuf,
    files: HashMap<String, FileColumns>,
}

impl ColumnConfig {
    pub fn load(input_dir: impl Into<PathBuf>, file_name: &str) -> Result<Self> {
        let input_dir = input_dir.into();
        let path = input_dir.join(file_name);

        let content = std::fs::read_to_string(&path).map_err(|e| {
            TranslatorError::ConfigError(format!(
                "Configuration file not found: {} ({})",
                path.display(),
                e
            ))
        })?;
        let files: HashMap<String, FileColumns> = serde_json::from_str(&content).map_err(|e| {
            TranslatorError::ConfigError(format!("Invalid JSON in configuration file: {}", e))
        })?;

        tracing::debug!(path = %path.display(), files = files.len(), "Loaded column configuration");
        Ok(Self { input_dir, files })
    }

    pub fn columns_for(&self, csv_name: &str) -> Result<&FileColumns> {
        self.files
            .get(csv_name)
            .ok_or_else(|| TranslatorError::NotConfigured(csv_name.to_string()))
    }

    pub fn spec_for(&self, csv_name: &str, source_lang: &str, target_lang: &str) -> Result<TranslationSpec> {
        let columns = self.columns_for(csv_name)?;
        Ok(TranslationSpec::new(
            source_lang,
            target_lang,
            columns.translate.iter().cloned(),
        ))
    }

    /// `*.csv` files in the input directory that have an entry, sorted by name.
    pub fn available_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.input_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if self.files.contains_key(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn input_path(&self, csv_name: &str) -> PathBuf {
        self.input_dir.join(csv_name)
    }
}
