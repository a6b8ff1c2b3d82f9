use crate::csv_processor::record::RecordSet;
use crate::utils::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonRecordWriter {
    path: PathBuf,
}

impl JsonRecordWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writes `{"rows": [...]}` as pretty JSON, creating parent directories.
    pub fn write(&self, set: &RecordSet) -> Result<usize> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, set)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(path = %self.path.display(), rows = set.len(), "Saved translated rows");
        Ok(set.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn save_record_set(set: &RecordSet, path: impl AsRef<Path>) -> Result<usize> {
    JsonRecordWriter::new(path.as_ref()).write(set)
}

/// `products.csv` -> `<dir>/products.json`
pub fn output_path_for(csv_name: &str, dir: &Path) -> PathBuf {
    let stem = Path::new(csv_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| csv_name.to_string());
    dir.join(format!("{}.json", stem))
}
