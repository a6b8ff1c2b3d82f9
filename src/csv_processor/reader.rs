use crate::csv_processor::record::{Record, RecordSet};
use crate::utils::{Result, TranslatorError};
use csv::StringRecord;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub struct CsvRecordReader {
    path: PathBuf,
}

impl CsvRecordReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<RecordSet> {
        if !file_exists(&self.path) {
            return Err(TranslatorError::FileNotFound(
                self.path.display().to_string(),
            ));
        }

        let bytes = std::fs::read(&self.path)?;
        let text = decode(&bytes);
        if matches!(text, Cow::Owned(_)) {
            tracing::warn!(path = %self.path.display(), "File is not valid UTF-8, decoded as Latin-1");
        }

        let set = parse_records(text.as_bytes())?;
        tracing::info!(
            path = %self.path.display(),
            rows = set.len(),
            columns = set.schema.len(),
            "Loaded CSV"
        );
        Ok(set)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn load_record_set(path: impl AsRef<Path>) -> Result<RecordSet> {
    CsvRecordReader::new(path.as_ref()).load()
}

/// Parses CSV with a header row. Short rows are padded with empty values and
/// values beyond the header are dropped.
pub fn parse_records(data: &[u8]) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let schema: Vec<String> = reader.headers()?.iter().map(clean_cell).collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(to_record(&schema, &row));
    }

    Ok(RecordSet::new(schema, records))
}

fn to_record(schema: &[String], row: &StringRecord) -> Record {
    Record::from_pairs(
        schema
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), row.get(i).map(clean_cell).unwrap_or_default())),
    )
}

/// Strips surrounding spaces and stray double quotes.
pub fn clean_cell(value: &str) -> String {
    value.trim_matches(|c| c == ' ' || c == '"').to_string()
}

/// Falls back to ISO-8859-1: every byte becomes the code point of the same value.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

pub fn file_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}
