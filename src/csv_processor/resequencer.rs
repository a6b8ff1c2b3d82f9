use crate::csv_processor::chunker::Chunk;
use crate::csv_processor::record::Record;
use crate::utils::{Result, TranslatorError};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    Translated,
    Fallback,
}

impl std::fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkStatus::Translated => write!(f, "translated"),
            ChunkStatus::Fallback => write!(f, "fallback"),
        }
    }
}

/// Output of one chunk. Record `i` sits at original position `offset + i`.
#[derive(Debug, Clone)]
pub struct ChunkResult {
    pub sequence: usize,
    pub offset: usize,
    pub records: Vec<Record>,
    pub status: ChunkStatus,
}

impl ChunkResult {
    pub fn translated(sequence: usize, offset: usize, records: Vec<Record>) -> Self {
        Self {
            sequence,
            offset,
            records,
            status: ChunkStatus::Translated,
        }
    }

    /// The chunk's own records, untouched.
    pub fn fallback(chunk: Chunk) -> Self {
        Self {
            sequence: chunk.sequence,
            offset: chunk.offset,
            records: chunk.records,
            status: ChunkStatus::Fallback,
        }
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_fallback(&self) -> bool {
        self.status == ChunkStatus::Fallback
    }
}

/// Collects chunk results in any order and emits records by original position.
#[derive(Debug, Default)]
pub struct Resequencer {
    buffer: BTreeMap<usize, ChunkResult>,
}

impl Resequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chunk(&mut self, result: ChunkResult) -> Result<()> {
        if let Some(existing) = self.buffer.get(&result.offset) {
            return Err(TranslatorError::PositionConflict {
                position: existing.offset,
            });
        }
        self.buffer.insert(result.offset, result);
        Ok(())
    }

    /// Walks buffered chunks by offset; each must start where the previous ended
    /// and the last must end at `original_length`.
    pub fn finish(self, original_length: usize) -> Result<Vec<Record>> {
        let mut output = Vec::with_capacity(original_length);

        for (offset, chunk) in self.buffer {
            if offset < output.len() {
                return Err(TranslatorError::PositionConflict { position: offset });
            }
            if offset > output.len() {
                return Err(TranslatorError::RowCountMismatch {
                    expected: offset,
                    got: output.len(),
                });
            }
            output.extend(chunk.records);
        }

        if output.len() != original_length {
            return Err(TranslatorError::RowCountMismatch {
                expected: original_length,
                got: output.len(),
            });
        }

        Ok(output)
    }
}

pub fn reorder(
    results: impl IntoIterator<Item = ChunkResult>,
    original_length: usize,
) -> Result<Vec<Record>> {
    let mut resequencer = Resequencer::new();
    for result in results {
        resequencer.add_chunk(result)?;
    }
    resequencer.finish(original_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_processor::chunker::Chunker;

    fn numbered(n: usize) -> Vec<Record> {
        // "id" deliberately repeats so ordering cannot come from it
        (0..n)
            .map(|i| Record::from_pairs([("id", (i % 3).to_string()), ("pos", i.to_string())]))
            .collect()
    }

    #[test]
    fn test_reorder_independent_of_arrival() {
        let records = numbered(37);
        let chunks = Chunker::new(5).partition(&records);

        let mut results: Vec<ChunkResult> = chunks
            .into_iter()
            .map(|c| ChunkResult::translated(c.sequence, c.offset, c.records))
            .collect();
        results.reverse();
        results.swap(1, 4);

        let output = reorder(results, records.len()).unwrap();
        assert_eq!(output, records);
    }

    #[test]
    fn test_gap_is_reported() {
        let records = numbered(20);
        let chunks = Chunker::new(5).partition(&records);
        let results: Vec<ChunkResult> = chunks
            .into_iter()
            .filter(|c| c.sequence != 1)
            .map(ChunkResult::fallback)
            .collect();

        assert!(matches!(
            reorder(results, 20),
            Err(TranslatorError::RowCountMismatch { expected: 10, got: 5 })
        ));
    }

    #[test]
    fn test_duplicate_offset_is_reported() {
        let records = numbered(4);
        let a = ChunkResult::translated(0, 0, records.clone());
        let b = ChunkResult::fallback(Chunk {
            sequence: 0,
            offset: 0,
            records,
        });
        assert!(matches!(
            reorder([a, b], 4),
            Err(TranslatorError::PositionConflict { position: 0 })
        ));
    }

    #[test]
    fn test_short_total_is_reported() {
        let records = numbered(4);
        let result = ChunkResult::translated(0, 0, records);
        assert!(matches!(
            reorder([result], 6),
            Err(TranslatorError::RowCountMismatch { expected: 6, got: 4 })
        ));
    }

    #[test]
    fn test_empty() {
        assert!(reorder(Vec::new(), 0).unwrap().is_empty());
    }
}
