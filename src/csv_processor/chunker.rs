use crate::csv_processor::record::Record;
use std::ops::Range;

/// A contiguous run of records handed to one worker task.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub sequence: usize,
    pub offset: usize,
    pub records: Vec<Record>,
}

impl Chunk {
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Original positions of the records in this chunk.
    pub fn positions(&self) -> Range<usize> {
        self.offset..self.offset + self.records.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRange {
    pub sequence: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl ChunkRange {
    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row
    }
}

pub struct Chunker {
    chunk_size: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn calculate_chunks(&self, total_rows: usize) -> Vec<ChunkRange> {
        let mut chunks = Vec::with_capacity(total_rows.div_ceil(self.chunk_size));
        let mut current_start = 0;
        let mut sequence = 0;

        while current_start < total_rows {
            let end_row = (current_start + self.chunk_size).min(total_rows);
            chunks.push(ChunkRange {
                sequence,
                start_row: current_start,
                end_row,
            });

            current_start = end_row;
            sequence += 1;
        }

        chunks
    }

    pub fn partition(&self, records: &[Record]) -> Vec<Chunk> {
        self.calculate_chunks(records.len())
            .into_iter()
            .map(|range| Chunk {
                sequence: range.sequence,
                offset: range.start_row,
                records: records[range.start_row..range.end_row].to_vec(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_cover_every_row_once() {
        for total in 0..60 {
            for size in 1..15 {
                let ranges = Chunker::new(size).calculate_chunks(total);
                let mut covered = vec![0u8; total];
                for (i, range) in ranges.iter().enumerate() {
                    assert_eq!(range.sequence, i);
                    assert!(range.row_count() >= 1 && range.row_count() <= size);
                    for row in range.start_row..range.end_row {
                        covered[row] += 1;
                    }
                }
                assert!(covered.iter().all(|&c| c == 1), "total={} size={}", total, size);
            }
        }
    }

    #[test]
    fn test_partition_offsets() {
        let records: Vec<Record> = (0..25)
            .map(|i| Record::from_pairs([("n", i.to_string())]))
            .collect();
        let chunks = Chunker::new(10).partition(&records);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].positions(), 20..25);
        assert_eq!(chunks[2].records[0].get("n"), Some("20"));
    }

    #[test]
    fn test_zero_size_is_clamped() {
        assert_eq!(Chunker::new(0).calculate_chunks(3).len(), 3);
    }
}
