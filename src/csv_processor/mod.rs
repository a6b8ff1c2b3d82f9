pub mod chunker;
pub mod column_config;
pub mod reader;
pub mod record;
pub mod resequencer;
pub mod writer;

pub use chunker::{Chunk, ChunkRange, Chunker};
pub use column_config::{ColumnConfig, FileColumns};
pub use reader::{file_exists, load_record_set, CsvRecordReader};
pub use record::{Record, RecordSet};
pub use resequencer::{reorder, ChunkResult, ChunkStatus, Resequencer};
pub use writer::{output_path_for, save_record_set, JsonRecordWriter};
