use crate::csv_processor::ChunkStatus;
use crate::state::JobStats;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    JobStarted {
        rows: usize,
        chunks: usize,
        chunk_size: usize,
        concurrency: usize,
    },
    ChunkCompleted {
        sequence: usize,
        rows: usize,
        status: ChunkStatus,
        rows_completed: usize,
        rows_total: usize,
        rate: f64,
        eta: Option<Duration>,
    },
    JobFinished {
        stats: JobStats,
    },
}

/// Receives job progress. Called from the scheduler's collection loop, so
/// implementations must return quickly.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::JobStarted {
                rows,
                chunks,
                chunk_size,
                concurrency,
            } => {
                info!(rows, chunks, chunk_size, concurrency, "Starting translation");
            }
            ProgressEvent::ChunkCompleted {
                sequence,
                rows,
                status,
                rows_completed,
                rows_total,
                rate,
                eta,
            } => {
                info!(
                    chunk = sequence,
                    rows,
                    status = %status,
                    progress = %format!("{}/{}", rows_completed, rows_total),
                    rate = %format!("{:.1} rows/s", rate),
                    eta = %eta.map_or_else(|| "-".to_string(), |d| format!("{:.0}s", d.as_secs_f64())),
                    "Chunk completed"
                );
            }
            ProgressEvent::JobFinished { stats } => {
                info!(
                    rows = stats.rows_completed,
                    fallback_chunks = stats.fallback_chunks,
                    elapsed = %format!("{:.1}s", stats.elapsed.as_secs_f64()),
                    rate = %format!("{:.1} rows/s", stats.rate()),
                    "Translation finished"
                );
            }
        }
    }
}

/// Forwards events into an unbounded channel for a front end to consume.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, event: ProgressEvent) {
        // receiver gone means nobody is watching
        let _ = self.tx.send(event);
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &R {
    fn report(&self, event: ProgressEvent) {
        (**self).report(event)
    }
}
