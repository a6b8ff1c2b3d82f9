pub mod reporter;

pub use reporter::{ChannelReporter, LogReporter, ProgressEvent, ProgressReporter, SilentReporter};

use std::time::{Duration, Instant};

/// Counters for a single translation job.
#[derive(Debug, Clone)]
pub struct JobStats {
    pub rows_total: usize,
    pub rows_completed: usize,
    pub chunks_total: usize,
    pub chunks_completed: usize,
    pub fallback_chunks: usize,
    pub elapsed: Duration,
    started: Instant,
}

impl JobStats {
    pub fn new(rows_total: usize, chunks_total: usize) -> Self {
        Self {
            rows_total,
            rows_completed: 0,
            chunks_total,
            chunks_completed: 0,
            fallback_chunks: 0,
            elapsed: Duration::ZERO,
            started: Instant::now(),
        }
    }

    pub fn on_chunk_completed(&mut self, rows_in_chunk: usize, elapsed_since_start: Duration) {
        self.rows_completed += rows_in_chunk;
        self.chunks_completed += 1;
        self.elapsed = elapsed_since_start;
    }

    pub fn record_fallback(&mut self) {
        self.fallback_chunks += 1;
    }

    pub fn since_start(&self) -> Duration {
        self.started.elapsed()
    }

    /// Rows per second; zero until any time has elapsed.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rows_completed as f64 / secs
        } else {
            0.0
        }
    }

    pub fn estimated_time_remaining(&self) -> Option<Duration> {
        let rate = self.rate();
        if rate <= 0.0 {
            return None;
        }
        let remaining = self.rows_total.saturating_sub(self.rows_completed);
        Some(Duration::from_secs_f64(remaining as f64 / rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_guards_zero_elapsed() {
        let mut stats = JobStats::new(100, 10);
        stats.on_chunk_completed(10, Duration::ZERO);
        assert_eq!(stats.rate(), 0.0);
        assert!(stats.estimated_time_remaining().is_none());
    }

    #[test]
    fn test_running_totals() {
        let mut stats = JobStats::new(100, 4);
        stats.on_chunk_completed(25, Duration::from_secs(1));
        stats.on_chunk_completed(25, Duration::from_secs(2));

        assert_eq!(stats.rows_completed, 50);
        assert_eq!(stats.chunks_completed, 2);
        assert!((stats.rate() - 25.0).abs() < f64::EPSILON);
        assert_eq!(stats.estimated_time_remaining(), Some(Duration::from_secs(2)));

        stats.on_chunk_completed(25, Duration::from_secs(3));
        stats.on_chunk_completed(25, Duration::from_secs(4));
        assert_eq!(stats.estimated_time_remaining(), Some(Duration::ZERO));
    }
}
