//! Chunks go into one shared queue; a bounded worker pool drains it and the
//! resequencer puts results back in input order. A failed chunk keeps its original rows.

use crate::csv_processor::{reorder, Chunk, ChunkRange, ChunkResult, Chunker, RecordSet};
use crate::state::{JobStats, LogReporter, ProgressEvent, ProgressReporter};
use crate::translation::{BatchWorker, EngineFactory, LanguagePair};
use crate::utils::{Result, SchedulerConfig, TranslationSpec, TranslatorError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

type ChunkQueue = Arc<Mutex<VecDeque<Chunk>>>;

enum ChunkOutcome {
    Done(ChunkResult),
    Failed(String),
}

struct ChunkReport {
    worker: usize,
    sequence: usize,
    outcome: ChunkOutcome,
}

struct WorkerContext {
    id: usize,
    factory: Arc<dyn EngineFactory>,
    pair: LanguagePair,
    fields: Arc<[String]>,
    queue: ChunkQueue,
    tx: mpsc::Sender<ChunkReport>,
    chunk_timeout: Option<Duration>,
    cancel: CancellationToken,
}

/// Translated records plus the counters of the run that produced them.
#[derive(Debug, Clone)]
pub struct JobOutput {
    pub records: RecordSet,
    pub stats: JobStats,
}

pub struct BatchScheduler {
    factory: Arc<dyn EngineFactory>,
    config: SchedulerConfig,
}

impl BatchScheduler {
    pub fn new(factory: Arc<dyn EngineFactory>, config: SchedulerConfig) -> Self {
        Self { factory, config }
    }

    pub async fn translate_all(
        &self,
        records: RecordSet,
        spec: &TranslationSpec,
        concurrency: usize,
    ) -> Result<RecordSet> {
        let output = self
            .translate_all_with(records, spec, concurrency, &LogReporter, CancellationToken::new())
            .await?;
        Ok(output.records)
    }

    pub async fn translate_all_with<R: ProgressReporter>(
        &self,
        records: RecordSet,
        spec: &TranslationSpec,
        concurrency: usize,
        reporter: &R,
        cancel: CancellationToken,
    ) -> Result<JobOutput> {
        if !spec.has_fields() {
            debug!(rows = records.len(), "No fields to translate, returning records unchanged");
            let stats = JobStats::new(records.len(), 0);
            return Ok(JobOutput { records, stats });
        }

        validate(&records, spec)?;

        if records.is_empty() {
            let stats = JobStats::new(0, 0);
            return Ok(JobOutput { records, stats });
        }

        let concurrency = self.config.resolve_concurrency(concurrency)?;
        let chunk_size = self.config.chunk_size(records.len(), concurrency);
        let chunker = Chunker::new(chunk_size);
        let ranges = chunker.calculate_chunks(records.len());
        let chunks = chunker.partition(&records.records);
        let total_chunks = chunks.len();
        let pool_size = concurrency.min(total_chunks);

        info!(
            rows = records.len(),
            chunks = total_chunks,
            chunk_size,
            workers = pool_size,
            fields = %spec.translate_fields.join(", "),
            "Dispatching translation"
        );
        reporter.report(ProgressEvent::JobStarted {
            rows: records.len(),
            chunks: total_chunks,
            chunk_size,
            concurrency: pool_size,
        });

        let queue: ChunkQueue = Arc::new(Mutex::new(chunks.into()));
        let (tx, mut rx) = mpsc::channel::<ChunkReport>(total_chunks);
        let pair = LanguagePair::from(spec);
        let fields: Arc<[String]> = spec.translate_fields.iter().cloned().collect();

        let mut handles = Vec::with_capacity(pool_size);
        for id in 0..pool_size {
            let ctx = WorkerContext {
                id,
                factory: self.factory.clone(),
                pair: pair.clone(),
                fields: fields.clone(),
                queue: queue.clone(),
                tx: tx.clone(),
                chunk_timeout: self.config.chunk_timeout(),
                cancel: cancel.clone(),
            };
            handles.push(tokio::spawn(run_worker(ctx)));
        }
        drop(tx);

        let mut stats = JobStats::new(records.len(), total_chunks);
        let mut slots: Vec<Option<ChunkResult>> = (0..total_chunks).map(|_| None).collect();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(
                        completed = stats.chunks_completed,
                        total = total_chunks,
                        "Cancellation requested, stopping worker pool"
                    );
                    shutdown(handles, self.config.shutdown_grace()).await;
                    return Err(TranslatorError::Cancelled);
                }
                report = rx.recv() => {
                    let Some(report) = report else { break };
                    let result = match report.outcome {
                        ChunkOutcome::Done(result) => result,
                        ChunkOutcome::Failed(reason) => {
                            let range = &ranges[report.sequence];
                            error!(
                                chunk = range.sequence,
                                offset = range.start_row,
                                rows = range.row_count(),
                                worker = report.worker,
                                reason = %reason,
                                "Chunk failed, keeping original rows"
                            );
                            original_chunk(&records, range)
                        }
                    };
                    collect(result, &mut slots, &mut stats, reporter);
                }
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Worker task ended abnormally");
            }
        }

        if cancel.is_cancelled() {
            return Err(TranslatorError::Cancelled);
        }

        let missing: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(sequence, _)| sequence)
            .collect();
        for sequence in missing {
            let range = &ranges[sequence];
            error!(
                chunk = range.sequence,
                offset = range.start_row,
                rows = range.row_count(),
                "No result received for chunk, keeping original rows"
            );
            collect(original_chunk(&records, range), &mut slots, &mut stats, reporter);
        }

        stats.elapsed = stats.since_start();
        reporter.report(ProgressEvent::JobFinished {
            stats: stats.clone(),
        });

        let RecordSet {
            schema,
            records: originals,
        } = records;
        let translated = reorder(slots.into_iter().flatten(), originals.len())?;

        Ok(JobOutput {
            records: RecordSet::new(schema, translated),
            stats,
        })
    }
}

fn validate(records: &RecordSet, spec: &TranslationSpec) -> Result<()> {
    if spec.source_lang.trim().is_empty() || spec.target_lang.trim().is_empty() {
        return Err(TranslatorError::ValidationError(
            "source and target language are required".to_string(),
        ));
    }
    if LanguagePair::from(spec).is_identity() {
        return Err(TranslatorError::ValidationError(format!(
            "source and target language are both '{}'",
            spec.source_lang
        )));
    }
    if records.schema.is_empty() {
        return Err(TranslatorError::MissingSchema(spec.translate_fields.len()));
    }
    if let Some(unknown) = spec
        .translate_fields
        .iter()
        .find(|field| !records.has_field(field))
    {
        return Err(TranslatorError::UnknownField(unknown.clone()));
    }
    Ok(())
}

fn original_chunk(records: &RecordSet, range: &ChunkRange) -> ChunkResult {
    ChunkResult::fallback(Chunk {
        sequence: range.sequence,
        offset: range.start_row,
        records: records.records[range.start_row..range.end_row].to_vec(),
    })
}

fn collect<R: ProgressReporter>(
    result: ChunkResult,
    slots: &mut [Option<ChunkResult>],
    stats: &mut JobStats,
    reporter: &R,
) {
    let sequence = result.sequence;
    if slots[sequence].is_some() {
        warn!(chunk = sequence, "Duplicate result for chunk ignored");
        return;
    }

    stats.on_chunk_completed(result.row_count(), stats.since_start());
    if result.is_fallback() {
        stats.record_fallback();
    }

    reporter.report(ProgressEvent::ChunkCompleted {
        sequence,
        rows: result.row_count(),
        status: result.status,
        rows_completed: stats.rows_completed,
        rows_total: stats.rows_total,
        rate: stats.rate(),
        eta: stats.estimated_time_remaining(),
    });

    slots[sequence] = Some(result);
}

fn next_chunk(queue: &ChunkQueue) -> Option<Chunk> {
    match queue.lock() {
        Ok(mut chunks) => chunks.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

async fn run_worker(ctx: WorkerContext) {
    let worker = BatchWorker::connect(ctx.id, ctx.factory.as_ref(), &ctx.pair, ctx.fields.clone()).await;
    let mut processed = 0usize;

    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let Some(chunk) = next_chunk(&ctx.queue) else {
            break;
        };

        let sequence = chunk.sequence;
        let outcome = run_chunk(&worker, chunk, ctx.chunk_timeout, &ctx.cancel).await;
        processed += 1;

        let report = ChunkReport {
            worker: ctx.id,
            sequence,
            outcome,
        };
        if ctx.tx.send(report).await.is_err() {
            break;
        }
    }

    debug!(worker = ctx.id, chunks = processed, "Worker finished");
}

async fn run_chunk(
    worker: &BatchWorker,
    chunk: Chunk,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> ChunkOutcome {
    let task_worker = worker.clone();
    let mut task: JoinHandle<ChunkResult> =
        tokio::spawn(async move { task_worker.translate_chunk(chunk).await });

    let limit = timeout.unwrap_or(Duration::MAX);
    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::time::sleep(limit), if timeout.is_some() => {
            task.abort();
            return ChunkOutcome::Failed(format!("timed out after {:?}", limit));
        }
        _ = cancel.cancelled() => {
            task.abort();
            return ChunkOutcome::Failed("cancelled".to_string());
        }
    };

    match joined {
        Ok(result) => ChunkOutcome::Done(result),
        Err(e) if e.is_panic() => ChunkOutcome::Failed("chunk task panicked".to_string()),
        Err(e) => ChunkOutcome::Failed(e.to_string()),
    }
}

/// Gives workers `grace` to wind down, then aborts whatever is left.
async fn shutdown(mut handles: Vec<JoinHandle<()>>, grace: Duration) {
    let drained = tokio::time::timeout(grace, async {
        for handle in handles.iter_mut() {
            let _ = handle.await;
        }
    })
    .await;

    if drained.is_err() {
        warn!(grace = ?grace, "Workers did not stop in time, aborting");
    }
    for handle in &handles {
        handle.abort();
    }
}
