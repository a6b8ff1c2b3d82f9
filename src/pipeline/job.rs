use crate::csv_processor::{load_record_set, output_path_for, save_record_set, ColumnConfig};
use crate::pipeline::scheduler::BatchScheduler;
use crate::state::ProgressReporter;
use crate::translation::{EngineFactory, LanguagePair};
use crate::utils::{AppConfig, Result, TranslatorError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FileReport {
    pub file: String,
    pub output: PathBuf,
    pub rows: usize,
    pub fallback_chunks: usize,
    pub elapsed: Duration,
}

impl FileReport {
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.rows as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs the CSV -> translate -> JSON pipeline for configured files, one file at a time.
pub struct TranslationJob {
    config: AppConfig,
    columns: ColumnConfig,
    factory: Arc<dyn EngineFactory>,
    scheduler: BatchScheduler,
    concurrency: usize,
    cancel: CancellationToken,
}

impl TranslationJob {
    pub fn new(
        config: AppConfig,
        columns: ColumnConfig,
        factory: Arc<dyn EngineFactory>,
        concurrency: usize,
    ) -> Self {
        let scheduler = BatchScheduler::new(factory.clone(), config.scheduler.clone());
        Self {
            config,
            columns,
            factory,
            scheduler,
            concurrency,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn columns(&self) -> &ColumnConfig {
        &self.columns
    }

    /// Fails unless the engine offers `pair`.
    pub async fn preflight(&self, pair: &LanguagePair) -> Result<()> {
        info!(pair = %pair, "Checking translation packages");
        if self.factory.supports(pair).await? {
            Ok(())
        } else {
            Err(TranslatorError::UnsupportedLanguagePair {
                source_lang: pair.source.clone(),
                target_lang: pair.target.clone(),
            })
        }
    }

    pub async fn process_file<R: ProgressReporter>(
        &self,
        csv_name: &str,
        pair: &LanguagePair,
        reporter: &R,
    ) -> Result<FileReport> {
        let span = info_span!("job", job_id = %Uuid::new_v4(), file = %csv_name);
        self.process_file_inner(csv_name, pair, reporter)
            .instrument(span)
            .await
    }

    async fn process_file_inner<R: ProgressReporter>(
        &self,
        csv_name: &str,
        pair: &LanguagePair,
        reporter: &R,
    ) -> Result<FileReport> {
        let started = Instant::now();
        let spec = self.columns.spec_for(csv_name, &pair.source, &pair.target)?;
        let records = load_record_set(self.columns.input_path(csv_name))?;

        if !spec.has_fields() {
            info!("No columns to translate");
        }

        let output = self
            .scheduler
            .translate_all_with(records, &spec, self.concurrency, reporter, self.cancel.clone())
            .await?;

        let path = output_path_for(csv_name, &self.config.output_dir_for(&pair.target));
        let rows = save_record_set(&output.records, &path)?;

        let report = FileReport {
            file: csv_name.to_string(),
            output: path,
            rows,
            fallback_chunks: output.stats.fallback_chunks,
            elapsed: started.elapsed(),
        };
        info!(
            rows = report.rows,
            fallback_chunks = report.fallback_chunks,
            elapsed = %format!("{:.1}s", report.elapsed.as_secs_f64()),
            "File processed"
        );
        Ok(report)
    }

    /// Files are translated sequentially; the first fatal error stops the run.
    pub async fn process_files<R: ProgressReporter>(
        &self,
        csv_names: &[String],
        pair: &LanguagePair,
        reporter: &R,
    ) -> Result<Vec<FileReport>> {
        let mut reports = Vec::with_capacity(csv_names.len());
        for (i, name) in csv_names.iter().enumerate() {
            info!(file = %name, index = i + 1, total = csv_names.len(), "Processing file");
            reports.push(self.process_file(name, pair, reporter).await?);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SilentReporter;
    use crate::translation::{MockEngineFactory, MockMode};
    use std::path::Path;

    fn workspace(dir: &Path) -> AppConfig {
        let input = dir.join("input");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(
            input.join("products.csv"),
            "id,name,description\n1,Apple,\"<b>Red</b> fruit\"\n2,Pear,\n3,Plum,Purple fruit\n",
        )
        .unwrap();
        std::fs::write(input.join("codes.csv"), "code,label\nA1,Alpha\n").unwrap();
        std::fs::write(
            input.join("column_data.json"),
            r#"{"products.csv": {"translate": ["name", "description"]}, "codes.csv": {"translate": []}}"#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.paths.input_dir = input;
        config.paths.output_dir = dir.join("output");
        config
    }

    fn job(config: AppConfig, factory: MockEngineFactory) -> TranslationJob {
        let columns = ColumnConfig::load(&config.paths.input_dir, &config.paths.column_config).unwrap();
        TranslationJob::new(config, columns, Arc::new(factory), 2)
    }

    #[tokio::test]
    async fn test_process_files_writes_json_per_target() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(workspace(dir.path()), MockEngineFactory::new(MockMode::Suffix));
        let pair = LanguagePair::new("en", "id");

        let files = job.columns().available_files().unwrap();
        assert_eq!(files, vec!["codes.csv".to_string(), "products.csv".to_string()]);

        let reports = job.process_files(&files, &pair, &SilentReporter).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].rows, 3);
        assert_eq!(reports[1].fallback_chunks, 0);
        assert_eq!(reports[1].output, dir.path().join("output").join("id").join("products.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&reports[1].output).unwrap()).unwrap();
        let rows = written["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["id"], "1");
        assert_eq!(rows[0]["name"], "Apple_id");
        assert_eq!(rows[0]["description"], "<b>Red</b> fruit_id_markup");
        assert_eq!(rows[1]["description"], "");
        assert_eq!(rows[2]["name"], "Plum_id");

        let codes: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&reports[0].output).unwrap()).unwrap();
        assert_eq!(codes["rows"][0]["label"], "Alpha");
    }

    #[tokio::test]
    async fn test_unconfigured_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(workspace(dir.path()), MockEngineFactory::new(MockMode::Suffix));

        let err = job
            .process_file("other.csv", &LanguagePair::new("en", "id"), &SilentReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, TranslatorError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_preflight_checks_pair() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(workspace(dir.path()), MockEngineFactory::new(MockMode::Suffix));

        assert!(job.preflight(&LanguagePair::new("en", "id")).await.is_ok());
        let err = job.preflight(&LanguagePair::new("en", "fr")).await.unwrap_err();
        assert!(matches!(
            err,
            TranslatorError::UnsupportedLanguagePair { ref target_lang, .. } if target_lang == "fr"
        ));
    }

    #[tokio::test]
    async fn test_cancelled_job_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let job = job(config, MockEngineFactory::new(MockMode::Suffix)).with_cancellation(cancel);

        let err = job
            .process_file("products.csv", &LanguagePair::new("en", "id"), &SilentReporter)
            .await
            .unwrap_err();
        assert!(matches!(err, TranslatorError::Cancelled));
        assert!(!dir.path().join("output").join("id").join("products.json").exists());
    }
}
