pub mod menu;

pub use menu::{language_name, FileChoice, Menu, SUPPORTED_LANGUAGES};

use crate::csv_processor::ColumnConfig;
use crate::pipeline::{FileReport, TranslationJob};
use crate::state::LogReporter;
use crate::translation::{EngineFactory, LanguagePair, LibreTranslateFactory};
use crate::utils::{default_concurrency, AppConfig, TranslatorError};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug, Default)]
#[command(
    name = "csv-batch-translator",
    version,
    about = "Translate CSV columns through a LibreTranslate-compatible engine"
)]
pub struct Args {
    /// Source language code
    #[arg(short, long)]
    pub source: Option<String>,

    /// Target language code
    #[arg(short, long)]
    pub target: Option<String>,

    /// Specific CSV file to translate
    #[arg(short, long)]
    pub file: Option<String>,

    /// List available CSV files
    #[arg(short, long)]
    pub list: bool,

    /// Run in interactive mode
    #[arg(short, long)]
    pub interactive: bool,

    /// Auto mode (en -> id, all files)
    #[arg(short, long)]
    pub auto: bool,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Number of parallel workers (capped by scheduler.max_workers)
    #[arg(short, long)]
    pub workers: Option<usize>,
}

impl Args {
    /// Interactive when asked for, or when no selection flag was given.
    pub fn is_interactive(&self) -> bool {
        self.interactive
            || (self.source.is_none()
                && self.target.is_none()
                && self.file.is_none()
                && !self.list
                && !self.auto)
    }
}

/// What the front end decided to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Translate {
        pair: LanguagePair,
        files: Vec<String>,
    },
    /// Nothing to run; exit with this code.
    Exit(i32),
}

pub async fn run(args: Args, config: AppConfig) -> anyhow::Result<i32> {
    let columns = ColumnConfig::load(&config.paths.input_dir, &config.paths.column_config)?;
    let available = columns.available_files()?;

    let plan = if args.is_interactive() {
        let stdin = std::io::stdin();
        let mut menu = Menu::new(stdin.lock(), std::io::stdout());
        interactive_plan(&mut menu, &config, &available)?
    } else {
        command_line_plan(&args, &config, &available)
    };

    let (pair, files) = match plan {
        Plan::Translate { pair, files } => (pair, files),
        Plan::Exit(code) => return Ok(code),
    };

    let factory: Arc<dyn EngineFactory> = Arc::new(LibreTranslateFactory::new(config.engine.clone()));
    let concurrency = args
        .workers
        .unwrap_or_else(|| default_concurrency(config.scheduler.max_workers));

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, stopping workers...");
            ctrl_c.cancel();
        }
    });

    let output_dir = config.output_dir_for(&pair.target);
    let job = TranslationJob::new(config, columns, factory, concurrency).with_cancellation(cancel);
    job.preflight(&pair).await?;
    std::fs::create_dir_all(&output_dir)?;

    println!(
        "\nTranslating {} file(s) {} with up to {} workers",
        files.len(),
        pair,
        concurrency
    );

    let started = Instant::now();
    match job.process_files(&files, &pair, &LogReporter).await {
        Ok(reports) => {
            print_summary(&reports, started.elapsed().as_secs_f64(), &output_dir);
            Ok(0)
        }
        Err(TranslatorError::Cancelled) => {
            println!("\nProcess interrupted by user");
            Ok(130)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn interactive_plan<R: std::io::BufRead, W: std::io::Write>(
    menu: &mut Menu<R, W>,
    config: &AppConfig,
    available: &[String],
) -> std::io::Result<Plan> {
    menu.header()?;

    if available.is_empty() {
        menu.message("No CSV files are available or configured")?;
        return Ok(Plan::Exit(1));
    }

    let Some(source) = menu.select_language("SELECT SOURCE LANGUAGE:", Some(&config.defaults.source_lang))? else {
        return Ok(Plan::Exit(0));
    };
    let Some(target) = menu.select_language("SELECT TARGET LANGUAGE:", Some(&config.defaults.target_lang))? else {
        return Ok(Plan::Exit(0));
    };

    let pair = LanguagePair::new(source, target);
    if pair.is_identity() {
        menu.message("Source and target language are the same, nothing to translate!")?;
        return Ok(Plan::Exit(1));
    }

    let files = match menu.select_files(available)? {
        FileChoice::Files(files) => files,
        FileChoice::Exit => return Ok(Plan::Exit(0)),
    };

    if !menu.confirm(&pair, &files)? {
        return Ok(Plan::Exit(1));
    }

    Ok(Plan::Translate { pair, files })
}

pub fn command_line_plan(args: &Args, config: &AppConfig, available: &[String]) -> Plan {
    let pair = if args.auto {
        println!("Auto mode: English -> Indonesian, all files");
        LanguagePair::new("en", "id")
    } else {
        LanguagePair::new(
            args.source.clone().unwrap_or_else(|| config.defaults.source_lang.clone()),
            args.target.clone().unwrap_or_else(|| config.defaults.target_lang.clone()),
        )
    };

    if args.list {
        println!("Available CSV files:");
        for (i, name) in available.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        return Plan::Exit(0);
    }

    if pair.is_identity() {
        println!("Source and target language are the same, nothing to translate!");
        return Plan::Exit(1);
    }

    let files = match &args.file {
        Some(file) if available.contains(file) => vec![file.clone()],
        Some(file) => {
            println!("File not found or not configured: {}", file);
            println!("Available files:");
            for name in available {
                println!("  - {}", name);
            }
            return Plan::Exit(1);
        }
        None => available.to_vec(),
    };

    if files.is_empty() {
        println!("No CSV files found or configured for translation");
        return Plan::Exit(1);
    }

    Plan::Translate { pair, files }
}

fn print_summary(reports: &[FileReport], total_secs: f64, output_dir: &std::path::Path) {
    for report in reports {
        println!(
            "  {}: {} rows in {:.1}s ({:.1} rows/sec{}) -> {}",
            report.file,
            report.rows,
            report.elapsed.as_secs_f64(),
            report.rate(),
            if report.fallback_chunks > 0 {
                format!(", {} chunk(s) left untranslated", report.fallback_chunks)
            } else {
                String::new()
            },
            report.output.display()
        );
    }
    println!("\nAll files processed in {:.1}s", total_secs);
    println!("Output directory: {}", output_dir.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn files() -> Vec<String> {
        vec!["a.csv".to_string(), "b.csv".to_string()]
    }

    #[test]
    fn test_no_flags_means_interactive() {
        assert!(Args::default().is_interactive());
        let args = Args::parse_from(["csv-batch-translator", "-w", "2"]);
        assert!(args.is_interactive());
        let args = Args::parse_from(["csv-batch-translator", "--auto"]);
        assert!(!args.is_interactive());
    }

    #[test]
    fn test_command_line_plan_single_file() {
        let args = Args::parse_from(["csv-batch-translator", "-s", "en", "-t", "fr", "-f", "b.csv"]);
        let plan = command_line_plan(&args, &AppConfig::default(), &files());
        assert_eq!(
            plan,
            Plan::Translate {
                pair: LanguagePair::new("en", "fr"),
                files: vec!["b.csv".to_string()],
            }
        );
    }

    #[test]
    fn test_command_line_plan_rejects_unknown_file_and_same_language() {
        let args = Args::parse_from(["csv-batch-translator", "-f", "zzz.csv"]);
        assert_eq!(command_line_plan(&args, &AppConfig::default(), &files()), Plan::Exit(1));

        let args = Args::parse_from(["csv-batch-translator", "-s", "id", "-t", "id"]);
        assert_eq!(command_line_plan(&args, &AppConfig::default(), &files()), Plan::Exit(1));

        let args = Args::parse_from(["csv-batch-translator", "--list"]);
        assert_eq!(command_line_plan(&args, &AppConfig::default(), &files()), Plan::Exit(0));
    }

    #[test]
    fn test_auto_mode_uses_all_files() {
        let args = Args::parse_from(["csv-batch-translator", "-a", "-s", "fr"]);
        assert_eq!(
            command_line_plan(&args, &AppConfig::default(), &files()),
            Plan::Translate {
                pair: LanguagePair::new("en", "id"),
                files: files(),
            }
        );
    }

    #[test]
    fn test_interactive_plan() {
        // defaults, then file 1, then confirm
        let mut menu = Menu::new(Cursor::new(b"0\n0\n1\ny\n".to_vec()), Vec::new());
        let plan = interactive_plan(&mut menu, &AppConfig::default(), &files()).unwrap();
        assert_eq!(
            plan,
            Plan::Translate {
                pair: LanguagePair::new("en", "id"),
                files: vec!["a.csv".to_string()],
            }
        );

        // English to English
        let mut menu = Menu::new(Cursor::new(b"1\n1\n".to_vec()), Vec::new());
        assert_eq!(
            interactive_plan(&mut menu, &AppConfig::default(), &files()).unwrap(),
            Plan::Exit(1)
        );
        let out = String::from_utf8(menu.into_output()).unwrap();
        assert!(out.contains("Source and target language are the same"));
    }

    #[test]
    fn test_interactive_plan_without_files() {
        let mut menu = Menu::new(Cursor::new(Vec::new()), Vec::new());
        assert_eq!(
            interactive_plan(&mut menu, &AppConfig::default(), &[]).unwrap(),
            Plan::Exit(1)
        );
        let out = String::from_utf8(menu.into_output()).unwrap();
        assert!(out.contains("CSV TRANSLATION TOOL"));
        assert!(out.contains("No CSV files are available or configured"));
    }
}
