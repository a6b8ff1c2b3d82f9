use clap::Parser;
use csv_batch_translator::cli::{self, Args};
use csv_batch_translator::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().ok();
    let level_from_env = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new("csv_batch_translator=info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load_or_default(Some(args.config.as_path()));
    if !level_from_env {
        match EnvFilter::try_new(format!("csv_batch_translator={}", config.logging.level)) {
            Ok(level) => filter_handle.reload(level)?,
            Err(e) => tracing::warn!(
                level = %config.logging.level,
                error = %e,
                "Invalid logging.level, keeping info"
            ),
        }
    }

    tracing::info!(
        endpoint = %config.engine.endpoint,
        input_dir = %config.paths.input_dir.display(),
        "Loaded configuration"
    );

    let code = cli::run(args, config).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
