use std::io;

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{ConfigPaths, GeneralConfig, LogFormat};

const DAYS_TO_KEEP: usize = 7;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing for the application
///
/// Uses the `RUST_LOG` environment variable if set, otherwise the configured
/// log level. Console output goes to stderr in the configured format. When
/// `log_to_file` is enabled the same events are also written to a daily
/// rotating file in the log directory.
///
/// # Errors
/// Returns error if the log directory cannot be created or the subscriber is
/// already installed
pub fn init(config: &GeneralConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.log_format)];

    if config.log_to_file {
        let log_dir = ConfigPaths::log_dir()?;

        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .max_log_files(DAYS_TO_KEEP)
            .filename_prefix("nowplaying")
            .filename_suffix("log")
            .build(&log_dir)?;
        let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

        let file_layer: BoxedLayer = match config.log_format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .compact()
                .with_target(true)
                .with_level(true)
                .with_writer(non_blocking)
                .with_ansi(false)
                .boxed(),
        };
        layers.push(file_layer);

        std::mem::forget(_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

fn console_layer(format: LogFormat) -> BoxedLayer {
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_writer(io::stderr)
            .boxed(),
    }
}
