use std::io;
use std::path::Path;

use file_rotate::compression::Compression;
use file_rotate::suffix::{AppendTimestamp, FileLimit};
use file_rotate::{ContentLimit, FileRotate};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

pub const LOG_FILE_NAME: &str = "app.log";
const MAX_LOG_BYTES: usize = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// `<log_dir>/app.log`, rotated at 5 MiB with the 5 most recent files kept.
pub fn rotating_file(log_dir: &Path) -> io::Result<FileRotate<AppendTimestamp>> {
    std::fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);

    #[cfg(unix)]
    let appender = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(MAX_LOG_FILES)),
        ContentLimit::Bytes(MAX_LOG_BYTES),
        Compression::None,
        None,
    );
    #[cfg(not(unix))]
    let appender = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(MAX_LOG_FILES)),
        ContentLimit::Bytes(MAX_LOG_BYTES),
        Compression::None,
    );
    Ok(appender)
}

/// Falls back to `info` when the configured level is not a valid filter.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Invalid log level {:?} ({}), using info", level, e);
        EnvFilter::new("info")
    })
}

/// Installs the global subscriber. `log` records from this crate and actix are
/// bridged in. The returned guard must live as long as the process so the file
/// writer flushes.
pub fn init(level: &str, log_dir: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(build_filter(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(rotating_file(dir)?);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(build_filter(level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    if let Some(dir) = log_dir {
        log::info!("Logging to {}", dir.join(LOG_FILE_NAME).display());
    }
    Ok(guard)
}
