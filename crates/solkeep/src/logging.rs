//! Structured JSON logging to stderr and a data-dir log file.
//!
//! Wallet secrets never pass through this layer; callers log addresses and
//! user ids only.

use tracing_subscriber::prelude::*;

use crate::paths::SolkeepPaths;

/// Installs the global subscriber. The returned guard must be held for the
/// process lifetime or buffered file output is lost.
pub fn init(paths: &SolkeepPaths) -> tracing_appender::non_blocking::WorkerGuard {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let file_name = paths
        .log_file
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("solkeep.log.jsonl");
    let file_appender = tracing_appender::rolling::never(&paths.data_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());
    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}
