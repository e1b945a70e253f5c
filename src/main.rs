//! Entry point of the `ts-catalog` command line tool.

mod cli;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Installs the tracing subscriber.
///
/// Filtering follows `RUST_LOG` (default `warn`). Logs go to stderr, or to `log_file` when
/// given; the returned guard flushes the file on drop.
fn init_logging(log_file: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = log_file.and_then(|path| {
        let file_name = path.file_name()?;
        let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        Some(tracing_appender::rolling::never(directory.unwrap_or(Path::new(".")), file_name))
    });

    match file_appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file.as_deref());

    match cli::run(cli).await {
        Ok(code) => code,
        Err(error) => {
            tracing::error!("{error}");
            let _ = writeln!(std::io::stderr().lock(), "error: {error}");
            ExitCode::from(2)
        }
    }
}
