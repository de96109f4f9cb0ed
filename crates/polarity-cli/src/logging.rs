use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{filter::LevelFilter, fmt, fmt::format::FmtSpan, prelude::*};

/// Maps the `-q` and `-v` flags to a level: quiet keeps errors only, no flag keeps warnings.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Creates the log file, and any missing parent directories, truncating an old log.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    File::create(path).map_err(CliError::Io)
}

/// Installs the global subscriber.
///
/// The console gets a compact, colored stream of events. The optional log file gets plain
/// text with targets and also records when each span closes, so every `molecule` and
/// workflow span leaves a line with its busy and idle time.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file_layer = log_file
        .map(open_log_file)
        .transpose()?
        .map(|file| {
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
        });

    tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, info, info_span, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn flags_map_to_levels() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(9, false), LevelFilter::TRACE);
        assert_eq!(level_filter(0, true), LevelFilter::ERROR);
    }

    #[test]
    #[serial]
    fn global_logger_accepts_pipeline_events() {
        ensure_global_logger_is_set();

        let span = info_span!("molecule", name = "HF");
        let _guard = span.enter();
        info!("Stage 1/8: prepare");
        warn!("No L = 1 multipole block found; using a zero molecular dipole.");
        debug!(vertices = 3, faces = 1, "Loaded surface mesh.");
    }

    #[test]
    fn log_file_records_molecule_span_timings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("logs").join("batch.log");
        let file = open_log_file(&log_path).unwrap();

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE),
        );
        tracing::subscriber::with_default(subscriber, || {
            let span = info_span!("molecule", name = "H2O");
            let _guard = span.enter();
            info!("Stage 5/8: mesh");
        });

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("molecule{name=\"H2O\"}"));
        assert!(content.contains("Stage 5/8: mesh"));
        assert!(content.contains("close"));
        assert!(content.contains("time.busy"));
    }

    #[test]
    fn log_file_parent_directories_are_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a").join("b").join("run.log");
        open_log_file(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn directory_as_log_file_is_an_io_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = open_log_file(temp_dir.path());
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
