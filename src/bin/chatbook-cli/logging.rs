use std::path::Path;

use flexi_logger::{
    detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
};

use crate::config::{ConfigPaths, LoggingConfig};

const DEFAULT_BASENAME: &str = "chatbook";

/// Start file logging. Warnings and errors are also echoed to stderr so a
/// skipped turn or an unreadable document is visible without opening the
/// log. The returned handle must stay alive until exit.
pub fn init_logging(config: &LoggingConfig, paths: &ConfigPaths) -> anyhow::Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(&config.level)?
        .log_to_file(file_spec(config.path.as_deref().map(Path::new), &paths.logs_dir))
        .format_for_files(detailed_format)
        .duplicate_to_stderr(Duplicate::Warn)
        .append()
        .rotate(
            Criterion::Size(config.rotate_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.rotate_keep),
        )
        .start()?;
    log::debug!("chatbook {} started", env!("CARGO_PKG_VERSION"));
    Ok(handle)
}

/// Split a configured log path into flexi_logger's directory and basename;
/// without one, log to `chatbook.log` in the logs directory.
fn file_spec(configured: Option<&Path>, logs_dir: &Path) -> FileSpec {
    let Some(path) = configured else {
        return FileSpec::default()
            .directory(logs_dir)
            .basename(DEFAULT_BASENAME);
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => logs_dir.to_path_buf(),
    };
    let basename = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_BASENAME);
    FileSpec::default()
        .directory(directory)
        .basename(basename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_path_sets_directory_and_basename() {
        let spec = file_spec(Some(Path::new("/var/log/books/run.log")), Path::new("/tmp/logs"));
        let path = spec.as_pathbuf(None);
        assert!(path.starts_with("/var/log/books"));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("run")));
    }

    #[test]
    fn bare_file_name_lands_in_logs_dir() {
        let spec = file_spec(Some(Path::new("mine.log")), Path::new("/tmp/logs"));
        assert!(spec.as_pathbuf(None).starts_with("/tmp/logs"));
        let default = file_spec(None, Path::new("/tmp/logs"));
        assert!(default.as_pathbuf(None).starts_with("/tmp/logs"));
    }
}
