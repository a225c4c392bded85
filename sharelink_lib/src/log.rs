use serde::Deserialize;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use crate::Error;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    None,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
            LogLevel::None => "off",
        }
    }

    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::None => LevelFilter::OFF,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level; `target` accepts `stderr`, `stdout` or a file path.
pub fn init(level: Option<LogLevel>, target: Option<&str>) -> Result<(), Error> {
    let level = level.unwrap_or_default();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    let destination = parse_destination(target);
    let use_ansi = destination.ansi_enabled();
    let writer = destination.make_writer()?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_ansi(use_ansi)
        .try_init()
        .map_err(|err| Error::InvalidConfig(format!("failed to initialize logger: {err}")))?;

    Ok(())
}

fn parse_destination(value: Option<&str>) -> LogDestination {
    let Some(entry) = value.map(str::trim).filter(|entry| !entry.is_empty()) else {
        return LogDestination::Stderr;
    };

    if entry.eq_ignore_ascii_case("stdout") {
        LogDestination::Stdout
    } else if entry.eq_ignore_ascii_case("stderr") {
        LogDestination::Stderr
    } else {
        LogDestination::Path(PathBuf::from(entry))
    }
}

#[derive(Debug, Clone)]
enum LogDestination {
    Stdout,
    Stderr,
    Path(PathBuf),
}

impl LogDestination {
    fn ansi_enabled(&self) -> bool {
        !matches!(self, LogDestination::Path(_))
    }

    fn make_writer(&self) -> Result<BoxMakeWriter, Error> {
        match self {
            LogDestination::Stdout => Ok(BoxMakeWriter::new(io::stdout)),
            LogDestination::Stderr => Ok(BoxMakeWriter::new(io::stderr)),
            LogDestination::Path(path) => create_file_writer(path),
        }
    }
}

fn create_file_writer(path: &Path) -> Result<BoxMakeWriter, Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let shared = std::sync::Arc::new(std::sync::Mutex::new(file));

    Ok(BoxMakeWriter::new(move || SharedFileWriter {
        inner: shared.clone(),
    }))
}

#[derive(Clone)]
struct SharedFileWriter {
    inner: std::sync::Arc<std::sync::Mutex<std::fs::File>>,
}

impl io::Write for SharedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().unwrap().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_parse_case_insensitively() {
        assert!(matches!(parse_destination(None), LogDestination::Stderr));
        assert!(matches!(
            parse_destination(Some("STDOUT")),
            LogDestination::Stdout
        ));
        assert!(matches!(
            parse_destination(Some("  ")),
            LogDestination::Stderr
        ));
        assert!(matches!(
            parse_destination(Some("/tmp/sharelink.log")),
            LogDestination::Path(_)
        ));
    }
}
