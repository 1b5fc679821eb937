// logging.rs: log file sink with stdout mirror and optional syslog
//
// Library code logs through the `log` facade; the daemon installs this sink
// once at startup. The file handle is opened once and held for the process
// lifetime.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use syslog::{Facility, Formatter3164, LoggerBackend};

use crate::config::LoggingConfig;

type Syslog = syslog::Logger<LoggerBackend, Formatter3164>;

pub struct DaemonLogger {
    level:   LevelFilter,
    verbose: bool,
    file:    Option<Mutex<File>>,
    syslog:  Option<Mutex<Syslog>>,
}

impl DaemonLogger {
    pub fn new(cfg: &LoggingConfig, verbose: bool) -> Result<Self> {
        let file = match cfg.log_file {
            Some(ref path) => Some(Mutex::new(
                OpenOptions::new()
                    .create(true).append(true)
                    .open(path)
                    .with_context(|| format!(
                        "Log file '{}' not writable, check path and permissions", path
                    ))?,
            )),
            None => None,
        };

        let syslog = if cfg.syslog {
            let formatter = Formatter3164 {
                facility: Facility::LOG_DAEMON,
                hostname: None,
                process:  "fm-monitor".into(),
                pid:      std::process::id(),
            };
            let logger = syslog::unix(formatter)
                .map_err(|e| anyhow::anyhow!("Syslog init failed: {}", e))?;
            Some(Mutex::new(logger))
        } else {
            None
        };

        Ok(Self {
            level: if verbose { LevelFilter::Debug } else { LevelFilter::Info },
            verbose,
            file,
            syslog,
        })
    }

    /// Install as the global `log` backend.
    pub fn install(self) -> Result<()> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| anyhow::anyhow!("Logger already installed: {}", e))?;
        log::set_max_level(level);
        Ok(())
    }
}

fn format_line(level: Level, msg: &str) -> String {
    let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {:<5} {}", ts, level, msg)
}

impl Log for DaemonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg  = record.args().to_string();
        let line = format_line(record.level(), &msg);

        if self.verbose { println!("{}", line); }

        if let Some(ref file) = self.file {
            if let Ok(mut f) = file.lock() {
                let _ = writeln!(f, "{}", line);
            }
        }

        if let Some(ref syslog) = self.syslog {
            if let Ok(mut s) = syslog.lock() {
                let _ = match record.level() {
                    Level::Error => s.err(&msg),
                    Level::Warn  => s.warning(&msg),
                    Level::Info  => s.info(&msg),
                    Level::Debug | Level::Trace => s.debug(&msg),
                };
            }
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(logger: &DaemonLogger, level: Level, msg: &str) {
        logger.log(&Record::builder().args(format_args!("{}", msg)).level(level).build());
    }

    #[test]
    fn lines_are_appended_with_timestamp_and_level() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("fm.log");
        let cfg  = LoggingConfig {
            log_file: Some(path.to_string_lossy().into_owned()),
            verbose:  false,
            syslog:   false,
        };
        let logger = DaemonLogger::new(&cfg, false).unwrap();
        record_at(&logger, Level::Warn, "monitoring poll aborted");
        record_at(&logger, Level::Debug, "hidden below info");
        logger.flush();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("WARN  monitoring poll aborted"));
    }

    #[test]
    fn verbose_lowers_the_threshold() {
        let logger = DaemonLogger::new(&LoggingConfig::default(), true).unwrap();
        assert!(logger.enabled(&Metadata::builder().level(Level::Debug).build()));
        assert!(!logger.enabled(&Metadata::builder().level(Level::Trace).build()));
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let cfg = LoggingConfig {
            log_file: Some("/nonexistent-dir/fm.log".into()),
            ..Default::default()
        };
        let err = DaemonLogger::new(&cfg, false).err().unwrap();
        assert!(err.to_string().contains("not writable"));
    }
}
