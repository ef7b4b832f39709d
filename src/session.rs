//! Session log: an append-only record of every decision and executed
//! action in one run, flushed to a timestamp-named file under the bundle's
//! `logs/` directory.

use crate::error::Result;
use chrono::{Local, SecondsFormat, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Append-only session log. `log()` never fails the caller: a write error
/// degrades to a one-time stderr note and the remaining events go to the
/// console only. Dropping the log closes it, so the file is flushed on
/// every exit path.
pub struct SessionLog {
    path: PathBuf,
    writer: Mutex<Option<LineWriter<File>>>,
}

impl SessionLog {
    /// Create `logs/` if needed and open a log file named after the
    /// session's start time. The file is opened in append mode so a
    /// same-second collision interleaves instead of truncating.
    pub fn open(logs_dir: &Path) -> Result<Self> {
        fs::create_dir_all(logs_dir)?;
        let name = format!("install-{}.log", Local::now().format("%Y%m%d-%H%M%S"));
        let path = logs_dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(Some(LineWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn log(&self, level: Level, message: &str) {
        match level {
            Level::Info => log::info!("{message}"),
            Level::Warn => log::warn!("{message}"),
            Level::Error => log::error!("{message}"),
        }

        let line = format!(
            "{} {:5} {message}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level.as_str()
        );

        let mut guard = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(writer) = guard.as_mut()
            && let Err(err) = writer.write_all(line.as_bytes())
        {
            eprintln!(
                "warning: session log {} is no longer writable ({err}); continuing without it",
                self.path.display()
            );
            *guard = None;
        }
    }

    /// Flush and sync the log file. Safe to call more than once; logging
    /// after close degrades to console-only.
    pub fn close(&self) {
        let mut guard = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut writer) = guard.take() {
            let _ = writer.flush();
            if let Ok(file) = writer.into_inner() {
                let _ = file.sync_all();
            }
        }
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        self.close();
    }
}
