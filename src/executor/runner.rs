//! Subprocess capability seam. The executor talks to the system through
//! [`CommandRunner`] so install logic can be tested against a fake instead
//! of real package managers.

use crate::error::{InstillError, Result};
use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A fully resolved command line, kept as data so dry-run can report it
/// verbatim and tests can assert on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Rebuild this spec with `sudo` (or similar) as the program and the
    /// original command line as its arguments.
    pub fn elevated_via(self, wrapper: &Path) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program.into_os_string());
        args.extend(self.args);
        Self {
            program: wrapper.to_path_buf(),
            args,
        }
    }

    /// Shell-style rendition for logs and dry-run output.
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Last lines of combined stdout/stderr; empty when output streamed.
    pub tail: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

pub trait CommandRunner {
    /// Run a command to completion under a hard timeout. `stream` inherits
    /// the parent's stdio (verbose mode); otherwise output is captured and
    /// only its tail is returned.
    fn run(&self, spec: &CommandSpec, timeout: Duration, stream: bool) -> Result<CommandOutput>;
}

/// Real subprocess execution: spawn, poll with `try_wait`, kill on timeout
/// or interrupt. Captured output goes through an unlinked temp file so no
/// reader thread is needed.
pub struct SystemRunner {
    cancel: Arc<AtomicBool>,
    tail_lines: usize,
}

impl SystemRunner {
    pub fn new(cancel: Arc<AtomicBool>, tail_lines: usize) -> Self {
        Self { cancel, tail_lines }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec, timeout: Duration, stream: bool) -> Result<CommandOutput> {
        let mut cmd = spec.command();
        let mut capture = None;

        if stream {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            let file = tempfile::tempfile()?;
            cmd.stdin(Stdio::null())
                .stdout(Stdio::from(file.try_clone()?))
                .stderr(Stdio::from(file.try_clone()?));
            capture = Some(file);
        }

        let mut child = cmd.spawn().map_err(|e| {
            InstillError::SystemError(format!(
                "failed to spawn {}: {e}",
                spec.program.display()
            ))
        })?;

        let start = Instant::now();
        let status = loop {
            if self.cancel.load(Ordering::Relaxed) {
                let _ = child.kill();
                let _ = child.wait();
                return Err(InstillError::Interrupted);
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(InstillError::Timeout {
                            seconds: timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(InstillError::SystemError(format!(
                        "failed to wait for {}: {e}",
                        spec.program.display()
                    )));
                }
            }
        };

        let tail = match capture {
            Some(file) => read_tail(file, self.tail_lines)?,
            None => Vec::new(),
        };

        Ok(CommandOutput {
            exit_code: status.code(),
            tail,
        })
    }
}

fn read_tail(mut file: std::fs::File, limit: usize) -> Result<Vec<String>> {
    file.seek(SeekFrom::Start(0))?;
    let reader = BufReader::new(file);
    let mut tail: VecDeque<String> = VecDeque::with_capacity(limit);
    for line in reader.lines() {
        let line = line?;
        if tail.len() == limit {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Ok(tail.into())
}
