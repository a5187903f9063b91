//! Child process execution.
//!
//! Runs one argument vector as a subprocess, streams its standard output line
//! by line into the aggregation channel and reaps it. Standard error is
//! inherited from the parent untouched. Failures are logged and end only the
//! invocation they belong to.

use crate::argv::ArgumentVector;
use crossbeam_channel::Sender;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// One line of child output, tagged with the argv that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLine<'a> {
    /// Argument vector joined with ", ".
    pub argv: &'a str,
    /// Zero-based index of this line within the child's output.
    pub index: u64,
    pub text: &'a str,
}

impl fmt::Display for ResultLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.argv, self.index, self.text)
    }
}

/// What happened to a single invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Lines handed to the aggregation channel.
    pub lines: u64,
    /// False if launch, read, wait failed or the child exited non-zero.
    pub succeeded: bool,
}

#[derive(Error, Debug)]
enum ProcessError {
    #[error("failed to launch: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to open output pipe")]
    MissingStdout,

    #[error("failed reading output: {0}")]
    Read(#[source] io::Error),

    #[error("failed to wait: {0}")]
    Wait(#[source] io::Error),

    #[error("exited with {0}")]
    Exit(ExitStatus),

    #[error("output channel closed")]
    SinkClosed,
}

/// Per-row execution strategy used by pool workers.
pub trait Launcher: Send + Sync {
    /// Execute one argument vector, sending any output lines to `sink`.
    fn launch(&self, argv: &ArgumentVector, sink: &Sender<String>) -> RunReport;
}

/// Runs each argument vector as a real subprocess.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, argv: &ArgumentVector, sink: &Sender<String>) -> RunReport {
        run(argv, sink)
    }
}

/// Prints each argument vector instead of executing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunLauncher;

impl Launcher for DryRunLauncher {
    fn launch(&self, argv: &ArgumentVector, sink: &Sender<String>) -> RunReport {
        match sink.send(argv.to_shell_string()) {
            Ok(()) => RunReport {
                lines: 1,
                succeeded: true,
            },
            Err(_) => RunReport::default(),
        }
    }
}

/// Run one subprocess to completion, emitting a result line per stdout line.
///
/// Never fails: errors are logged and whatever output was already sent stays
/// in the stream.
pub fn run(argv: &ArgumentVector, sink: &Sender<String>) -> RunReport {
    let mut report = RunReport::default();

    tracing::debug!(argv = %argv.to_shell_string(), "launching");
    match execute(argv, sink, &mut report.lines) {
        Ok(()) => report.succeeded = true,
        Err(e) => {
            tracing::warn!(argv = %argv.joined(), lines = report.lines, "invocation {}", e);
        }
    }

    report
}

fn execute(
    argv: &ArgumentVector,
    sink: &Sender<String>,
    lines: &mut u64,
) -> Result<(), ProcessError> {
    let mut child = Command::new(argv.program())
        .args(argv.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(ProcessError::Spawn)?;

    // The pipe is dropped before waiting so a child still writing gets EPIPE
    // instead of blocking forever after a read failure.
    let streamed = match child.stdout.take() {
        Some(stdout) => stream_lines(stdout, &argv.joined(), sink, lines),
        None => Err(ProcessError::MissingStdout),
    };
    let status = child.wait().map_err(ProcessError::Wait);

    streamed?;
    let status = status?;
    if !status.success() {
        return Err(ProcessError::Exit(status));
    }

    Ok(())
}

fn stream_lines<R: Read>(
    output: R,
    joined: &str,
    sink: &Sender<String>,
    lines: &mut u64,
) -> Result<(), ProcessError> {
    let mut reader = BufReader::new(output);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(ProcessError::Read)?;
        if n == 0 {
            return Ok(());
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        let text = String::from_utf8_lossy(&buf);
        let line = ResultLine {
            argv: joined,
            index: *lines,
            text: &text,
        };
        sink.send(line.to_string())
            .map_err(|_| ProcessError::SinkClosed)?;
        *lines += 1;
    }
}
