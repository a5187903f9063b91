//! Output aggregation.
//!
//! A single thread owns the output sink and drains the aggregation channel in
//! arrival order. Nothing else writes result lines, so lines from concurrent
//! children never interleave mid-line.

use crate::error::{LittlejohnError, Result};
use crossbeam_channel::Receiver;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::thread::{self, JoinHandle};

/// Open the configured sink: a truncating create of `path`, or stdout.
pub fn open_sink(path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                LittlejohnError::OutputError(format!(
                    "failed to open output file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Handle to the running aggregator thread.
pub struct Aggregator {
    handle: JoinHandle<Result<u64>>,
}

impl Aggregator {
    /// Start draining `lines` into `sink`.
    ///
    /// The thread runs until every sender of the channel has been dropped.
    pub fn spawn<W>(sink: W, lines: Receiver<String>) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("aggregator".to_string())
            .spawn(move || drain(sink, &lines))
            .map_err(|e| {
                LittlejohnError::InternalError(format!("failed to spawn aggregator: {}", e))
            })?;

        Ok(Self { handle })
    }

    /// Wait for the channel to close and the sink to flush.
    ///
    /// Returns the number of lines written.
    pub fn finish(self) -> Result<u64> {
        self.handle.join().map_err(|_| {
            LittlejohnError::InternalError("aggregator thread panicked".to_string())
        })?
    }
}

fn drain<W: Write>(sink: W, lines: &Receiver<String>) -> Result<u64> {
    let mut writer = BufWriter::new(sink);
    let mut written = 0u64;
    let mut failure: Option<io::Error> = None;

    for line in lines.iter() {
        // After a failed write keep receiving so producers never block on a
        // full channel.
        if failure.is_some() {
            continue;
        }
        match writeln!(writer, "{}", line) {
            Ok(()) => written += 1,
            Err(e) => {
                tracing::error!(error = %e, "failed to write output, discarding remaining lines");
                failure = Some(e);
            }
        }
    }

    if failure.is_none() {
        if let Err(e) = writer.flush() {
            failure = Some(e);
        }
    }

    match failure {
        Some(e) => Err(LittlejohnError::OutputError(format!(
            "failed to write output: {}",
            e
        ))),
        None => Ok(written),
    }
}
