//! Worker pool and dispatcher.
//!
//! The dispatcher pushes rows into a bounded distribution channel whose
//! capacity equals the worker count, so ingestion never runs further ahead of
//! the pool than one row per worker. Once the source is exhausted it sends one
//! `Shutdown` per worker and joins them all. A worker that receives `Shutdown`
//! returns immediately and never receives again, so each worker consumes
//! exactly one sentinel.

use crate::argv;
use crate::error::{LittlejohnError, Result};
use crate::rows::{ParameterNames, Row};
use crate::runner::Launcher;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Message on the distribution channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Row(Row),
    /// Tells exactly one worker to stop.
    Shutdown,
}

/// Invocation template shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct Template {
    pub command: String,
    pub fixed_args: Vec<String>,
    pub names: ParameterNames,
}

/// Counters for a run, summed across workers at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Rows pushed into the pool by the dispatcher.
    pub rows: u64,
    /// Rows handed to the launcher.
    pub invocations: u64,
    /// Rows dropped for arity mismatch.
    pub skipped: u64,
    /// Invocations whose launcher reported failure.
    pub failed: u64,
    /// Lines the launchers sent to the aggregation channel.
    pub lines: u64,
}

impl PoolStats {
    fn merge(&mut self, other: PoolStats) {
        self.rows += other.rows;
        self.invocations += other.invocations;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.lines += other.lines;
    }
}

/// A fixed set of worker threads fed through one bounded channel.
pub struct WorkerPool {
    distribution: Sender<Message>,
    workers: Vec<JoinHandle<PoolStats>>,
    submitted: u64,
}

impl WorkerPool {
    /// Spawn `size` workers. Each holds its own clone of the output sender.
    pub fn spawn(
        size: usize,
        template: Arc<Template>,
        launcher: Arc<dyn Launcher>,
        output: &Sender<String>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(LittlejohnError::UserError(
                "worker count must be at least 1".to_string(),
            ));
        }

        let (distribution, inbox) = bounded(size);
        let mut workers = Vec::with_capacity(size);

        for id in 0..size {
            let inbox = inbox.clone();
            let template = Arc::clone(&template);
            let launcher = Arc::clone(&launcher);
            let output = output.clone();

            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || worker_loop(id, &inbox, &template, launcher.as_ref(), &output))
                .map_err(|e| {
                    LittlejohnError::InternalError(format!("failed to spawn worker {}: {}", id, e))
                })?;
            workers.push(handle);
        }

        Ok(Self {
            distribution,
            workers,
            submitted: 0,
        })
    }

    /// Queue one row, blocking while every worker is busy and the channel is full.
    pub fn submit(&mut self, row: Row) -> Result<()> {
        self.distribution.send(Message::Row(row)).map_err(|_| {
            LittlejohnError::InternalError(
                "all workers exited before input was exhausted".to_string(),
            )
        })?;
        self.submitted += 1;
        Ok(())
    }

    /// Send one sentinel per worker and wait for every worker to terminate.
    pub fn shutdown(self) -> Result<PoolStats> {
        let mut stats = PoolStats {
            rows: self.submitted,
            ..PoolStats::default()
        };

        for _ in 0..self.workers.len() {
            // A send failure means every worker is already gone; the joins
            // below report why.
            if self.distribution.send(Message::Shutdown).is_err() {
                break;
            }
        }

        let mut panicked = Vec::new();
        for (id, handle) in self.workers.into_iter().enumerate() {
            match handle.join() {
                Ok(worker_stats) => stats.merge(worker_stats),
                Err(_) => {
                    tracing::error!(worker = id, "worker panicked");
                    panicked.push(id);
                }
            }
        }

        if !panicked.is_empty() {
            return Err(LittlejohnError::InternalError(format!(
                "worker(s) {:?} panicked",
                panicked
            )));
        }

        Ok(stats)
    }
}

/// Drain `rows` into a fresh pool of `size` workers and shut it down.
pub fn dispatch<I>(
    rows: I,
    size: usize,
    template: Arc<Template>,
    launcher: Arc<dyn Launcher>,
    output: &Sender<String>,
) -> Result<PoolStats>
where
    I: IntoIterator<Item = Row>,
{
    let mut pool = WorkerPool::spawn(size, template, launcher, output)?;

    for row in rows {
        if let Err(e) = pool.submit(row) {
            // Still join whatever is left so the real cause surfaces.
            pool.shutdown()?;
            return Err(e);
        }
    }

    pool.shutdown()
}

fn worker_loop(
    id: usize,
    inbox: &Receiver<Message>,
    template: &Template,
    launcher: &dyn Launcher,
    output: &Sender<String>,
) -> PoolStats {
    let mut stats = PoolStats::default();

    loop {
        let row = match inbox.recv() {
            Ok(Message::Row(row)) => row,
            Ok(Message::Shutdown) => break,
            // Dispatcher vanished without sending our sentinel.
            Err(_) => break,
        };

        let argv = match argv::build(
            &template.command,
            &template.fixed_args,
            &template.names,
            &row,
        ) {
            Ok(argv) => argv,
            Err(e) => {
                tracing::warn!(
                    worker = id,
                    row = ?row,
                    names = ?template.names,
                    "skipping row: {}",
                    e
                );
                stats.skipped += 1;
                continue;
            }
        };

        stats.invocations += 1;
        let report = launcher.launch(&argv, output);
        stats.lines += report.lines;
        if !report.succeeded {
            stats.failed += 1;
        }
    }

    tracing::debug!(worker = id, invocations = stats.invocations, "worker terminated");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argv::ArgumentVector;
    use crate::runner::RunReport;
    use crossbeam_channel::unbounded;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records every argv and tracks how many launches overlap.
    #[derive(Default)]
    struct RecordingLauncher {
        seen: Mutex<Vec<Vec<String>>>,
        active: AtomicUsize,
        peak: AtomicUsize,
        hold: Duration,
        lines_per_run: u64,
    }

    impl RecordingLauncher {
        fn holding(hold: Duration) -> Self {
            Self {
                hold,
                ..Self::default()
            }
        }

        fn seen(&self) -> Vec<Vec<String>> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, argv: &ArgumentVector, sink: &Sender<String>) -> RunReport {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            self.seen.lock().unwrap().push(argv.as_slice().to_vec());
            for index in 0..self.lines_per_run {
                sink.send(format!("{}, {}, line", argv.joined(), index)).unwrap();
            }
            if !self.hold.is_zero() {
                thread::sleep(self.hold);
            }

            self.active.fetch_sub(1, Ordering::SeqCst);
            RunReport {
                lines: self.lines_per_run,
                succeeded: true,
            }
        }
    }

    fn template(names: &[&str]) -> Arc<Template> {
        Arc::new(Template {
            command: "echo".to_string(),
            fixed_args: vec!["hello".to_string()],
            names: names.iter().map(|s| s.to_string()).collect::<Vec<_>>().into(),
        })
    }

    fn rows(count: usize) -> Vec<Row> {
        (0..count)
            .map(|i| vec![format!("user{}", i), i.to_string()])
            .collect()
    }

    #[test]
    fn test_every_row_is_invoked_once_for_any_worker_count() {
        for workers in [1, 2, 4, 7] {
            let launcher = Arc::new(RecordingLauncher::default());
            let (tx, _rx) = unbounded();

            let stats = dispatch(
                rows(25),
                workers,
                template(&["name", "count"]),
                launcher.clone(),
                &tx,
            )
            .unwrap();

            assert_eq!(stats.rows, 25);
            assert_eq!(stats.invocations, 25);
            assert_eq!(stats.skipped, 0);

            let mut seen: Vec<String> = launcher
                .seen()
                .into_iter()
                .map(|argv| argv[3].clone())
                .collect();
            seen.sort();
            let mut expected: Vec<String> = (0..25).map(|i| format!("user{}", i)).collect();
            expected.sort();
            assert_eq!(seen, expected, "workers = {}", workers);
        }
    }

    #[test]
    fn test_workers_build_expected_argv() {
        let launcher = Arc::new(RecordingLauncher::default());
        let (tx, _rx) = unbounded();
        let input = vec![vec!["alice".to_string(), "3".to_string()]];

        dispatch(input, 2, template(&["name", "count"]), launcher.clone(), &tx).unwrap();

        assert_eq!(
            launcher.seen(),
            vec![vec!["echo", "hello", "name", "alice", "count", "3"]]
        );
    }

    #[test]
    fn test_arity_mismatch_is_skipped_not_fatal() {
        let launcher = Arc::new(RecordingLauncher::default());
        let (tx, _rx) = unbounded();
        let input = vec![
            vec!["alice".to_string(), "3".to_string()],
            vec!["bob".to_string()],
            vec!["carol".to_string(), "5".to_string(), "extra".to_string()],
            vec!["dave".to_string(), "6".to_string()],
        ];

        let stats =
            dispatch(input, 3, template(&["name", "count"]), launcher.clone(), &tx).unwrap();

        assert_eq!(stats.rows, 4);
        assert_eq!(stats.invocations, 2);
        assert_eq!(stats.skipped, 2);
        assert_eq!(launcher.seen().len(), 2);
    }

    #[test]
    fn test_empty_input_terminates() {
        let launcher = Arc::new(RecordingLauncher::default());
        let (tx, _rx) = unbounded();

        let stats =
            dispatch(Vec::<Row>::new(), 4, template(&["a"]), launcher.clone(), &tx).unwrap();

        assert_eq!(stats, PoolStats::default());
        assert!(launcher.seen().is_empty());
    }

    #[test]
    fn test_single_worker_runs_sequentially() {
        let launcher = Arc::new(RecordingLauncher::holding(Duration::from_millis(5)));
        let (tx, _rx) = unbounded();

        dispatch(rows(8), 1, template(&["name", "count"]), launcher.clone(), &tx).unwrap();

        assert_eq!(launcher.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrency_never_exceeds_worker_count() {
        let launcher = Arc::new(RecordingLauncher::holding(Duration::from_millis(10)));
        let (tx, _rx) = unbounded();

        dispatch(rows(30), 3, template(&["name", "count"]), launcher.clone(), &tx).unwrap();

        let peak = launcher.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak concurrency was {}", peak);
        assert_eq!(launcher.active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_more_workers_than_rows() {
        let launcher = Arc::new(RecordingLauncher::default());
        let (tx, _rx) = unbounded();

        let stats =
            dispatch(rows(2), 16, template(&["name", "count"]), launcher.clone(), &tx).unwrap();

        assert_eq!(stats.invocations, 2);
    }

    #[test]
    fn test_output_lines_are_counted() {
        let launcher = Arc::new(RecordingLauncher {
            lines_per_run: 3,
            ..RecordingLauncher::default()
        });
        let (tx, rx) = unbounded();

        let stats = dispatch(rows(5), 2, template(&["name", "count"]), launcher, &tx).unwrap();
        drop(tx);

        assert_eq!(stats.lines, 15);
        assert_eq!(rx.iter().count(), 15);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let launcher = Arc::new(RecordingLauncher::default());
        let (tx, _rx) = unbounded();

        let err = dispatch(rows(1), 0, template(&["name", "count"]), launcher, &tx).unwrap_err();
        assert!(matches!(err, LittlejohnError::UserError(_)));
    }

    #[test]
    fn test_worker_stops_after_its_sentinel() {
        let (tx, rx) = bounded(4);
        let (out_tx, _out_rx) = unbounded();
        let launcher = RecordingLauncher::default();
        let tpl = template(&["name", "count"]);

        tx.send(Message::Row(vec!["a".to_string(), "1".to_string()])).unwrap();
        tx.send(Message::Shutdown).unwrap();
        tx.send(Message::Row(vec!["b".to_string(), "2".to_string()])).unwrap();

        let stats = worker_loop(0, &rx, &tpl, &launcher, &out_tx);

        assert_eq!(stats.invocations, 1);
        // The row queued after the sentinel is left for another worker.
        assert_eq!(rx.try_recv().unwrap(), Message::Row(vec!["b".to_string(), "2".to_string()]));
    }

    #[test]
    fn test_panicking_launcher_is_internal_error() {
        struct Panics;
        impl Launcher for Panics {
            fn launch(&self, _argv: &ArgumentVector, _sink: &Sender<String>) -> RunReport {
                panic!("launcher blew up");
            }
        }

        let (tx, _rx) = unbounded();
        let err =
            dispatch(rows(1), 1, template(&["name", "count"]), Arc::new(Panics), &tx).unwrap_err();
        assert!(matches!(err, LittlejohnError::InternalError(_)));
    }
}
