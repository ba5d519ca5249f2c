// SPDX-License-Identifier: MIT OR Apache-2.0
//! Solver process client.
//!
//! Owns the solver child process. A background thread drains its stdout
//! into a bounded channel so the pipe never fills while nobody is waiting, and
//! [`SolverClient::solve`] does a bounded wait on that channel for the
//! one response each request produces.

use crate::error::SolverError;
use crate::protocol::{self, Response, QUIT};
use parking_lot::Mutex;
use rubik_sequencer::{Move, MoveBatch};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default response timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Response lines buffered before the reader blocks
const RESPONSE_QUEUE_DEPTH: usize = 64;

/// How many stderr lines to keep for error reports
const STDERR_TAIL_LINES: usize = 16;

/// How long `close` waits for a clean exit before killing
const EXIT_GRACE: Duration = Duration::from_millis(200);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

fn default_args() -> Vec<String> {
    vec!["-c".to_string()]
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// How to launch the solver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Solver executable
    pub program: PathBuf,
    /// Arguments passed to the executable
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Response timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl SolverConfig {
    /// Config for a solver executable with default arguments
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: default_args(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Replace the arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the response timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Response timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Request/response client for a running solver process.
///
/// Requests take `&mut self`, so one client cannot have two requests in
/// flight at once.
pub struct SolverClient {
    child: Child,
    stdin: Option<ChildStdin>,
    responses: Receiver<String>,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
    stderr_reader: Option<JoinHandle<()>>,
    timeout: Duration,
    /// Responses still owed to requests that timed out
    stale: usize,
    closed: bool,
}

impl SolverClient {
    /// Start the solver process and its reader threads
    pub fn spawn(config: &SolverConfig) -> Result<Self, SolverError> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SolverError::Spawn {
                program: config.program.clone(),
                source,
            })?;

        match Self::start_readers(&mut child) {
            Ok((responses, stderr_tail, stderr_reader)) => {
                tracing::info!(
                    "Started solver {:?} (pid {})",
                    config.program,
                    child.id()
                );
                Ok(Self {
                    stdin: child.stdin.take(),
                    child,
                    responses,
                    stderr_tail,
                    stderr_reader: Some(stderr_reader),
                    timeout: config.timeout(),
                    stale: 0,
                    closed: false,
                })
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(e)
            }
        }
    }

    fn start_readers(
        child: &mut Child,
    ) -> Result<(Receiver<String>, Arc<Mutex<VecDeque<String>>>, JoinHandle<()>), SolverError>
    {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("solver stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("solver stderr not captured"))?;

        let (tx, rx) = mpsc::sync_channel(RESPONSE_QUEUE_DEPTH);
        thread::Builder::new()
            .name("solver-stdout".to_string())
            .spawn(move || read_responses(stdout, tx))?;

        let stderr_tail = Arc::new(Mutex::new(VecDeque::with_capacity(STDERR_TAIL_LINES)));
        let tail = Arc::clone(&stderr_tail);
        let stderr_reader = thread::Builder::new()
            .name("solver-stderr".to_string())
            .spawn(move || drain_stderr(stderr, &tail))?;

        Ok((rx, stderr_tail, stderr_reader))
    }

    /// Solve a raw move string with the configured timeout
    pub fn solve(&mut self, moves: &str) -> Result<MoveBatch, SolverError> {
        self.solve_with_timeout(moves, self.timeout)
    }

    /// Solve a move batch with the configured timeout
    pub fn solve_moves(&mut self, moves: &[Move]) -> Result<MoveBatch, SolverError> {
        let line = protocol::encode_request(moves);
        self.request(&line, self.timeout)
    }

    /// Solve a raw move string, waiting at most `timeout` for the answer
    pub fn solve_with_timeout(
        &mut self,
        moves: &str,
        timeout: Duration,
    ) -> Result<MoveBatch, SolverError> {
        let line = protocol::encode_raw(moves);
        self.request(&line, timeout)
    }

    fn request(&mut self, line: &str, timeout: Duration) -> Result<MoveBatch, SolverError> {
        if self.closed {
            return Err(self.exited_error());
        }

        tracing::debug!("Solver request: {}", line.trim_end());
        self.write_line(line)?;

        // A timeout too large to represent as an instant means no deadline
        let deadline = Instant::now().checked_add(timeout);
        loop {
            match self.next_response(deadline) {
                Ok(response) => {
                    if self.stale > 0 {
                        self.stale -= 1;
                        tracing::debug!("Discarding stale solver response: {response}");
                        continue;
                    }
                    tracing::debug!("Solver response: {response}");
                    return Response::parse(&response).into_moves();
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.stale += 1;
                    tracing::warn!("Solver timed out after {timeout:?}");
                    return Err(SolverError::Timeout(timeout));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!("Solver output closed");
                    return Err(self.exited_error());
                }
            }
        }
    }

    fn next_response(&self, deadline: Option<Instant>) -> Result<String, RecvTimeoutError> {
        match deadline {
            Some(deadline) => self
                .responses
                .recv_timeout(deadline.saturating_duration_since(Instant::now())),
            None => self
                .responses
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<(), SolverError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(self.exited_error());
        };
        let result = stdin
            .write_all(line.as_bytes())
            .and_then(|()| stdin.flush());
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(self.exited_error()),
            Err(e) => Err(SolverError::Io(e)),
        }
    }

    fn exited_error(&mut self) -> SolverError {
        // Give the stderr drain a moment to pick up the final lines
        if let Some(handle) = self.stderr_reader.as_ref() {
            let deadline = Instant::now() + EXIT_GRACE;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(POLL_INTERVAL);
            }
        }
        SolverError::Exited {
            stderr: self.stderr_tail(),
        }
    }

    /// Recent stderr output of the process
    pub fn stderr_tail(&self) -> Vec<String> {
        self.stderr_tail.lock().iter().cloned().collect()
    }

    /// Responses still expected for requests that timed out
    pub fn stale_responses(&self) -> usize {
        self.stale
    }

    /// Check whether the process is still alive
    pub fn is_running(&mut self) -> bool {
        !self.closed && matches!(self.child.try_wait(), Ok(None))
    }

    /// Ask the solver to quit, then terminate it.
    ///
    /// Safe to call more than once and after the process already exited.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(mut stdin) = self.stdin.take() {
            let quit = protocol::encode_raw(QUIT);
            let _ = stdin
                .write_all(quit.as_bytes())
                .and_then(|()| stdin.flush());
            // Dropping stdin closes the pipe
        }

        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::info!("Solver exited with {status}");
                    break;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(POLL_INTERVAL),
                Ok(None) => {
                    if let Err(e) = self.child.kill() {
                        tracing::debug!("Solver kill failed: {e}");
                    }
                    let _ = self.child.wait();
                    tracing::info!("Solver terminated");
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to query solver status: {e}");
                    break;
                }
            }
        }
    }
}

impl Drop for SolverClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read one line, replacing invalid UTF-8 instead of failing.
///
/// Returns `Ok(None)` at end of stream.
fn read_lossy_line(
    reader: &mut impl BufRead,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(buf);
    Ok(Some(protocol::strip_terminator(&text).to_string()))
}

fn read_responses(stdout: impl Read, tx: SyncSender<String>) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        match read_lossy_line(&mut reader, &mut buf) {
            Ok(None) => break,
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Solver stdout read error: {e}");
                break;
            }
        }
    }
    tracing::debug!("Solver stdout closed");
}

fn drain_stderr(stderr: impl Read, tail: &Mutex<VecDeque<String>>) {
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    while let Ok(Some(line)) = read_lossy_line(&mut reader, &mut buf) {
        tracing::debug!(target: "rubik_solver::stderr", "{line}");
        let mut tail = tail.lock();
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
}
