// src/exec/monitor.rs

//! Deadline-driven capture of a long-running serial monitor process.
//!
//! Unlike [`crate::exec::command`], completion is decided by the wall clock,
//! not by process exit: the monitor is expected to run forever, so we read
//! whatever arrives until the deadline, stop the child, and judge the
//! accumulated output.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::exec::stream::{BannerFilter, ChunkDecoder, StreamAccumulator};
use crate::exec::terminate::terminate_in_background;
use crate::types::{ExecutionResult, MonitorMethod};

const READ_BUF_SIZE: usize = 4096;

/// One monitor invocation.
#[derive(Debug, Clone)]
pub struct MonitorRequest {
    /// Executable spawned directly, without a shell, so paths containing
    /// spaces need no quoting.
    pub program: PathBuf,
    pub args: Vec<String>,
    pub port: String,
    pub baud: u32,
    pub timeout_secs: u64,
    pub method: MonitorMethod,
    pub filter: BannerFilter,
}

impl MonitorRequest {
    /// `<program> monitor -p <port> --config baudrate=<baud>`, filtering
    /// according to `method`.
    pub fn serial(
        program: impl Into<PathBuf>,
        port: impl Into<String>,
        baud: u32,
        timeout_secs: u64,
        method: MonitorMethod,
        banners: Vec<String>,
    ) -> Self {
        let port = port.into();
        Self {
            program: program.into(),
            args: vec![
                "monitor".to_string(),
                "-p".to_string(),
                port.clone(),
                "--config".to_string(),
                format!("baudrate={baud}"),
            ],
            port,
            baud,
            timeout_secs: timeout_secs.max(1),
            method,
            filter: BannerFilter::new(banners, method.filters_banners()),
        }
    }

    /// Arbitrary program and arguments; used for scripted sources.
    pub fn custom(
        program: impl Into<PathBuf>,
        args: Vec<String>,
        baud: u32,
        timeout_secs: u64,
        method: MonitorMethod,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            port: String::new(),
            baud,
            timeout_secs: timeout_secs.max(1),
            method,
            filter: if method.filters_banners() {
                BannerFilter::standard()
            } else {
                BannerFilter::disabled()
            },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Streaming process monitor. Stateless: every call owns its own child and
/// accumulator, so concurrent calls never share buffers.
#[derive(Debug, Clone)]
pub struct StreamingMonitor {
    termination_grace: Duration,
}

impl StreamingMonitor {
    pub fn new(termination_grace: Duration) -> Self {
        Self { termination_grace }
    }

    /// Run the monitor until the request's deadline. Never fails.
    pub async fn monitor(&self, request: &MonitorRequest) -> ExecutionResult {
        info!(
            program = %request.program.display(),
            port = %request.port,
            baud = request.baud,
            timeout_secs = request.timeout_secs,
            method = %request.method,
            "starting monitor"
        );

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    program = %request.program.display(),
                    error = %e,
                    "failed to spawn monitor"
                );
                return ExecutionResult::spawn_failed(&e).with_method(request.method);
            }
        };

        // Keep stdin open for the whole session; some monitors exit on EOF.
        let _stdin = child.stdin.take();

        let acc = collect_until_deadline(&mut child, request.timeout(), &request.filter).await;

        debug!(port = %request.port, "deadline reached; stopping monitor process");
        terminate_in_background(child, self.termination_grace);

        let result = acc.into_result(request.method, request.baud, request.timeout_secs);
        info!(
            port = %request.port,
            success = result.success,
            bytes = result.stdout.len(),
            "monitor finished"
        );
        result
    }
}

async fn collect_until_deadline(
    child: &mut Child,
    timeout: Duration,
    filter: &BannerFilter,
) -> StreamAccumulator {
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();

    let mut out_buf = [0u8; READ_BUF_SIZE];
    let mut err_buf = [0u8; READ_BUF_SIZE];
    let mut out_decoder = ChunkDecoder::new();
    let mut err_decoder = ChunkDecoder::new();
    let mut acc = StreamAccumulator::new();

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,

            read = read_some(&mut stdout, &mut out_buf), if stdout.is_some() => match read {
                Ok(n) if n > 0 => {
                    let chunk = out_decoder.decode(&out_buf[..n]);
                    if !chunk.is_empty() {
                        debug!(chunk = %chunk.trim_end(), "monitor stdout");
                        acc = acc.absorb_stdout(&chunk, filter);
                    }
                }
                other => {
                    if let Err(e) = other {
                        debug!(error = %e, "monitor stdout read failed");
                    }
                    let rest = out_decoder.finish();
                    if !rest.is_empty() {
                        acc = acc.absorb_stdout(&rest, filter);
                    }
                    stdout = None;
                }
            },

            read = read_some(&mut stderr, &mut err_buf), if stderr.is_some() => match read {
                Ok(n) if n > 0 => {
                    let chunk = err_decoder.decode(&err_buf[..n]);
                    debug!(chunk = %chunk.trim_end(), "monitor stderr");
                    acc = acc.absorb_stderr(&chunk);
                }
                other => {
                    if let Err(e) = other {
                        debug!(error = %e, "monitor stderr read failed");
                    }
                    let rest = err_decoder.finish();
                    acc = acc.absorb_stderr(&rest);
                    stderr = None;
                }
            },
        }
    }

    acc
}

async fn read_some<R: AsyncRead + Unpin>(
    pipe: &mut Option<R>,
    buf: &mut [u8],
) -> io::Result<usize> {
    match pipe {
        Some(pipe) => pipe.read(buf).await,
        None => std::future::pending().await,
    }
}
