// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that spawns a child process lives here, built on
//! `tokio::process::Command`:
//!
//! - [`command`] runs one non-interactive command to completion or timeout
//!   and captures its output at exit.
//! - [`monitor`] runs a long-lived serial monitor, capturing output as it
//!   streams in, and resolves on a wall-clock deadline.
//! - [`stream`] holds the pure accumulation/filtering logic the monitor
//!   folds its chunks through.
//! - [`terminate`] stops children (graceful signal, then kill), inline or on
//!   a background task.
//! - [`locator`] prefers a bundled toolchain binary over `PATH`.
//! - [`backend`] provides the `ToolchainBackend` trait and the production
//!   `ProcessBackend`; tests replace it with a scripted fake.

pub mod backend;
pub mod command;
pub mod locator;
pub mod monitor;
pub mod stream;
pub mod terminate;

pub use backend::{BackendFuture, ProcessBackend, ToolchainBackend};
pub use command::{CommandExecutor, ExecutionRequest};
pub use locator::ToolchainLocator;
pub use monitor::{MonitorRequest, StreamingMonitor};
pub use stream::{BannerFilter, ChunkDecoder, StreamAccumulator};
pub use terminate::{Termination, terminate, terminate_in_background};
