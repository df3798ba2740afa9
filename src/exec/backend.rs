// src/exec/backend.rs

//! Pluggable toolchain backend abstraction.
//!
//! Higher layers (sketchbook discovery, [`crate::bridge::Bridge`]) talk
//! to a `ToolchainBackend` instead of spawning processes themselves. This
//! makes it easy to swap in a scripted fake in tests while keeping the
//! production implementation in [`command`](super::command) and
//! [`monitor`](super::monitor).

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::config::BridgeConfig;
use crate::exec::command::{CommandExecutor, ExecutionRequest};
use crate::exec::locator::ToolchainLocator;
use crate::exec::monitor::{MonitorRequest, StreamingMonitor};
use crate::types::ExecutionResult;

pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = ExecutionResult> + Send + 'a>>;

/// Trait abstracting how toolchain invocations are carried out.
///
/// Both methods are infallible by contract: failures are encoded in the
/// returned [`ExecutionResult`].
pub trait ToolchainBackend: Send + Sync {
    fn execute(&self, request: ExecutionRequest) -> BackendFuture<'_>;

    fn monitor(&self, request: MonitorRequest) -> BackendFuture<'_>;

    /// Program to spawn for direct (shell-less) toolchain invocations.
    fn toolchain_program(&self) -> PathBuf;
}

/// Real backend used in production: spawns OS processes.
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    locator: ToolchainLocator,
    executor: CommandExecutor,
    monitor: StreamingMonitor,
}

impl ProcessBackend {
    pub fn new(locator: ToolchainLocator, termination_grace: std::time::Duration) -> Self {
        Self {
            executor: CommandExecutor::new(locator.clone(), termination_grace),
            monitor: StreamingMonitor::new(termination_grace),
            locator,
        }
    }

    pub fn from_config(cfg: &BridgeConfig) -> Self {
        Self::new(
            ToolchainLocator::from_config(&cfg.toolchain),
            cfg.toolchain.termination_grace(),
        )
    }
}

impl ToolchainBackend for ProcessBackend {
    fn execute(&self, request: ExecutionRequest) -> BackendFuture<'_> {
        Box::pin(async move { self.executor.execute(&request).await })
    }

    fn monitor(&self, request: MonitorRequest) -> BackendFuture<'_> {
        Box::pin(async move { self.monitor.monitor(&request).await })
    }

    fn toolchain_program(&self) -> PathBuf {
        self.locator.program()
    }
}
