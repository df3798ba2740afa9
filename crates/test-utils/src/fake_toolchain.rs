use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use sketchbridge::exec::{BackendFuture, ExecutionRequest, MonitorRequest, ToolchainBackend};
use sketchbridge::types::ExecutionResult;

/// A fake toolchain that:
/// - answers command lines from a script, matched by prefix
/// - records every executed command line and monitor request
/// - reports a generic failure for anything unscripted.
#[derive(Clone, Default)]
pub struct FakeToolchain {
    responses: Arc<Mutex<Vec<(String, ExecutionResult)>>>,
    monitor_response: Arc<Mutex<Option<ExecutionResult>>>,
    executed: Arc<Mutex<Vec<ExecutionRequest>>>,
    monitored: Arc<Mutex<Vec<MonitorRequest>>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer any command line starting with `prefix` with `result`.
    /// Earlier scripts win over later ones.
    pub fn respond(self, prefix: &str, result: ExecutionResult) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push((prefix.to_string(), result));
        self
    }

    pub fn respond_ok(self, prefix: &str, stdout: &str) -> Self {
        self.respond(prefix, ExecutionResult::succeeded(stdout, ""))
    }

    pub fn respond_monitor(self, result: ExecutionResult) -> Self {
        *self.monitor_response.lock().unwrap() = Some(result);
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.command_line.clone())
            .collect()
    }

    pub fn executed_requests(&self) -> Vec<ExecutionRequest> {
        self.executed.lock().unwrap().clone()
    }

    pub fn monitored(&self) -> Vec<MonitorRequest> {
        self.monitored.lock().unwrap().clone()
    }
}

impl ToolchainBackend for FakeToolchain {
    fn execute(&self, request: ExecutionRequest) -> BackendFuture<'_> {
        Box::pin(async move {
            let scripted = self
                .responses
                .lock()
                .unwrap()
                .iter()
                .find(|(prefix, _)| request.command_line.starts_with(prefix.as_str()))
                .map(|(_, result)| result.clone());

            let result = scripted.unwrap_or_else(|| {
                ExecutionResult::failed(
                    "",
                    "unscripted command",
                    Some(format!("unscripted command: {}", request.command_line)),
                )
            });
            self.executed.lock().unwrap().push(request);
            result
        })
    }

    fn monitor(&self, request: MonitorRequest) -> BackendFuture<'_> {
        Box::pin(async move {
            let method = request.method;
            let result = self
                .monitor_response
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| {
                    ExecutionResult::failed(
                        "",
                        method.no_data_message(request.baud, request.timeout_secs),
                        Some(method.no_data_message(request.baud, request.timeout_secs)),
                    )
                })
                .with_method(method);
            self.monitored.lock().unwrap().push(request);
            result
        })
    }

    fn toolchain_program(&self) -> PathBuf {
        PathBuf::from("arduino-cli")
    }
}
