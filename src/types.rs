use std::fmt;

use serde::Serialize;

/// Uniform outcome of every toolchain invocation.
///
/// Field names are stable regardless of which component produced the result,
/// so callers can serialize it without caring whether it came from the
/// command executor or the serial monitor:
///
/// ```json
/// { "success": false, "stdout": "", "stderr": "Command timed out", "error": "Timeout" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,

    /// Human-readable failure description; absent on success.
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Set only by the serial monitor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<MonitorMethod>,
}

/// Sentinel `error` value for a command that exceeded its budget.
pub const TIMEOUT_ERROR: &str = "Timeout";

/// Sentinel `stderr` value for a command that exceeded its budget.
pub const TIMEOUT_STDERR: &str = "Command timed out";

impl ExecutionResult {
    pub fn succeeded(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: stderr.into(),
            error_message: None,
            method: None,
        }
    }

    pub fn failed(
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            success: false,
            stdout: stdout.into(),
            stderr: stderr.into(),
            error_message,
            method: None,
        }
    }

    /// The fixed shape reported when the deadline fires before the process
    /// exits. Partial output is discarded.
    pub fn timed_out() -> Self {
        Self::failed("", TIMEOUT_STDERR, Some(TIMEOUT_ERROR.to_string()))
    }

    /// The process could not be started at all (binary missing, permission
    /// denied, ...).
    pub fn spawn_failed(err: &std::io::Error) -> Self {
        let message = format!("Spawn error: {err}");
        Self::failed("", message.clone(), Some(message))
    }

    pub fn with_method(mut self, method: MonitorMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn is_timeout(&self) -> bool {
        !self.success && self.error_message.as_deref() == Some(TIMEOUT_ERROR)
    }
}

/// Which serial-monitor flavour produced a result.
///
/// - `Regular`: banner lines emitted by the toolchain (connection messages,
///   key hints, port settings) are dropped before accumulation.
/// - `Direct`: every chunk is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MonitorMethod {
    #[serde(rename = "regular-monitor")]
    Regular,
    #[serde(rename = "direct-spawn")]
    Direct,
}

impl MonitorMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            MonitorMethod::Regular => "regular-monitor",
            MonitorMethod::Direct => "direct-spawn",
        }
    }

    /// Default filtering policy for this flavour.
    pub fn filters_banners(self) -> bool {
        matches!(self, MonitorMethod::Regular)
    }

    /// Message reported when the deadline passes without any usable output.
    pub fn no_data_message(self, baud: u32, timeout_secs: u64) -> String {
        match self {
            MonitorMethod::Regular => {
                format!("No data received at {baud} baud in {timeout_secs}s")
            }
            MonitorMethod::Direct => {
                format!("No data via direct spawn method at {baud} baud in {timeout_secs}s")
            }
        }
    }
}

impl fmt::Display for MonitorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
