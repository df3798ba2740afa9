// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// Every section and field is optional:
///
/// ```toml
/// [toolchain]
/// binary = "arduino-cli"
/// bundle_dir = "/opt/sketchbridge"
/// termination_grace_ms = 2000
///
/// [timeouts]
/// default_ms = 5000
/// compile_ms = 60000
/// upload_ms = 45000
///
/// [monitor]
/// baud = 9600
/// timeout_secs = 5
/// banners = ["Monitor port settings", "Connecting to", "Press CTRL-C"]
///
/// [sketchbook]
/// local_dir = "sketches"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBridgeConfig {
    #[serde(default)]
    pub toolchain: ToolchainSection,

    #[serde(default)]
    pub timeouts: TimeoutSection,

    #[serde(default)]
    pub monitor: MonitorSection,

    #[serde(default)]
    pub sketchbook: SketchbookSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawBridgeConfig>`
/// (see `validate.rs`) or [`BridgeConfig::default`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub toolchain: ToolchainSection,
    pub timeouts: TimeoutSection,
    pub monitor: MonitorSection,
    pub sketchbook: SketchbookSection,
}

impl BridgeConfig {
    pub(crate) fn new_unchecked(raw: RawBridgeConfig) -> Self {
        Self {
            toolchain: raw.toolchain,
            timeouts: raw.timeouts,
            monitor: raw.monitor,
            sketchbook: raw.sketchbook,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new_unchecked(RawBridgeConfig::default())
    }
}

/// `[toolchain]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainSection {
    /// Bare name of the toolchain executable.
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Directory probed for a bundled copy of `binary`.
    ///
    /// If `None`, the directory of the running executable is used.
    #[serde(default)]
    pub bundle_dir: Option<PathBuf>,

    /// How long a child gets to exit after the graceful termination signal
    /// before it is killed outright.
    #[serde(default = "default_termination_grace_ms")]
    pub termination_grace_ms: u64,
}

fn default_binary() -> String {
    "arduino-cli".to_string()
}

fn default_termination_grace_ms() -> u64 {
    2000
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            bundle_dir: None,
            termination_grace_ms: default_termination_grace_ms(),
        }
    }
}

impl ToolchainSection {
    pub fn termination_grace(&self) -> Duration {
        Duration::from_millis(self.termination_grace_ms)
    }

    /// Effective bundle directory: the configured one, or the directory
    /// holding the current executable.
    pub fn effective_bundle_dir(&self) -> Option<PathBuf> {
        self.bundle_dir.clone().or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        })
    }
}

/// `[timeouts]` section, all in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutSection {
    /// Budget for short queries (board/core/lib listings, version, config dump).
    #[serde(default = "default_command_ms")]
    pub default_ms: u64,

    /// Compiles can download cores on first use.
    #[serde(default = "default_compile_ms")]
    pub compile_ms: u64,

    #[serde(default = "default_upload_ms")]
    pub upload_ms: u64,
}

fn default_command_ms() -> u64 {
    5000
}

fn default_compile_ms() -> u64 {
    60_000
}

fn default_upload_ms() -> u64 {
    45_000
}

impl Default for TimeoutSection {
    fn default() -> Self {
        Self {
            default_ms: default_command_ms(),
            compile_ms: default_compile_ms(),
            upload_ms: default_upload_ms(),
        }
    }
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Wall-clock capture window for one monitor invocation.
    #[serde(default = "default_monitor_timeout_secs")]
    pub timeout_secs: u64,

    /// Substrings identifying toolchain banner chunks that are dropped by the
    /// regular monitor.
    #[serde(default = "default_banners")]
    pub banners: Vec<String>,
}

fn default_baud() -> u32 {
    9600
}

fn default_monitor_timeout_secs() -> u64 {
    5
}

pub fn default_banners() -> Vec<String> {
    vec![
        "Monitor port settings".to_string(),
        "Connecting to".to_string(),
        "Press CTRL-C".to_string(),
    ]
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            baud: default_baud(),
            timeout_secs: default_monitor_timeout_secs(),
            banners: default_banners(),
        }
    }
}

/// `[sketchbook]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SketchbookSection {
    /// Project-local sketch folder used by compile/upload and as the
    /// non-preferred save location.
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// Override for the user's home directory. Discovery derives every
    /// well-known location from it.
    #[serde(default)]
    pub home: Option<PathBuf>,
}

fn default_local_dir() -> PathBuf {
    PathBuf::from("sketches")
}

impl Default for SketchbookSection {
    fn default() -> Self {
        Self {
            local_dir: default_local_dir(),
            home: None,
        }
    }
}

impl SketchbookSection {
    /// Effective home directory: the configured one, `dirs::home_dir()`, or
    /// the current directory as a last resort.
    pub fn effective_home(&self) -> PathBuf {
        self.home
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
