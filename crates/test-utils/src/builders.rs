#![allow(dead_code)]

use std::path::PathBuf;

use sketchbridge::config::{BridgeConfig, RawBridgeConfig};

/// Builder for `BridgeConfig` to simplify test setup.
///
/// Starts from defaults with `home` pinned to `/home/test` and a relative
/// `sketches` local folder, so nothing depends on the machine running tests.
pub struct BridgeConfigBuilder {
    config: RawBridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn new() -> Self {
        let mut config = RawBridgeConfig::default();
        config.sketchbook.home = Some(PathBuf::from("/home/test"));
        Self { config }
    }

    pub fn home(mut self, home: impl Into<PathBuf>) -> Self {
        self.config.sketchbook.home = Some(home.into());
        self
    }

    pub fn local_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.sketchbook.local_dir = dir.into();
        self
    }

    pub fn binary(mut self, binary: &str) -> Self {
        self.config.toolchain.binary = binary.to_string();
        self
    }

    pub fn bundle_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.toolchain.bundle_dir = Some(dir.into());
        self
    }

    pub fn termination_grace_ms(mut self, ms: u64) -> Self {
        self.config.toolchain.termination_grace_ms = ms;
        self
    }

    pub fn default_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.default_ms = ms;
        self
    }

    pub fn compile_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.compile_ms = ms;
        self
    }

    pub fn upload_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.upload_ms = ms;
        self
    }

    pub fn baud(mut self, baud: u32) -> Self {
        self.config.monitor.baud = baud;
        self
    }

    pub fn monitor_timeout_secs(mut self, secs: u64) -> Self {
        self.config.monitor.timeout_secs = secs;
        self
    }

    pub fn banner(mut self, banner: &str) -> Self {
        self.config.monitor.banners.push(banner.to_string());
        self
    }

    pub fn raw(self) -> RawBridgeConfig {
        self.config
    }

    pub fn build(self) -> BridgeConfig {
        BridgeConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for BridgeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
