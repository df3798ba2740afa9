// src/bridge.rs

//! Toolchain operations as the front end sees them.
//!
//! `Bridge` turns operator intents (list boards, compile this sketch, watch
//! that port) into toolchain command lines, hands them to a
//! [`ToolchainBackend`], and keeps the session context and sketch folders up
//! to date along the way.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::context::{ContextSnapshot, SessionContext};
use crate::errors::{BridgeError, Result};
use crate::exec::{ExecutionRequest, MonitorRequest, ProcessBackend, ToolchainBackend};
use crate::fs::{FileSystem, RealFileSystem};
use crate::sketchbook::store::{sketch_file, validate_sketch_name};
use crate::sketchbook::{
    DiscoveredSketchbook, LoadedSketch, PreferredDirectory, SaveLocation, SavedSketch,
    SketchEntry, SketchStore, SketchbookLocator,
};
use crate::types::{ExecutionResult, MonitorMethod};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub toolchain_available: bool,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    pub success: bool,
    pub config: String,
    pub sketchbook_path: String,
    pub preferred_sketch_directory: PathBuf,
    pub is_arduino_sketchbook: bool,
}

pub struct Bridge {
    config: BridgeConfig,
    backend: Arc<dyn ToolchainBackend>,
    sketchbook: SketchbookLocator,
    store: SketchStore,
    context: SessionContext,
}

impl Bridge {
    pub fn new(
        config: BridgeConfig,
        backend: Arc<dyn ToolchainBackend>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let sketchbook = SketchbookLocator::new(fs.clone(), config.sketchbook.effective_home());
        let store = SketchStore::new(fs, config.sketchbook.local_dir.clone());
        Self {
            config,
            backend,
            sketchbook,
            store,
            context: SessionContext::new(),
        }
    }

    /// Production wiring: real processes, real filesystem.
    pub fn from_config(config: BridgeConfig) -> Self {
        let backend = Arc::new(ProcessBackend::from_config(&config));
        Self::new(config, backend, Arc::new(RealFileSystem))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn sketchbook(&self) -> &SketchbookLocator {
        &self.sketchbook
    }

    pub fn store(&self) -> &SketchStore {
        &self.store
    }

    pub fn context(&self) -> ContextSnapshot {
        self.context.snapshot()
    }

    fn command_line(&self, subcommand: &str) -> String {
        format!("{} {}", self.config.toolchain.binary, subcommand)
    }

    async fn run(&self, subcommand: &str, timeout_ms: u64) -> ExecutionResult {
        let request = ExecutionRequest::new(self.command_line(subcommand), timeout_ms);
        self.backend.execute(request).await
    }

    pub async fn board_list(&self) -> ExecutionResult {
        self.run("board list", self.config.timeouts.default_ms).await
    }

    pub async fn board_list_all(&self) -> ExecutionResult {
        self.run("board listall", self.config.timeouts.default_ms).await
    }

    pub async fn core_list(&self) -> ExecutionResult {
        self.run("core list", self.config.timeouts.default_ms).await
    }

    pub async fn lib_list(&self) -> ExecutionResult {
        self.run("lib list", self.config.timeouts.default_ms).await
    }

    pub async fn lib_install(&self, library: &str) -> ExecutionResult {
        let sub = format!("lib install \"{library}\"");
        self.run(&sub, self.config.timeouts.default_ms).await
    }

    pub async fn version(&self) -> ExecutionResult {
        self.run("version", self.config.timeouts.default_ms).await
    }

    pub async fn config_dump(&self) -> ExecutionResult {
        self.run("config dump", self.config.timeouts.default_ms).await
    }

    pub async fn health(&self) -> HealthReport {
        let result = self.version().await;
        HealthReport {
            status: "OK",
            toolchain_available: result.success,
            version: result.stdout,
        }
    }

    /// Run external sketchbook discovery and cache the outcome. Intended to
    /// run once at startup.
    pub async fn discover_sketchbook(&self) -> Option<DiscoveredSketchbook> {
        let config_dump = ExecutionRequest::new(
            self.command_line("config dump"),
            self.config.timeouts.default_ms,
        );
        self.sketchbook
            .discover_external_configuration(self.backend.as_ref(), config_dump)
            .await
    }

    pub fn preferred_directory(&self) -> PreferredDirectory {
        self.sketchbook.resolve_preferred_directory()
    }

    pub async fn config_report(&self) -> ConfigReport {
        let dump = self.config_dump().await;
        let preferred = self.preferred_directory();
        ConfigReport {
            success: true,
            config: if dump.success {
                dump.stdout
            } else {
                "Config not available".to_string()
            },
            sketchbook_path: self
                .sketchbook
                .discovered()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "Not found".to_string()),
            is_arduino_sketchbook: preferred.is_arduino_sketchbook(),
            preferred_sketch_directory: preferred.path,
        }
    }

    /// Compile `name` from the local sketch folder, writing `code` there
    /// first when given.
    pub async fn compile(
        &self,
        fqbn: &str,
        name: &str,
        code: Option<&str>,
    ) -> Result<ExecutionResult> {
        validate_sketch_name(name)?;
        let sketch_dir = self.store.local_sketch_dir(name);

        let file = match code {
            Some(code) => self.store.write_local(name, code)?,
            None => sketch_file(self.store.local_dir(), name),
        };
        if !self.store.contains(&sketch_dir, name) {
            return Err(BridgeError::SketchNotFound(file.display().to_string()));
        }

        self.context.record_sketch(&file);
        self.context.record_board(fqbn);

        let sub = format!("compile --fqbn {fqbn} \"{}\"", sketch_dir.display());
        info!(fqbn, sketch = %sketch_dir.display(), "compiling");
        Ok(self.run(&sub, self.config.timeouts.compile_ms).await)
    }

    /// Upload `name` to the board on `port`.
    ///
    /// With `code`, the sketch is written to the local folder first.
    /// Without it, the directory of the session's current sketch is used.
    pub async fn upload(
        &self,
        fqbn: &str,
        port: &str,
        name: &str,
        code: Option<&str>,
    ) -> Result<ExecutionResult> {
        validate_sketch_name(name)?;

        let sketch_dir = match code {
            Some(code) => {
                let file = self.store.write_local(name, code)?;
                self.context.record_sketch(&file);
                self.store.local_sketch_dir(name)
            }
            None => self
                .context
                .snapshot()
                .current_sketch
                .and_then(|s| s.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| self.store.local_sketch_dir(name)),
        };

        self.context.record_target(fqbn, port);

        if !self.store.contains(&sketch_dir, name) {
            let expected = sketch_dir.join(format!("{name}.ino"));
            return Err(BridgeError::SketchNotFound(expected.display().to_string()));
        }

        let sub = format!(
            "upload -p {port} --fqbn {fqbn} \"{}\"",
            sketch_dir.display()
        );
        info!(fqbn, port, sketch = %sketch_dir.display(), "uploading");
        Ok(self.run(&sub, self.config.timeouts.upload_ms).await)
    }

    /// Capture serial output from `port` for the configured (or given)
    /// window.
    pub async fn monitor(
        &self,
        port: &str,
        baud: Option<u32>,
        timeout_secs: Option<u64>,
        method: MonitorMethod,
    ) -> ExecutionResult {
        let request = MonitorRequest::serial(
            self.backend.toolchain_program(),
            port,
            baud.unwrap_or(self.config.monitor.baud),
            timeout_secs.unwrap_or(self.config.monitor.timeout_secs),
            method,
            self.config.monitor.banners.clone(),
        );
        self.backend.monitor(request).await
    }

    pub fn save_sketch(
        &self,
        name: &str,
        code: &str,
        location: SaveLocation,
    ) -> Result<SavedSketch> {
        let saved = match location {
            SaveLocation::Preferred => {
                let preferred = self.preferred_directory();
                self.store.save_preferred(name, code, &preferred)?
            }
            SaveLocation::Local => self.store.save_local(name, code)?,
        };
        self.context.record_sketch(&saved.path);
        Ok(saved)
    }

    pub fn list_sketches(&self) -> Vec<SketchEntry> {
        let preferred = self.preferred_directory();
        self.store.list(&preferred)
    }

    pub fn load_sketch(&self, name: &str) -> Result<Option<LoadedSketch>> {
        let preferred = self.preferred_directory();
        let loaded = self.store.load(name, &preferred)?;
        match &loaded {
            Some(sketch) => self.context.record_sketch(&sketch.path),
            None => debug!(name, "sketch not found"),
        }
        Ok(loaded)
    }

    /// Create the local sketch folder. Called once at startup.
    pub fn prepare(&self) -> Result<()> {
        self.store.ensure_local_dir()
    }
}
