// src/lib.rs

pub mod bridge;
pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod sketchbook;
pub mod types;

use std::fs as stdfs;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::load_or_default;
use crate::sketchbook::SaveLocation;
use crate::types::{ExecutionResult, MonitorMethod};

pub use crate::bridge::{Bridge, ConfigReport, HealthReport};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the process-backed bridge
/// - one-shot sketchbook discovery
/// - dispatch of the requested command
///
/// Returns whether the command succeeded, so `main` can pick the exit code.
pub async fn run(args: CliArgs) -> Result<bool> {
    let cfg = load_or_default(&args.config)
        .with_context(|| format!("loading config from {}", args.config))?;

    let bridge = Bridge::from_config(cfg);
    bridge.prepare()?;

    if let Some(found) = bridge.discover_sketchbook().await {
        info!(path = %found.path.display(), source = %found.source, "sketchbook ready");
    }

    let json = args.json;
    match args.command {
        CliCommand::Boards { all } => {
            let result = if all {
                bridge.board_list_all().await
            } else {
                bridge.board_list().await
            };
            emit_result(&result, json)
        }
        CliCommand::Cores => emit_result(&bridge.core_list().await, json),
        CliCommand::Libs => emit_result(&bridge.lib_list().await, json),
        CliCommand::LibInstall { library } => {
            emit_result(&bridge.lib_install(&library).await, json)
        }
        CliCommand::Version => emit_result(&bridge.version().await, json),
        CliCommand::Health => {
            let report = bridge.health().await;
            if json {
                print_json(&report)?;
            } else {
                println!("status: {}", report.status);
                println!("toolchain available: {}", report.toolchain_available);
                print!("{}", report.version);
            }
            Ok(report.toolchain_available)
        }
        CliCommand::Config => {
            let report = bridge.config_report().await;
            if json {
                print_json(&report)?;
            } else {
                println!("sketchbook: {}", report.sketchbook_path);
                println!(
                    "preferred sketch directory: {} (arduino sketchbook: {})",
                    report.preferred_sketch_directory.display(),
                    report.is_arduino_sketchbook
                );
                println!();
                print!("{}", report.config);
            }
            Ok(true)
        }
        CliCommand::Compile(build) => {
            let code = read_optional(build.file.as_deref())?;
            let result = bridge
                .compile(&build.fqbn, &build.name, code.as_deref())
                .await?;
            emit_result(&result, json)
        }
        CliCommand::Upload { build, port } => {
            let code = read_optional(build.file.as_deref())?;
            let result = bridge
                .upload(&build.fqbn, &port, &build.name, code.as_deref())
                .await?;
            emit_result(&result, json)
        }
        CliCommand::Monitor {
            port,
            baud,
            timeout,
            raw,
        } => {
            let method = if raw {
                MonitorMethod::Direct
            } else {
                MonitorMethod::Regular
            };
            let result = bridge.monitor(&port, baud, timeout, method).await;
            emit_result(&result, json)
        }
        CliCommand::Save {
            name,
            file,
            preferred,
        } => {
            let code = stdfs::read_to_string(&file)
                .with_context(|| format!("reading sketch source {file}"))?;
            let location = if preferred {
                SaveLocation::Preferred
            } else {
                SaveLocation::Local
            };
            let saved = bridge.save_sketch(&name, &code, location)?;
            if json {
                print_json(&saved)?;
            } else {
                println!("Sketch saved to {}: {}", saved.location, saved.path.display());
            }
            Ok(true)
        }
        CliCommand::Sketches => {
            let sketches = bridge.list_sketches();
            if json {
                print_json(&sketches)?;
            } else {
                for s in &sketches {
                    println!("{:<24} {:<10} {}", s.name, s.source.as_str(), s.path.display());
                }
            }
            Ok(true)
        }
        CliCommand::Show { name } => match bridge.load_sketch(&name)? {
            Some(sketch) => {
                if json {
                    print_json(&sketch)?;
                } else {
                    print!("{}", sketch.content);
                }
                Ok(true)
            }
            None => {
                eprintln!("Sketch not found: {name}");
                Ok(false)
            }
        },
    }
}

fn read_optional(path: Option<&str>) -> Result<Option<String>> {
    path.map(|p| {
        stdfs::read_to_string(p).with_context(|| format!("reading sketch source {p}"))
    })
    .transpose()
}

fn emit_result(result: &ExecutionResult, json: bool) -> Result<bool> {
    if json {
        print_json(result)?;
    } else {
        print!("{}", result.stdout);
        if !result.stderr.is_empty() {
            eprint!("{}", result.stderr);
            if !result.stderr.ends_with('\n') {
                eprintln!();
            }
        }
        if let Some(err) = &result.error_message {
            debug!(error = %err, "command reported failure");
        }
    }
    Ok(result.success)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing result")?;
    println!("{text}");
    Ok(())
}
