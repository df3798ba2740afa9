// tests/cli_args.rs

use clap::Parser;
use sketchbridge::cli::{CliArgs, CliCommand};
use sketchbridge::config::default_config_path;

#[test]
fn config_flag_defaults_to_the_config_module_path() {
    let args = CliArgs::try_parse_from(["sketchbridge", "version"]).unwrap();

    assert_eq!(std::path::PathBuf::from(&args.config), default_config_path());
    assert!(!args.json);
    assert!(matches!(args.command, CliCommand::Version));
}

#[test]
fn monitor_flags_parse() {
    let args = CliArgs::try_parse_from([
        "sketchbridge",
        "--config",
        "other.toml",
        "monitor",
        "/dev/ttyUSB0",
        "--baud",
        "115200",
        "--raw",
        "--json",
    ])
    .unwrap();

    assert_eq!(args.config, "other.toml");
    assert!(args.json);
    match args.command {
        CliCommand::Monitor {
            port, baud, raw, timeout,
        } => {
            assert_eq!(port, "/dev/ttyUSB0");
            assert_eq!(baud, Some(115200));
            assert_eq!(timeout, None);
            assert!(raw);
        }
        other => panic!("Expected Monitor, got {other:?}"),
    }
}
