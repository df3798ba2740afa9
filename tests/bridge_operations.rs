// tests/bridge_operations.rs

mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{BridgeConfigBuilder, FakeToolchain, init_tracing, with_timeout};
use sketchbridge::Bridge;
use sketchbridge::errors::BridgeError;
use sketchbridge::fs::FileSystem;
use sketchbridge::fs::mock::MockFileSystem;
use sketchbridge::sketchbook::{DirectoryKind, SaveLocation, SketchSource};
use sketchbridge::types::{ExecutionResult, MonitorMethod};

const BLINK: &str = "void setup() {}\nvoid loop() {}\n";

fn bridge(fake: &FakeToolchain, fs: &MockFileSystem) -> Bridge {
    let cfg = BridgeConfigBuilder::new()
        .compile_timeout_ms(1234)
        .upload_timeout_ms(4321)
        .build();
    Bridge::new(cfg, Arc::new(fake.clone()), Arc::new(fs.clone()))
}

#[tokio::test]
async fn simple_queries_map_to_toolchain_subcommands() {
    init_tracing();

    let fake = FakeToolchain::new()
        .respond_ok("arduino-cli board listall", "Arduino Uno arduino:avr:uno\n")
        .respond_ok("arduino-cli board list", "Port Type\n")
        .respond_ok("arduino-cli core list", "arduino:avr 1.8.6\n")
        .respond_ok("arduino-cli lib list", "Servo 1.2.1\n")
        .respond_ok("arduino-cli lib install", "Installed\n");
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    assert_eq!(with_timeout(b.board_list()).await.stdout, "Port Type\n");
    assert_eq!(
        with_timeout(b.board_list_all()).await.stdout,
        "Arduino Uno arduino:avr:uno\n"
    );
    assert!(with_timeout(b.core_list()).await.success);
    assert!(with_timeout(b.lib_list()).await.success);
    assert!(with_timeout(b.lib_install("Adafruit GFX Library")).await.success);

    assert_eq!(
        fake.executed(),
        vec![
            "arduino-cli board list",
            "arduino-cli board listall",
            "arduino-cli core list",
            "arduino-cli lib list",
            "arduino-cli lib install \"Adafruit GFX Library\"",
        ]
    );
    for req in fake.executed_requests() {
        assert_eq!(req.timeout, Duration::from_millis(5000));
    }
}

#[tokio::test]
async fn compile_writes_sketch_and_updates_context() {
    init_tracing();

    let fake = FakeToolchain::new().respond_ok("arduino-cli compile", "Sketch uses 924 bytes\n");
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    let result = with_timeout(b.compile("arduino:avr:uno", "blink", Some(BLINK)))
        .await
        .unwrap();

    assert!(result.success);
    let file = PathBuf::from("sketches/blink/blink.ino");
    assert_eq!(fs.read_to_string(&file).unwrap(), BLINK);

    assert_eq!(
        fake.executed(),
        vec!["arduino-cli compile --fqbn arduino:avr:uno \"sketches/blink\""]
    );
    assert_eq!(fake.executed_requests()[0].timeout, Duration::from_millis(1234));

    let ctx = b.context();
    assert_eq!(ctx.current_sketch, Some(file));
    assert_eq!(ctx.current_board.as_deref(), Some("arduino:avr:uno"));
    assert_eq!(ctx.current_port, None);
}

#[tokio::test]
async fn compile_without_code_requires_an_existing_sketch() {
    init_tracing();

    let fake = FakeToolchain::new();
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    let err = with_timeout(b.compile("arduino:avr:uno", "missing", None))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::SketchNotFound(_)));
    assert!(err.to_string().contains("Please compile first"));
    assert!(fake.executed().is_empty());
}

#[tokio::test]
async fn upload_reuses_the_compiled_sketch() {
    init_tracing();

    let fake = FakeToolchain::new()
        .respond_ok("arduino-cli compile", "")
        .respond_ok("arduino-cli upload", "New upload port: /dev/ttyACM0\n");
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    with_timeout(b.compile("arduino:avr:uno", "blink", Some(BLINK)))
        .await
        .unwrap();
    let result = with_timeout(b.upload("arduino:avr:uno", "/dev/ttyACM0", "blink", None))
        .await
        .unwrap();

    assert!(result.success);
    let executed = fake.executed();
    assert_eq!(
        executed[1],
        "arduino-cli upload -p /dev/ttyACM0 --fqbn arduino:avr:uno \"sketches/blink\""
    );
    assert_eq!(fake.executed_requests()[1].timeout, Duration::from_millis(4321));

    let ctx = b.context();
    assert_eq!(ctx.current_port.as_deref(), Some("/dev/ttyACM0"));
    assert_eq!(ctx.current_board.as_deref(), Some("arduino:avr:uno"));
}

#[tokio::test]
async fn upload_without_any_sketch_fails_before_running() {
    init_tracing();

    let fake = FakeToolchain::new();
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    let err = with_timeout(b.upload("arduino:avr:uno", "COM3", "blink", None))
        .await
        .unwrap_err();

    match err {
        BridgeError::SketchNotFound(path) => {
            assert!(path.ends_with("blink.ino"), "got: {path}");
        }
        other => panic!("Expected SketchNotFound, got {other:?}"),
    }
    assert!(fake.executed().is_empty());
    // The target is still recorded.
    assert_eq!(b.context().current_port.as_deref(), Some("COM3"));
}

#[tokio::test]
async fn toolchain_failures_are_returned_not_raised() {
    init_tracing();

    let fake = FakeToolchain::new().respond(
        "arduino-cli compile",
        ExecutionResult::failed("", "error: expected ';'\n", Some("Command failed".into())),
    );
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    let result = with_timeout(b.compile("arduino:avr:uno", "broken", Some("void setup() {")))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.stderr, "error: expected ';'\n");
}

#[tokio::test]
async fn invalid_sketch_names_are_rejected() {
    let fake = FakeToolchain::new();
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    for name in ["", "..", "../etc", "a/b", "a\\b"] {
        let err = with_timeout(b.compile("arduino:avr:uno", name, Some(BLINK)))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidSketchName(_)), "{name:?}");
    }
    assert!(fake.executed().is_empty());
}

#[tokio::test]
async fn monitor_uses_config_defaults_and_program() {
    init_tracing();

    let fake = FakeToolchain::new().respond_monitor(ExecutionResult::succeeded("t=20", ""));
    let fs = MockFileSystem::new();
    let b = bridge(&fake, &fs);

    let result = with_timeout(b.monitor("/dev/ttyUSB0", None, None, MonitorMethod::Regular)).await;
    assert!(result.success);
    assert_eq!(result.method, Some(MonitorMethod::Regular));

    with_timeout(b.monitor("/dev/ttyUSB0", Some(115200), Some(2), MonitorMethod::Direct)).await;

    let seen = fake.monitored();
    assert_eq!(seen[0].program, PathBuf::from("arduino-cli"));
    assert_eq!(seen[0].baud, 9600);
    assert_eq!(seen[0].timeout_secs, 5);
    assert!(seen[0].filter.is_enabled());
    assert!(seen[0].filter.is_banner("Press CTRL-C to exit"));

    assert_eq!(seen[1].baud, 115200);
    assert_eq!(seen[1].timeout_secs, 2);
    assert!(!seen[1].filter.is_enabled());
    assert!(seen[1].args.contains(&"baudrate=115200".to_string()));
}

#[tokio::test]
async fn health_reflects_toolchain_availability() {
    init_tracing();

    let fs = MockFileSystem::new();

    let up = FakeToolchain::new().respond_ok("arduino-cli version", "arduino-cli Version: 1.1.0\n");
    let report = with_timeout(bridge(&up, &fs).health()).await;
    assert_eq!(report.status, "OK");
    assert!(report.toolchain_available);
    assert_eq!(report.version, "arduino-cli Version: 1.1.0\n");

    let down = FakeToolchain::new();
    let report = with_timeout(bridge(&down, &fs).health()).await;
    assert_eq!(report.status, "OK");
    assert!(!report.toolchain_available);
}

#[tokio::test]
async fn config_report_combines_dump_and_directories() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/data/book");
    let fake = FakeToolchain::new().respond_ok("arduino-cli config dump", "sketchbook_path: /data/book\n");
    let b = bridge(&fake, &fs);

    let before = with_timeout(b.config_report()).await;
    assert_eq!(before.sketchbook_path, "Not found");

    with_timeout(b.discover_sketchbook()).await;
    let after = with_timeout(b.config_report()).await;

    assert!(after.success);
    assert_eq!(after.config, "sketchbook_path: /data/book\n");
    assert_eq!(after.sketchbook_path, "/data/book");
    assert_eq!(after.preferred_sketch_directory, PathBuf::from("/data/book"));
    assert!(after.is_arduino_sketchbook);
}

#[tokio::test]
async fn config_report_without_toolchain() {
    let fs = MockFileSystem::new();
    let b = bridge(&FakeToolchain::new(), &fs);

    let report = with_timeout(b.config_report()).await;
    assert_eq!(report.config, "Config not available");
    assert!(!report.is_arduino_sketchbook);
}

#[test]
fn save_list_and_load_across_folders() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/home/test/Arduino");
    let b = bridge(&FakeToolchain::new(), &fs);
    b.prepare().unwrap();
    assert!(fs.is_dir(&PathBuf::from("sketches")));

    let local = b.save_sketch("blink", BLINK, SaveLocation::Local).unwrap();
    assert_eq!(local.location, "local project folder");
    assert_eq!(local.path, PathBuf::from("sketches/blink/blink.ino"));

    let pref = b.save_sketch("fade", "// fade\n", SaveLocation::Preferred).unwrap();
    assert_eq!(pref.location, "Arduino sketchbook");
    assert_eq!(pref.path, PathBuf::from("/home/test/Arduino/fade/fade.ino"));
    assert_eq!(b.context().current_sketch, Some(pref.path.clone()));

    let listed = b.list_sketches();
    let names: Vec<_> = listed.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["fade", "blink"], "newest first");
    assert_eq!(listed[0].source, SketchSource::Sketchbook);
    assert_eq!(listed[0].path, PathBuf::from("/home/test/Arduino/fade"));
    assert_eq!(listed[1].source, SketchSource::Local);

    let loaded = b.load_sketch("blink").unwrap().unwrap();
    assert_eq!(loaded.content, BLINK);
    assert_eq!(b.context().current_sketch, Some(loaded.path));

    assert_eq!(b.load_sketch("nope").unwrap(), None);
}

#[test]
fn preferred_copy_shadows_local_copy_on_load() {
    let fs = MockFileSystem::new();
    fs.add_dir("/home/test/Arduino");
    let b = bridge(&FakeToolchain::new(), &fs);

    b.save_sketch("blink", "// local\n", SaveLocation::Local).unwrap();
    b.save_sketch("blink", "// sketchbook\n", SaveLocation::Preferred).unwrap();

    let loaded = b.load_sketch("blink").unwrap().unwrap();
    assert_eq!(loaded.content, "// sketchbook\n");
}

#[test]
fn saving_to_documents_fallback_when_no_sketchbook() {
    let fs = MockFileSystem::new();
    let b = bridge(&FakeToolchain::new(), &fs);

    assert_eq!(b.preferred_directory().kind, DirectoryKind::DocumentsFallback);
    let saved = b.save_sketch("blink", BLINK, SaveLocation::Preferred).unwrap();

    assert_eq!(saved.location, "Documents folder");
    assert_eq!(
        saved.path,
        PathBuf::from("/home/test/Documents/Arduino Sketches/blink/blink.ino")
    );
    assert_eq!(b.list_sketches()[0].source, SketchSource::Documents);
}

#[test]
fn unreadable_entries_are_skipped_when_listing() {
    let fs = MockFileSystem::new();
    fs.add_dir("/home/test/Arduino");
    // A folder without its matching .ino and a stray file.
    fs.add_file("/home/test/Arduino/notes/readme.txt", "x");
    fs.add_file("/home/test/Arduino/stray.ino", "x");
    let b = bridge(&FakeToolchain::new(), &fs);

    assert!(b.list_sketches().is_empty());
}
