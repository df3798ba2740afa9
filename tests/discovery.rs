// tests/discovery.rs

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::{FakeToolchain, init_tracing, with_timeout};
use sketchbridge::exec::ExecutionRequest;
use sketchbridge::fs::FileSystem;
use sketchbridge::fs::mock::MockFileSystem;
use sketchbridge::sketchbook::{
    DirectoryKind, DiscoverySource, SketchbookLocator, parse_config_dump, parse_preferences,
};

const HOME: &str = "/home/test";

fn locator(fs: &MockFileSystem) -> SketchbookLocator {
    SketchbookLocator::new(Arc::new(fs.clone()), HOME)
}

fn config_dump() -> ExecutionRequest {
    ExecutionRequest::new("arduino-cli config dump", 5_000)
}

#[tokio::test]
async fn toolchain_config_wins_over_preferences_and_defaults() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/data/cli-book");
    fs.add_dir("/data/ide-book");
    fs.add_dir("/home/test/Arduino");
    let loc = locator(&fs);
    fs.add_file(loc.preferences_file(), "sketchbook.path=/data/ide-book\n");

    let fake = FakeToolchain::new().respond_ok(
        "arduino-cli config dump",
        "board_manager:\n  additional_urls: []\nsketchbook_path: \"/data/cli-book\"\n",
    );

    let found = with_timeout(loc.discover_external_configuration(&fake, config_dump()))
        .await
        .unwrap();

    assert_eq!(found.path, PathBuf::from("/data/cli-book"));
    assert_eq!(found.source, DiscoverySource::ToolchainConfig);
    assert_eq!(loc.discovered(), Some(PathBuf::from("/data/cli-book")));
    assert_eq!(fake.executed(), vec!["arduino-cli config dump"]);
}

#[tokio::test]
async fn preferences_used_when_toolchain_config_fails() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/data/ide-book");
    fs.add_dir("/home/test/Arduino");
    let loc = locator(&fs);
    fs.add_file(
        loc.preferences_file(),
        "editor.font=Monospaced\nsketchbook.path=/data/ide-book\nupdate.check=false\n",
    );

    let fake = FakeToolchain::new();

    let found = with_timeout(loc.discover_external_configuration(&fake, config_dump()))
        .await
        .unwrap();

    assert_eq!(found.path, PathBuf::from("/data/ide-book"));
    assert_eq!(found.source, DiscoverySource::IdePreferences);
}

#[tokio::test]
async fn configured_path_that_does_not_exist_falls_through() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/home/test/Sketchbook");
    let loc = locator(&fs);
    fs.add_file(loc.preferences_file(), "sketchbook.path=/gone\n");

    let fake = FakeToolchain::new().respond_ok("arduino-cli config dump", "sketchbook: /also/gone\n");

    let found = with_timeout(loc.discover_external_configuration(&fake, config_dump()))
        .await
        .unwrap();

    assert_eq!(found.path, PathBuf::from("/home/test/Sketchbook"));
    assert_eq!(found.source, DiscoverySource::DefaultLocation);
}

#[tokio::test]
async fn default_locations_are_probed_in_order() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/home/test/Sketchbook");
    fs.add_dir("/home/test/Arduino");
    fs.add_dir("/home/test/Documents/Arduino");
    let loc = locator(&fs);

    let found = with_timeout(loc.discover_external_configuration(&FakeToolchain::new(), config_dump()))
        .await
        .unwrap();

    assert_eq!(found.path, PathBuf::from("/home/test/Documents/Arduino"));
}

#[tokio::test]
async fn nothing_found_leaves_cache_empty_and_falls_back_to_documents() {
    init_tracing();

    let fs = MockFileSystem::new();
    let loc = locator(&fs);

    let found = with_timeout(loc.discover_external_configuration(&FakeToolchain::new(), config_dump())).await;
    assert_eq!(found, None);
    assert_eq!(loc.discovered(), None);

    let preferred = loc.resolve_preferred_directory();
    assert_eq!(preferred.kind, DirectoryKind::DocumentsFallback);
    assert_eq!(
        preferred.path,
        PathBuf::from("/home/test/Documents/Arduino Sketches")
    );
    assert!(!preferred.is_arduino_sketchbook());
    assert_eq!(preferred.location_description(), "Documents folder");
    assert!(fs.is_dir(&preferred.path), "fallback folder must be created");
}

#[tokio::test]
async fn preferred_directory_is_reevaluated_after_removal() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_dir("/data/cli-book");
    fs.add_dir("/home/test/Arduino");
    let loc = locator(&fs);
    let fake = FakeToolchain::new().respond_ok("arduino-cli config dump", "sketchbook_path: /data/cli-book\n");
    with_timeout(loc.discover_external_configuration(&fake, config_dump())).await;

    let first = loc.resolve_preferred_directory();
    assert_eq!(first.path, PathBuf::from("/data/cli-book"));
    assert_eq!(first.kind, DirectoryKind::Discovered);
    assert_eq!(first.location_description(), "Arduino sketchbook");

    fs.remove("/data/cli-book");
    let second = loc.resolve_preferred_directory();
    assert_eq!(second.path, PathBuf::from("/home/test/Arduino"));
    assert_eq!(second.kind, DirectoryKind::WellKnown);

    fs.remove("/home/test/Arduino");
    let third = loc.resolve_preferred_directory();
    assert_eq!(third.kind, DirectoryKind::DocumentsFallback);
}

#[test]
fn clones_share_the_discovery_cache() {
    let fs = MockFileSystem::new();
    let loc = locator(&fs);
    let other = loc.clone();

    loc.set_discovered(Some(PathBuf::from("/x")));
    assert_eq!(other.discovered(), Some(PathBuf::from("/x")));
}

#[test]
fn config_dump_parsing() {
    assert_eq!(
        parse_config_dump("directories:\n  sketchbook: '/home/a/Arduino'\n  data: /x\n"),
        Some("/home/a/Arduino".to_string())
    );
    assert_eq!(
        parse_config_dump("sketchbook_path: \"C:\\Users\\a\\Documents\\Arduino\"\n"),
        Some("C:\\Users\\a\\Documents\\Arduino".to_string())
    );
    // Only the first matching line is considered.
    assert_eq!(
        parse_config_dump("sketchbook_note\nsketchbook: /b\n"),
        None
    );
    assert_eq!(parse_config_dump("board_manager: {}\n"), None);
    assert_eq!(parse_config_dump("sketchbook:   \n"), None);
}

#[test]
fn preferences_parsing() {
    assert_eq!(
        parse_preferences("a=b\nsketchbook.path=/home/a/My Sketches \n"),
        Some("/home/a/My Sketches".to_string())
    );
    assert_eq!(
        parse_preferences("sketchbook.path=/p=q\n"),
        Some("/p=q".to_string())
    );
    assert_eq!(parse_preferences("last.sketchbook.path=/x\n"), None);
    assert_eq!(parse_preferences(""), None);
}
