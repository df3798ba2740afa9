#![allow(dead_code)]

pub use sketchbridge_test_utils::builders::BridgeConfigBuilder;
pub use sketchbridge_test_utils::fake_toolchain::FakeToolchain;
pub use sketchbridge_test_utils::{init_tracing, with_timeout};
