use std::path::PathBuf;
use std::sync::Once;

use test_context::TestContext;

static INIT_LOGGER: Once = Once::new();

pub struct UsingLogger {
    _value: String,
}

impl TestContext for UsingLogger {
    fn setup() -> UsingLogger {
        INIT_LOGGER.call_once(|| {
            let _ = env_logger::builder().is_test(true).try_init();
        });

        UsingLogger {
            _value: "Hello, World!".to_string(),
        }
    }

    fn teardown(self) {}
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
