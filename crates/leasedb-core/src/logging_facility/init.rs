//! Logging initialization module

use super::test_capture::init_test_capture;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Registry with the in-memory capture layer
    Test,
}

impl Profile {
    fn default_directive(&self) -> &'static str {
        match self {
            Profile::Development => "leasedb=debug",
            Profile::Production | Profile::Test => "leasedb=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call installs a subscriber; later calls are no-ops.
/// `RUST_LOG` overrides the profile's default directive.
///
/// # Profiles
///
/// - **Development**: Human-readable logs, `leasedb=debug`
/// - **Production**: JSON structured logs, `leasedb=info`
/// - **Test**: Capture layer shared with [`init_test_capture`]
///
/// # Panics
///
/// Panics if a subscriber was already installed outside this facility.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt().with_env_filter(filter).init();
            }
            Profile::Production => {
                tracing_subscriber::fmt().json().with_env_filter(filter).init();
            }
            Profile::Test => {
                init_test_capture();
            }
        }
    });
}
