//! cuetrack - autocue progress tracking for live speech
//!
//! Given a fixed script and a stream of noisy speech-recognition
//! hypotheses, keeps a monotonically advancing cursor suitable for
//! driving a highlight/scroll display.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod config;
pub mod defaults;
pub mod error;
pub mod recognition;
pub mod script;
pub mod session;
pub mod similarity;
pub mod tracker;

// Core traits (engine in → presentation out)
pub use recognition::capability::{RecognitionCapability, RecognitionSettings};
pub use session::sink::{ChannelSink, CollectorSink, PresentationSink, PresentationUpdate};

// Session surface
pub use session::controller::{SessionController, SessionHandle, SessionState};

// Events and data model
pub use recognition::events::{Hypothesis, PlatformEvent, RecognitionErrorKind};
pub use script::Script;
pub use tracker::{ProgressTracker, TrackerState, TrackerUpdate};

// Error handling
pub use error::{CuetrackError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }
}
