//! The seam to the platform speech-recognition capability.

use crate::defaults;
use crate::error::{CuetrackError, Result};
use crate::script::Script;
use std::sync::{Arc, Mutex};

/// Configuration handed to the recognition engine at start.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionSettings {
    /// BCP-47 locale tag.
    pub locale: String,
    /// Emit interim (non-final) results.
    pub interim_results: bool,
    /// Keep listening across utterance boundaries.
    pub continuous: bool,
    /// Maximum transcript alternatives per result.
    pub max_alternatives: u32,
    /// Optional JSGF vocabulary hint built from the script.
    pub grammar_hint: Option<String>,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            locale: defaults::LOCALE.to_string(),
            interim_results: true,
            continuous: true,
            max_alternatives: defaults::MAX_ALTERNATIVES,
            grammar_hint: None,
        }
    }
}

impl RecognitionSettings {
    /// Builds settings for a session over `script`.
    pub fn for_script(script: &Script) -> Self {
        Self {
            grammar_hint: script.grammar_hint(),
            ..Self::default()
        }
    }
}

/// Trait for the platform speech-recognition engine.
///
/// This trait allows swapping implementations (real platform bridge vs mock).
/// Start and stop are fire-and-forget requests: completion arrives later as
/// a `PlatformEvent`, not as a return value. Exactly one live engine
/// instance exists at a time, owned by the adapter.
pub trait RecognitionCapability: Send {
    /// Requests that the engine begin listening with the given settings.
    ///
    /// Returns `RecognitionUnsupported` when the platform has no speech
    /// recognition at all; any later failure arrives as an error event.
    fn start(&mut self, settings: &RecognitionSettings) -> Result<()>;

    /// Requests a graceful stop. Must tolerate an inactive engine.
    fn stop(&mut self);

    /// Requests an immediate halt, discarding pending results. Must tolerate
    /// an inactive engine.
    fn abort(&mut self);
}

/// Call record kept by [`MockRecognizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerCall {
    Start,
    Stop,
    Abort,
}

/// Mock recognition engine for testing.
///
/// Records lifecycle calls and can simulate an unsupported platform. Calls
/// are shared behind an `Arc` so tests keep a handle after the mock moves
/// into the session.
#[derive(Debug, Clone, Default)]
pub struct MockRecognizer {
    calls: Arc<Mutex<Vec<RecognizerCall>>>,
    last_settings: Arc<Mutex<Option<RecognitionSettings>>>,
    unsupported: bool,
}

impl MockRecognizer {
    /// Creates a mock that accepts all calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the mock to fail `start` as an unsupported platform.
    pub fn with_unsupported(mut self) -> Self {
        self.unsupported = true;
        self
    }

    /// Handle to the recorded calls.
    pub fn calls(&self) -> Arc<Mutex<Vec<RecognizerCall>>> {
        self.calls.clone()
    }

    /// The settings passed to the most recent `start`, if any.
    pub fn last_settings(&self) -> Option<RecognitionSettings> {
        self.last_settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, call: RecognizerCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl RecognitionCapability for MockRecognizer {
    fn start(&mut self, settings: &RecognitionSettings) -> Result<()> {
        if self.unsupported {
            return Err(CuetrackError::RecognitionUnsupported);
        }
        self.record(RecognizerCall::Start);
        *self
            .last_settings
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(settings.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.record(RecognizerCall::Stop);
    }

    fn abort(&mut self) {
        self.record(RecognizerCall::Abort);
    }
}
