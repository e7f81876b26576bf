//! Adapter that owns the recognition engine and normalizes its events.
//!
//! Sits between the platform capability and the session controller: raw
//! [`PlatformEvent`]s go in, normalized hypotheses and escalations come out.
//! Restart policy (continuous dictation across natural pauses) and the
//! cleanup race suppression both live here.

use crate::recognition::capability::{RecognitionCapability, RecognitionSettings};
use crate::recognition::events::{Hypothesis, PlatformEvent};
use tracing::{debug, warn};

/// Lifecycle state of the adapter's engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// No engine running.
    Idle,
    /// Engine started, events expected.
    Listening,
    /// Platform has no recognition support; the session continues as a
    /// no-op flow. Not retried within the session.
    Errored,
}

/// What the adapter hands up to the controller after normalization.
///
/// Sound start/end, natural session end and transient errors are absorbed
/// here; only the two things the controller must react to escape.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterSignal {
    /// A normalized hypothesis for the tracker.
    Hypothesis(Hypothesis),
    /// Permission denied; the controller must run full cleanup.
    PermissionDenied,
}

/// Owns at most one recognition engine and applies restart policy.
pub struct RecognitionAdapter {
    engine: Option<Box<dyn RecognitionCapability>>,
    settings: RecognitionSettings,
    state: AdapterState,
    cleaning_up: bool,
}

impl RecognitionAdapter {
    /// Creates an adapter over an engine. `None` models a platform without
    /// recognition support.
    pub fn new(engine: Option<Box<dyn RecognitionCapability>>, settings: RecognitionSettings) -> Self {
        Self {
            engine,
            settings,
            state: AdapterState::Idle,
            cleaning_up: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AdapterState {
        self.state
    }

    /// True while the engine is expected to deliver events.
    pub fn is_listening(&self) -> bool {
        self.state == AdapterState::Listening
    }

    /// Clears per-session flags for a fresh start.
    pub fn reset(&mut self) {
        self.cleaning_up = false;
        if self.state == AdapterState::Listening {
            self.state = AdapterState::Idle;
        }
    }

    /// Starts the engine.
    ///
    /// An unsupported platform degrades to the `Errored` no-op state instead
    /// of failing the host; the condition is surfaced once per session.
    pub fn start(&mut self) {
        if self.state == AdapterState::Errored {
            return;
        }
        match self.engine.as_mut() {
            None => {
                warn!("speech recognition unavailable, session degrades to no-op");
                self.state = AdapterState::Errored;
            }
            Some(engine) => match engine.start(&self.settings) {
                Ok(()) => {
                    debug!(locale = %self.settings.locale, "recognition started");
                    self.state = AdapterState::Listening;
                }
                Err(crate::error::CuetrackError::RecognitionUnsupported) => {
                    warn!("recognition unsupported, session degrades to no-op");
                    self.state = AdapterState::Errored;
                }
                Err(err) => {
                    // Transient start failure: stay idle, the watchdog
                    // restart path retries.
                    warn!(%err, "recognition failed to start");
                }
            },
        }
    }

    /// Best-effort graceful stop; no-op when nothing is active.
    pub fn stop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
        if self.state == AdapterState::Listening {
            self.state = AdapterState::Idle;
        }
    }

    /// Best-effort immediate halt; no-op when nothing is active.
    pub fn abort(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.abort();
        }
        if self.state == AdapterState::Listening {
            self.state = AdapterState::Idle;
        }
    }

    /// Marks cleanup in progress and halts the engine.
    ///
    /// From here on, late engine events (errors, `Ended`) are suppressed so
    /// they cannot re-trigger cleanup or restart recursively.
    pub fn begin_cleanup(&mut self) {
        self.cleaning_up = true;
        self.abort();
    }

    /// Normalizes one platform event, applying restart policy.
    pub fn handle_event(&mut self, event: PlatformEvent) -> Option<AdapterSignal> {
        if self.cleaning_up {
            debug!(?event, "event after cleanup began, suppressed");
            return None;
        }

        match event {
            PlatformEvent::Result {
                transcript,
                is_final,
            } => {
                let hyp = Hypothesis::from_transcript(&transcript, is_final);
                debug!(words = hyp.words.len(), is_final, "hypothesis received");
                Some(AdapterSignal::Hypothesis(hyp))
            }
            PlatformEvent::SoundStarted => {
                debug!("sound started");
                None
            }
            PlatformEvent::SoundEnded => {
                // Natural pause: restart so continuous dictation survives it.
                debug!("sound ended, restarting recognition");
                if self.state == AdapterState::Listening {
                    self.stop();
                    self.start();
                }
                None
            }
            PlatformEvent::Ended => {
                debug!("recognition ended");
                None
            }
            PlatformEvent::Error(kind) if kind.is_fatal() => {
                warn!(?kind, "permission denied, escalating to cleanup");
                Some(AdapterSignal::PermissionDenied)
            }
            PlatformEvent::Error(kind) => {
                // Transient: keep listening, the watchdog and sound-end
                // paths recover any stall.
                warn!(?kind, "transient recognition error");
                None
            }
        }
    }
}
