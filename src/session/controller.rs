//! Session orchestration: commands, timers and the single event queue.
//!
//! Every mutation of session state happens inside [`SessionController::handle_event`],
//! driven by one tokio mpsc queue. Platform callbacks, presentation-layer
//! commands and timer firings all serialize through it, so the cursor,
//! session state and timers never see parallel mutation even on a
//! multi-threaded runtime.

use crate::config::Config;
use crate::defaults;
use crate::error::{CuetrackError, Result};
use crate::recognition::adapter::{AdapterSignal, RecognitionAdapter};
use crate::recognition::capability::{RecognitionCapability, RecognitionSettings};
use crate::recognition::events::PlatformEvent;
use crate::script::Script;
use crate::session::sink::PresentationSink;
use crate::tracker::{ProgressTracker, TrackerState};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Lifecycle of one autocue session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session running.
    Idle,
    /// Adapter active (or degraded no-op), hypotheses accepted.
    Listening,
    /// Teardown in progress; late events are suppressed.
    CleaningUp,
    /// Script completed and the settle delay elapsed. Terminal.
    Finished,
    /// Permission denied. Terminal, distinct from `Finished`.
    Disabled,
}

/// The scheduled one-shots a session can have outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Idle watchdog: no hypothesis for too long, force a restart.
    Watchdog,
    /// Pause between the stop and start halves of a forced restart.
    RestartPause,
    /// Delay between script completion and the finished notification.
    Settle,
}

/// Everything the controller reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    StartSession,
    StopSession,
    Platform(PlatformEvent),
    /// A scheduled one-shot fired. Stale tokens are ignored, which is how
    /// cancellation works: arming a new timer (or cancelling) invalidates
    /// the token a late firing still carries.
    Timer { kind: TimerKind, token: u64 },
    Shutdown,
}

/// Timer durations for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTiming {
    pub watchdog: Duration,
    pub restart_pause: Duration,
    pub settle_delay: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            watchdog: defaults::WATCHDOG,
            restart_pause: defaults::RESTART_PAUSE,
            settle_delay: defaults::SETTLE_DELAY,
        }
    }
}

/// Cloneable handle for feeding the session from the outside.
///
/// Commands and platform events are fire-and-forget; their effects arrive
/// later through the presentation sink.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<ControlEvent>,
}

impl SessionHandle {
    /// Starts (or restarts) the session.
    pub fn start_session(&self) -> Result<()> {
        self.send(ControlEvent::StartSession)
    }

    /// Stops the session. Idempotent.
    pub fn stop_session(&self) -> Result<()> {
        self.send(ControlEvent::StopSession)
    }

    /// Feeds one raw platform recognition event.
    pub fn platform_event(&self, event: PlatformEvent) -> Result<()> {
        self.send(ControlEvent::Platform(event))
    }

    /// Tears the session loop down.
    pub fn shutdown(&self) -> Result<()> {
        self.send(ControlEvent::Shutdown)
    }

    fn send(&self, event: ControlEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| CuetrackError::SessionClosed)
    }
}

/// Owns the tracker, the adapter, the sink and all timers.
pub struct SessionController {
    state: SessionState,
    tracker: ProgressTracker,
    adapter: RecognitionAdapter,
    sink: Box<dyn PresentationSink>,
    timing: SessionTiming,
    tx: mpsc::UnboundedSender<ControlEvent>,
    rx: Option<mpsc::UnboundedReceiver<ControlEvent>>,
    // Latest valid token per timer kind; None = nothing armed.
    next_token: u64,
    watchdog: Option<u64>,
    restart_pause: Option<u64>,
    settle: Option<u64>,
}

impl SessionController {
    /// Builds a controller and its handle with default configuration.
    ///
    /// `engine` is the platform recognition capability; `None` models a
    /// platform without one (the session degrades to a no-op flow).
    pub fn new(
        script: Script,
        engine: Option<Box<dyn RecognitionCapability>>,
        sink: Box<dyn PresentationSink>,
    ) -> (Self, SessionHandle) {
        Self::with_config(script, engine, sink, &Config::default())
    }

    /// Builds a controller with explicit configuration.
    pub fn with_config(
        script: Script,
        engine: Option<Box<dyn RecognitionCapability>>,
        sink: Box<dyn PresentationSink>,
        config: &Config,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = RecognitionSettings {
            locale: config.recognition.locale.clone(),
            interim_results: config.recognition.interim_results,
            continuous: config.recognition.continuous,
            max_alternatives: config.recognition.max_alternatives,
            grammar_hint: script.grammar_hint(),
        };
        let tracker = ProgressTracker::with_thresholds(
            script,
            config.tracking.similarity_threshold,
            config.tracking.last_word_threshold,
        );
        let controller = Self {
            state: SessionState::Idle,
            tracker,
            adapter: RecognitionAdapter::new(engine, settings),
            sink,
            timing: config.timing.to_session_timing(),
            tx: tx.clone(),
            rx: Some(rx),
            next_token: 0,
            watchdog: None,
            restart_pause: None,
            settle: None,
        };
        (controller, SessionHandle { tx })
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Cursor position of the underlying tracker.
    pub fn cursor(&self) -> usize {
        self.tracker.cursor()
    }

    /// Runs the event loop until shutdown or every handle is dropped.
    pub async fn run(mut self) {
        let mut rx = match self.rx.take() {
            Some(rx) => rx,
            None => return,
        };
        while let Some(event) = rx.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }
        debug!("session loop ended");
    }

    /// Applies one event. Returns false when the loop should end.
    ///
    /// This is the single serialization point: nothing else mutates the
    /// tracker, the adapter, the session state or the timers.
    pub fn handle_event(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::StartSession => self.start_session(),
            ControlEvent::StopSession => self.stop_session(),
            ControlEvent::Platform(platform) => self.on_platform_event(platform),
            ControlEvent::Timer { kind, token } => self.on_timer(kind, token),
            ControlEvent::Shutdown => return false,
        }
        true
    }

    fn start_session(&mut self) {
        if self.state == SessionState::Disabled {
            warn!("session disabled, start ignored");
            return;
        }
        info!(words = self.tracker.script().len(), "session starting");
        self.cancel_all_timers();
        // Restarting over a live session: halt the old engine first.
        if self.adapter.is_listening() {
            self.adapter.abort();
        }
        self.tracker.reset();
        self.adapter.reset();
        self.state = SessionState::Listening;
        self.adapter.start();
        self.sink.listening_active(true);
        self.arm(TimerKind::Watchdog, self.timing.watchdog);

        // Degenerate empty script: nothing to match, complete immediately.
        if self.tracker.state() == TrackerState::Complete {
            self.on_complete();
        }
    }

    fn stop_session(&mut self) {
        self.cancel_all_timers();
        if self.state == SessionState::Disabled {
            return;
        }
        self.state = SessionState::CleaningUp;
        self.adapter.begin_cleanup();
        self.state = SessionState::Idle;
        self.sink.listening_active(false);
        info!("session stopped");
    }

    fn on_platform_event(&mut self, event: PlatformEvent) {
        if self.state == SessionState::Disabled {
            return;
        }
        match self.adapter.handle_event(event) {
            Some(AdapterSignal::Hypothesis(hypothesis)) => {
                if self.state != SessionState::Listening {
                    return;
                }
                // Every result disarms the idle watchdog and re-arms it
                // after processing.
                self.watchdog = None;
                let update = self.tracker.apply(&hypothesis);
                for index in update.passed {
                    self.sink.highlight(index);
                }
                if update.completed {
                    self.on_complete();
                } else if self.tracker.state() != TrackerState::Complete {
                    self.arm(TimerKind::Watchdog, self.timing.watchdog);
                }
            }
            Some(AdapterSignal::PermissionDenied) => self.disable(),
            None => {}
        }
    }

    fn on_timer(&mut self, kind: TimerKind, token: u64) {
        let armed = match kind {
            TimerKind::Watchdog => &mut self.watchdog,
            TimerKind::RestartPause => &mut self.restart_pause,
            TimerKind::Settle => &mut self.settle,
        };
        if *armed != Some(token) {
            debug!(?kind, token, "stale timer, ignored");
            return;
        }
        *armed = None;

        match kind {
            TimerKind::Watchdog => {
                if self.state == SessionState::Listening {
                    // Forced restart: stop now, start after a short pause so
                    // the engine is fully torn down before the next start.
                    debug!("watchdog fired, forcing restart");
                    self.adapter.stop();
                    self.arm(TimerKind::RestartPause, self.timing.restart_pause);
                }
            }
            TimerKind::RestartPause => {
                if self.state == SessionState::Listening {
                    self.adapter.start();
                    self.arm(TimerKind::Watchdog, self.timing.watchdog);
                }
            }
            TimerKind::Settle => {
                info!("script complete");
                self.state = SessionState::Finished;
                self.sink.finished();
            }
        }
    }

    fn on_complete(&mut self) {
        // Trailing audio is useless now; stop listening, let the final
        // highlight settle, then notify.
        self.cancel_all_timers();
        self.adapter.stop();
        self.sink.listening_active(false);
        self.arm(TimerKind::Settle, self.timing.settle_delay);
    }

    fn disable(&mut self) {
        self.cancel_all_timers();
        self.state = SessionState::CleaningUp;
        self.adapter.begin_cleanup();
        self.state = SessionState::Disabled;
        self.sink.listening_active(false);
        warn!("permission denied, session disabled");
    }

    fn cancel_all_timers(&mut self) {
        self.watchdog = None;
        self.restart_pause = None;
        self.settle = None;
    }

    /// Arms a one-shot timer. The previous timer of the same kind is
    /// implicitly cancelled: its token is no longer the latest.
    fn arm(&mut self, kind: TimerKind, delay: Duration) {
        self.next_token += 1;
        let token = self.next_token;
        match kind {
            TimerKind::Watchdog => self.watchdog = Some(token),
            TimerKind::RestartPause => self.restart_pause = Some(token),
            TimerKind::Settle => self.settle = Some(token),
        }
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The loop may be gone; a dead session needs no timers.
            let _ = tx.send(ControlEvent::Timer { kind, token });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::capability::{MockRecognizer, RecognizerCall};
    use crate::recognition::events::RecognitionErrorKind;
    use crate::session::sink::{CollectorSink, PresentationUpdate};
    use std::sync::{Arc, Mutex};

    struct Fixture {
        controller: SessionController,
        updates: Arc<Mutex<Vec<PresentationUpdate>>>,
        calls: Arc<Mutex<Vec<RecognizerCall>>>,
    }

    fn fixture(script: &str) -> Fixture {
        let mock = MockRecognizer::new();
        let calls = mock.calls();
        let sink = CollectorSink::new();
        let updates = sink.updates();
        let (controller, _handle) = SessionController::new(
            Script::from_text(script),
            Some(Box::new(mock)),
            Box::new(sink),
        );
        Fixture {
            controller,
            updates,
            calls,
        }
    }

    fn result(transcript: &str) -> ControlEvent {
        ControlEvent::Platform(PlatformEvent::Result {
            transcript: transcript.to_string(),
            is_final: false,
        })
    }

    fn updates_of(fix: &Fixture) -> Vec<PresentationUpdate> {
        fix.updates.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_start_session_listens_and_arms_watchdog() {
        let mut fix = fixture("the quick brown fox");
        fix.controller.handle_event(ControlEvent::StartSession);

        assert_eq!(fix.controller.state(), SessionState::Listening);
        assert_eq!(
            updates_of(&fix),
            vec![PresentationUpdate::ListeningActive { active: true }]
        );
        assert_eq!(*fix.calls.lock().unwrap(), vec![RecognizerCall::Start]);
        assert_eq!(fix.controller.watchdog, Some(1));
    }

    #[tokio::test]
    async fn test_hypothesis_highlights_and_rearms_watchdog() {
        let mut fix = fixture("the quick brown fox");
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(result("quick brown"));

        assert_eq!(fix.controller.cursor(), 2);
        assert_eq!(
            updates_of(&fix)[1..],
            [
                PresentationUpdate::Highlight { index: 0 },
                PresentationUpdate::Highlight { index: 1 },
            ]
        );
        // Old watchdog token invalidated, a fresh one armed.
        assert_eq!(fix.controller.watchdog, Some(2));
    }

    #[tokio::test]
    async fn test_completion_schedules_settle_then_finishes() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(result("alpha"));
        fix.controller.handle_event(result("beta"));

        // Completed: adapter stopped, stop-control disabled, settle armed.
        assert_eq!(fix.controller.cursor(), 2);
        assert!(fix.controller.watchdog.is_none());
        let settle = fix.controller.settle.unwrap();
        assert!(
            updates_of(&fix).contains(&PresentationUpdate::ListeningActive { active: false })
        );
        assert!(
            fix.calls.lock().unwrap().contains(&RecognizerCall::Stop)
        );

        fix.controller.handle_event(ControlEvent::Timer {
            kind: TimerKind::Settle,
            token: settle,
        });
        assert_eq!(fix.controller.state(), SessionState::Finished);
        assert_eq!(updates_of(&fix).last(), Some(&PresentationUpdate::Finished));
    }

    #[tokio::test]
    async fn test_post_completion_hypotheses_are_noops() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(result("alpha"));
        fix.controller.handle_event(result("beta"));
        let before = updates_of(&fix);

        fix.controller.handle_event(result("gamma alpha beta"));
        assert_eq!(updates_of(&fix), before);
        assert_eq!(fix.controller.cursor(), 2);
    }

    #[tokio::test]
    async fn test_watchdog_forces_stop_then_delayed_start() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StartSession);
        let watchdog = fix.controller.watchdog.unwrap();
        fix.calls.lock().unwrap().clear();

        fix.controller.handle_event(ControlEvent::Timer {
            kind: TimerKind::Watchdog,
            token: watchdog,
        });
        assert_eq!(*fix.calls.lock().unwrap(), vec![RecognizerCall::Stop]);
        let pause = fix.controller.restart_pause.unwrap();

        fix.controller.handle_event(ControlEvent::Timer {
            kind: TimerKind::RestartPause,
            token: pause,
        });
        assert_eq!(
            *fix.calls.lock().unwrap(),
            vec![RecognizerCall::Stop, RecognizerCall::Start]
        );
        // Watchdog re-armed for the new engine instance.
        assert!(fix.controller.watchdog.is_some());
        assert_eq!(fix.controller.state(), SessionState::Listening);
    }

    #[tokio::test]
    async fn test_stale_watchdog_after_stop_cannot_resurrect() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StartSession);
        let watchdog = fix.controller.watchdog.unwrap();

        fix.controller.handle_event(ControlEvent::StopSession);
        assert_eq!(fix.controller.state(), SessionState::Idle);
        fix.calls.lock().unwrap().clear();

        fix.controller.handle_event(ControlEvent::Timer {
            kind: TimerKind::Watchdog,
            token: watchdog,
        });
        assert_eq!(fix.controller.state(), SessionState::Idle);
        assert!(fix.calls.lock().unwrap().is_empty());
        // listening_active was last reported false and stays false.
        assert_eq!(
            updates_of(&fix).last(),
            Some(&PresentationUpdate::ListeningActive { active: false })
        );
    }

    #[tokio::test]
    async fn test_stale_settle_after_stop_cannot_finish() {
        let mut fix = fixture("alpha");
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(result("alpha"));
        let settle = fix.controller.settle.unwrap();

        fix.controller.handle_event(ControlEvent::StopSession);
        fix.controller.handle_event(ControlEvent::Timer {
            kind: TimerKind::Settle,
            token: settle,
        });

        assert_eq!(fix.controller.state(), SessionState::Idle);
        assert!(!updates_of(&fix).contains(&PresentationUpdate::Finished));
    }

    #[tokio::test]
    async fn test_stop_session_is_idempotent() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StopSession);
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(ControlEvent::StopSession);
        fix.controller.handle_event(ControlEvent::StopSession);
        assert_eq!(fix.controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_restart_resets_cursor_and_highlights_again() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(result("alpha"));
        assert_eq!(fix.controller.cursor(), 1);

        fix.controller.handle_event(ControlEvent::StartSession);
        assert_eq!(fix.controller.cursor(), 0);

        // Index 0 is re-emitted in the new session.
        fix.controller.handle_event(result("alpha"));
        let highlights: Vec<_> = updates_of(&fix)
            .into_iter()
            .filter(|u| matches!(u, PresentationUpdate::Highlight { .. }))
            .collect();
        assert_eq!(
            highlights,
            vec![
                PresentationUpdate::Highlight { index: 0 },
                PresentationUpdate::Highlight { index: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_permission_denied_while_listening_disables() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(ControlEvent::Platform(PlatformEvent::Error(
            RecognitionErrorKind::NotAllowed,
        )));

        assert_eq!(fix.controller.state(), SessionState::Disabled);
        assert_eq!(
            updates_of(&fix).last(),
            Some(&PresentationUpdate::ListeningActive { active: false })
        );
        assert!(
            fix.calls.lock().unwrap().contains(&RecognizerCall::Abort)
        );
    }

    #[tokio::test]
    async fn test_permission_denied_before_start_disables() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::Platform(PlatformEvent::Error(
            RecognitionErrorKind::NotAllowed,
        )));
        assert_eq!(fix.controller.state(), SessionState::Disabled);

        // Disabled is sticky: starting again stays disabled, never Listening.
        fix.controller.handle_event(ControlEvent::StartSession);
        assert_eq!(fix.controller.state(), SessionState::Disabled);
        assert!(!updates_of(&fix).contains(&PresentationUpdate::ListeningActive { active: true }));
    }

    #[tokio::test]
    async fn test_transient_error_keeps_listening() {
        let mut fix = fixture("alpha beta");
        fix.controller.handle_event(ControlEvent::StartSession);
        fix.controller.handle_event(ControlEvent::Platform(PlatformEvent::Error(
            RecognitionErrorKind::Network,
        )));
        assert_eq!(fix.controller.state(), SessionState::Listening);
    }

    #[tokio::test]
    async fn test_unsupported_platform_stays_usable() {
        let sink = CollectorSink::new();
        let updates = sink.updates();
        let (mut controller, _handle) = SessionController::new(
            Script::from_text("alpha beta"),
            None,
            Box::new(sink),
        );

        controller.handle_event(ControlEvent::StartSession);
        assert_eq!(controller.state(), SessionState::Listening);
        assert_eq!(
            *updates.lock().unwrap(),
            vec![PresentationUpdate::ListeningActive { active: true }]
        );
        controller.handle_event(ControlEvent::StopSession);
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_empty_script_completes_immediately() {
        let mut fix = fixture("");
        fix.controller.handle_event(ControlEvent::StartSession);

        let settle = fix.controller.settle.unwrap();
        fix.controller.handle_event(ControlEvent::Timer {
            kind: TimerKind::Settle,
            token: settle,
        });
        assert_eq!(fix.controller.state(), SessionState::Finished);
    }

    #[tokio::test]
    async fn test_shutdown_ends_loop() {
        let mut fix = fixture("alpha");
        assert!(fix.controller.handle_event(ControlEvent::StartSession));
        assert!(!fix.controller.handle_event(ControlEvent::Shutdown));
    }
}
