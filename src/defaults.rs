//! Default configuration constants for cuetrack.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default similarity threshold for word matching.
///
/// A recognized word matches an expected word when their edit-distance
/// similarity reaches this value. 0.7 tolerates one substitution in most
/// short words without accepting unrelated words.
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Relaxed similarity threshold for the final script word.
///
/// Recognition quality degrades at the end of an utterance (trailing audio
/// gets clipped), so the last word is accepted at 0.5 to let the session
/// actually finish.
pub const LAST_WORD_THRESHOLD: f64 = 0.5;

/// Default locale tag handed to the recognition engine.
pub const LOCALE: &str = "en-US";

/// Default maximum number of transcript alternatives requested per result.
pub const MAX_ALTERNATIVES: u32 = 5;

/// Idle watchdog duration.
///
/// If no recognition result arrives within this window while listening, the
/// engine is stopped and restarted. Some platform recognizers silently stall
/// after long silence; the restart recovers them.
pub const WATCHDOG: Duration = Duration::from_secs(5);

/// Pause between the stop and start of a forced restart.
///
/// Gives the engine time to tear down before the next start is issued,
/// avoiding stop/start thrash.
pub const RESTART_PAUSE: Duration = Duration::from_millis(100);

/// Settle delay between detecting script completion and notifying it.
///
/// Absorbs trailing audio and lets the presentation layer animate the final
/// highlight before the finished notification arrives.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
