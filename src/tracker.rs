//! Forward-only progress tracking of a script against recognition hypotheses.
//!
//! Owns the cursor: the number of script words confirmed passed. The cursor
//! never moves backward within a session; the only regression path is an
//! explicit [`ProgressTracker::reset`] for a new session.

use crate::defaults;
use crate::recognition::events::Hypothesis;
use crate::script::Script;
use crate::similarity::are_similar;
use tracing::debug;

/// Where the cursor sits relative to the script.
///
/// Derived from cursor and script length. For a one-word script the start
/// coincides with the near-end position and reports `NearEnd`, since the
/// relaxed last-word rule is the only completion path there. An empty
/// script is `Complete` from the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Nothing matched yet (cursor at 0).
    AwaitingStart,
    /// Somewhere inside the script.
    Advancing,
    /// Exactly one word remains.
    NearEnd,
    /// Every script word passed.
    Complete,
}

/// The outcome of applying one hypothesis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerUpdate {
    /// Script indices newly marked passed, in increasing order.
    pub passed: Vec<usize>,
    /// True only on the transition into `Complete`.
    pub completed: bool,
}

impl TrackerUpdate {
    fn none() -> Self {
        Self::default()
    }

    /// True when the hypothesis moved nothing.
    pub fn is_empty(&self) -> bool {
        self.passed.is_empty() && !self.completed
    }
}

/// The matching state machine at the core of cuetrack.
pub struct ProgressTracker {
    script: Script,
    cursor: usize,
    similarity_threshold: f64,
    last_word_threshold: f64,
}

impl ProgressTracker {
    /// Creates a tracker over `script` with default thresholds.
    pub fn new(script: Script) -> Self {
        Self::with_thresholds(
            script,
            defaults::SIMILARITY_THRESHOLD,
            defaults::LAST_WORD_THRESHOLD,
        )
    }

    /// Creates a tracker with explicit matching thresholds.
    pub fn with_thresholds(script: Script, similarity_threshold: f64, last_word_threshold: f64) -> Self {
        Self {
            script,
            cursor: 0,
            similarity_threshold,
            last_word_threshold,
        }
    }

    /// Number of script words confirmed passed, in `[0, script.len()]`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The script being tracked.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Current state, derived from the cursor.
    pub fn state(&self) -> TrackerState {
        let n = self.script.len();
        if self.cursor >= n {
            TrackerState::Complete
        } else if self.cursor + 1 == n {
            TrackerState::NearEnd
        } else if self.cursor == 0 {
            TrackerState::AwaitingStart
        } else {
            TrackerState::Advancing
        }
    }

    /// Returns the cursor to 0 for a fresh session.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Applies one hypothesis, possibly advancing the cursor.
    ///
    /// Scans each recognized word in order against the script from the
    /// cursor forward; the first qualifying pair wins and passes every
    /// index from the cursor through the matched position (intervening
    /// words count as skipped filler). One matched span at most per
    /// hypothesis. Known trade-off: a stray recognized word matching far
    /// ahead silently passes everything in between.
    pub fn apply(&mut self, hypothesis: &Hypothesis) -> TrackerUpdate {
        if hypothesis.is_empty() || self.state() == TrackerState::Complete {
            return TrackerUpdate::none();
        }

        let n = self.script.len();
        let start = self.cursor;

        for recognized in &hypothesis.words {
            for j in start..n {
                let expected = match self.script.word(j) {
                    Some(word) => word.to_lowercase(),
                    None => break,
                };
                if self.word_matches(recognized, &expected) {
                    self.cursor = j + 1;
                    debug!(matched = %recognized, index = j, cursor = self.cursor, "cursor advanced");
                    return TrackerUpdate {
                        passed: (start..=j).collect(),
                        completed: self.cursor == n,
                    };
                }
            }
        }

        // End-of-script leniency: with only the last word outstanding,
        // accept the last recognized token against it at the relaxed
        // threshold, so clipped trailing audio still completes the session.
        if self.state() == TrackerState::NearEnd
            && let (Some(recognized), Some(expected)) =
                (hypothesis.words.last(), self.script.word(n - 1))
            && are_similar(recognized, expected, self.last_word_threshold)
        {
            self.cursor = n;
            debug!(matched = %recognized, "last word accepted at relaxed threshold");
            return TrackerUpdate {
                passed: vec![n - 1],
                completed: true,
            };
        }

        TrackerUpdate::none()
    }

    /// The three acceptance criteria, any one of which suffices: fuzzy
    /// similarity, or either word containing the other (tolerates partial
    /// words and compound recognition artifacts).
    fn word_matches(&self, recognized: &str, expected: &str) -> bool {
        are_similar(recognized, expected, self.similarity_threshold)
            || expected.contains(recognized)
            || recognized.contains(expected)
    }
}
