//! Event types exchanged with the platform recognition capability.

use serde::{Deserialize, Serialize};

/// Raw lifecycle events emitted by the platform recognition capability.
///
/// The platform glue (browser bridge, OS speech API, test harness) feeds
/// these into the session; the adapter normalizes them before the tracker
/// ever sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlatformEvent {
    /// A transcript result, interim or final. Carries the best alternative.
    Result { transcript: String, is_final: bool },
    /// The engine detected the start of sound.
    SoundStarted,
    /// The engine detected the end of sound (natural pause).
    SoundEnded,
    /// The engine ended the recognition session on its own.
    Ended,
    /// A typed engine error.
    Error(RecognitionErrorKind),
}

/// Error kinds reported by the recognition engine.
///
/// Only `NotAllowed` is fatal for a session; everything else is transient
/// and self-healing via the restart paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecognitionErrorKind {
    /// Microphone permission denied. Not transient, no retry.
    NotAllowed,
    /// Audio capture failed.
    Audio,
    /// Network-backed recognition failed.
    Network,
    /// The engine heard nothing recognizable.
    NoSpeech,
    /// Recognition was aborted (usually by our own stop).
    Aborted,
    /// Anything else the platform reports.
    Other(String),
}

impl RecognitionErrorKind {
    /// Returns true for errors that end the session permanently.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RecognitionErrorKind::NotAllowed)
    }
}

/// One normalized recognition result: trimmed, lowercased, tokenized.
///
/// Ephemeral: applied to the tracker as it arrives, never retained.
/// Interim hypotheses may be superseded by a later one for the same
/// utterance; the tracker applies each as it arrives since it cannot know
/// in advance which will be final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub words: Vec<String>,
    pub is_final: bool,
}

impl Hypothesis {
    /// Normalizes a raw transcript into a hypothesis.
    pub fn from_transcript(transcript: &str, is_final: bool) -> Self {
        Self {
            words: transcript
                .trim()
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            is_final,
        }
    }

    /// True when the transcript contained no words (silence misfire).
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypothesis_normalizes_transcript() {
        let hyp = Hypothesis::from_transcript("  The QUICK  brown ", false);
        assert_eq!(hyp.words, vec!["the", "quick", "brown"]);
        assert!(!hyp.is_final);
    }

    #[test]
    fn test_hypothesis_empty_transcript() {
        assert!(Hypothesis::from_transcript("   ", true).is_empty());
        assert!(Hypothesis::from_transcript("", false).is_empty());
    }

    #[test]
    fn test_only_not_allowed_is_fatal() {
        assert!(RecognitionErrorKind::NotAllowed.is_fatal());
        assert!(!RecognitionErrorKind::Audio.is_fatal());
        assert!(!RecognitionErrorKind::Network.is_fatal());
        assert!(!RecognitionErrorKind::NoSpeech.is_fatal());
        assert!(!RecognitionErrorKind::Aborted.is_fatal());
        assert!(!RecognitionErrorKind::Other("weird".to_string()).is_fatal());
    }

    #[test]
    fn test_platform_event_serializes() {
        let event = PlatformEvent::Result {
            transcript: "hello".to_string(),
            is_final: true,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PlatformEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
