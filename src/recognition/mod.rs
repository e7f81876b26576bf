//! Recognition capability seam, event normalization and restart policy.

pub mod adapter;
pub mod capability;
pub mod events;

pub use adapter::{AdapterSignal, AdapterState, RecognitionAdapter};
pub use capability::{MockRecognizer, RecognitionCapability, RecognitionSettings, RecognizerCall};
pub use events::{Hypothesis, PlatformEvent, RecognitionErrorKind};
