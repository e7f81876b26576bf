//! Session orchestration and the outbound presentation contract.

pub mod controller;
pub mod sink;

pub use controller::{
    ControlEvent, SessionController, SessionHandle, SessionState, SessionTiming, TimerKind,
};
pub use sink::{ChannelSink, CollectorSink, PresentationSink, PresentationUpdate};
