//! Outbound presentation contract.
//!
//! The core never renders anything; it emits highlight/finished/listening
//! notifications through a pluggable sink, in order, exactly once each per
//! session.

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Pluggable presentation handler.
///
/// Contract per session: `highlight` indices arrive in strictly increasing
/// order and are never retracted; `finished` arrives at most once, after
/// the settle delay; `listening_active` drives the enabled state of stop
/// controls.
pub trait PresentationSink: Send {
    /// Script word `index` has been passed.
    fn highlight(&mut self, index: usize);

    /// The whole script has been read and the settle delay elapsed.
    fn finished(&mut self);

    /// Listening started or stopped.
    fn listening_active(&mut self, active: bool);

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Serializable form of the presentation calls, for UI bridges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationUpdate {
    Highlight { index: usize },
    Finished,
    ListeningActive { active: bool },
}

/// Sink that collects every update for later inspection.
///
/// The update log is shared behind an `Arc` so callers keep a handle after
/// the sink moves into the session.
#[derive(Debug, Clone, Default)]
pub struct CollectorSink {
    updates: Arc<Mutex<Vec<PresentationUpdate>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collected updates.
    pub fn updates(&self) -> Arc<Mutex<Vec<PresentationUpdate>>> {
        self.updates.clone()
    }

    /// Snapshot of the collected updates.
    pub fn snapshot(&self) -> Vec<PresentationUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn push(&self, update: PresentationUpdate) {
        self.updates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(update);
    }
}

impl PresentationSink for CollectorSink {
    fn highlight(&mut self, index: usize) {
        self.push(PresentationUpdate::Highlight { index });
    }

    fn finished(&mut self) {
        self.push(PresentationUpdate::Finished);
    }

    fn listening_active(&mut self, active: bool) {
        self.push(PresentationUpdate::ListeningActive { active });
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Sink that forwards updates over a crossbeam channel.
///
/// Lets a synchronous UI thread consume updates without touching the async
/// session loop. A disconnected receiver is logged once and then ignored;
/// the session must outlive a closed UI, not crash with it.
pub struct ChannelSink {
    tx: Sender<PresentationUpdate>,
    disconnected: bool,
}

impl ChannelSink {
    pub fn new(tx: Sender<PresentationUpdate>) -> Self {
        Self {
            tx,
            disconnected: false,
        }
    }

    fn send(&mut self, update: PresentationUpdate) {
        if self.disconnected {
            return;
        }
        if self.tx.send(update).is_err() {
            warn!("presentation receiver dropped, updates discarded");
            self.disconnected = true;
        }
    }
}

impl PresentationSink for ChannelSink {
    fn highlight(&mut self, index: usize) {
        self.send(PresentationUpdate::Highlight { index });
    }

    fn finished(&mut self) {
        self.send(PresentationUpdate::Finished);
    }

    fn listening_active(&mut self, active: bool) {
        self.send(PresentationUpdate::ListeningActive { active });
    }

    fn name(&self) -> &'static str {
        "channel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_collector_records_in_order() {
        let sink = CollectorSink::new();
        let mut boxed: Box<dyn PresentationSink> = Box::new(sink.clone());

        boxed.listening_active(true);
        boxed.highlight(0);
        boxed.highlight(1);
        boxed.finished();

        assert_eq!(
            sink.snapshot(),
            vec![
                PresentationUpdate::ListeningActive { active: true },
                PresentationUpdate::Highlight { index: 0 },
                PresentationUpdate::Highlight { index: 1 },
                PresentationUpdate::Finished,
            ]
        );
    }

    #[test]
    fn test_channel_sink_forwards_updates() {
        let (tx, rx) = unbounded();
        let mut sink = ChannelSink::new(tx);

        sink.highlight(3);
        sink.finished();

        assert_eq!(rx.recv().unwrap(), PresentationUpdate::Highlight { index: 3 });
        assert_eq!(rx.recv().unwrap(), PresentationUpdate::Finished);
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (tx, rx) = unbounded();
        let mut sink = ChannelSink::new(tx);
        drop(rx);

        // Must not panic, first failure flips the disconnected flag.
        sink.highlight(0);
        sink.listening_active(false);
    }

    #[test]
    fn test_update_json_shape() {
        let json = serde_json::to_string(&PresentationUpdate::Highlight { index: 2 }).unwrap();
        assert_eq!(json, r#"{"Highlight":{"index":2}}"#);
    }
}
