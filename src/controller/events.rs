//! Outbound notifications from the controller to views.

use std::sync::mpsc::{self, Receiver, Sender};

/// Change announced to every subscribed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Unit visibility flags changed and the spike projection was refreshed.
    UnitVisibilityChanged,
    /// The set of selected spikes changed.
    SpikeSelectionChanged,
}

/// Fan-out of controller events to any number of receivers.
#[derive(Debug, Default)]
pub(crate) struct EventHub {
    subscribers: Vec<Sender<ControllerEvent>>,
}

impl EventHub {
    pub(crate) fn subscribe(&mut self) -> Receiver<ControllerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event`, dropping subscribers whose receiver is gone.
    pub(crate) fn emit(&mut self, event: ControllerEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
