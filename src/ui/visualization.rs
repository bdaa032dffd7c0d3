pub mod spectrogram;
pub mod spectrum;

use super::axis::AxisRanges;
use async_channel::Sender;

/// Display-only state pushed from the block to its view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    Axes(AxisRanges),
    Title(String),
    XAxis(bool),
    YAxis(bool),
}

/// Fan-out of "frequency selected" events to subscribers.
#[derive(Debug, Default)]
pub struct SelectionEvents {
    subscribers: Vec<Sender<f64>>,
}

impl SelectionEvents {
    pub fn subscribe(&mut self) -> async_channel::Receiver<f64> {
        let (sender, receiver) = async_channel::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    pub fn emit(&mut self, frequency_hz: f64) {
        self.subscribers
            .retain(|subscriber| subscriber.try_send(frequency_hz).is_ok());
    }
}
