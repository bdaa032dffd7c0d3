//! Handoff from the producer context to the display context.
//!
//! Rows travel over a bounded channel; when the display lags and the channel
//! is full the oldest pending row is displaced, so the producer never blocks
//! and the display still observes rows in append order.

use async_channel::{Receiver, Sender};
use tracing::debug;

pub const ROW_CHANNEL_CAPACITY: usize = 64;

pub fn row_channel<T>(capacity: usize) -> (RowSender<T>, Receiver<T>) {
    let (sender, receiver) = async_channel::bounded(capacity.max(1));
    (RowSender { sender, dropped: 0 }, receiver)
}

#[derive(Debug)]
pub struct RowSender<T> {
    sender: Sender<T>,
    dropped: u64,
}

impl<T> RowSender<T> {
    /// Enqueues without blocking. Returns `false` once the display side is gone.
    pub fn send(&mut self, message: T) -> bool {
        match self.sender.force_send(message) {
            Ok(None) => true,
            Ok(Some(_displaced)) => {
                self.dropped += 1;
                debug!(
                    "[row-tap] display lagging; displaced oldest pending row (total {})",
                    self.dropped
                );
                true
            }
            Err(_) => false,
        }
    }

    /// Rows displaced by newer ones since the channel opened.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Closes the channel; rows already queued stay readable.
    pub fn close(&self) {
        if self.sender.close() {
            debug!("[row-tap] row channel closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_channel_displaces_oldest_and_keeps_order() {
        let (mut sender, receiver) = row_channel::<u32>(3);
        for value in 0..5 {
            assert!(sender.send(value));
        }
        assert_eq!(sender.dropped(), 2);

        let drained: Vec<u32> = std::iter::from_fn(|| receiver.try_recv().ok()).collect();
        assert_eq!(drained, vec![2, 3, 4]);
    }

    #[test]
    fn send_reports_closed_receiver() {
        let (mut sender, receiver) = row_channel::<u32>(2);
        drop(receiver);
        assert!(!sender.send(1));
        assert_eq!(sender.dropped(), 0);
    }

    #[test]
    fn close_leaves_pending_rows_readable() {
        let (mut sender, receiver) = row_channel::<u32>(4);
        sender.send(7);
        sender.close();
        assert_eq!(receiver.try_recv().ok(), Some(7));
        assert!(receiver.try_recv().is_err());
        assert!(receiver.is_closed());
    }
}
