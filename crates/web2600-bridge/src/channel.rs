use crate::error::BridgeError;
use crate::message::WorkerMessage;
use crossbeam_channel::{Receiver, Sender};

/// Outbound side of the worker/page channel.
///
/// Posting is fire-and-forget: no acknowledgement, no backpressure. Delivery
/// order per sender is whatever the underlying channel guarantees.
pub trait MessageChannel {
    fn post(&self, message: WorkerMessage) -> Result<(), BridgeError>;
}

/// In-process channel for native hosts and tests
pub struct QueueChannel {
    tx: Sender<WorkerMessage>,
}

impl QueueChannel {
    pub fn unbounded() -> (Self, Receiver<WorkerMessage>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl MessageChannel for QueueChannel {
    fn post(&self, message: WorkerMessage) -> Result<(), BridgeError> {
        self.tx
            .send(message)
            .map_err(|e| BridgeError::Channel(format!("receiver dropped, lost `{}`", e.0.cmd())))
    }
}

impl<C: MessageChannel + ?Sized> MessageChannel for &C {
    fn post(&self, message: WorkerMessage) -> Result<(), BridgeError> {
        (**self).post(message)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_queue_channel_preserves_order() {
        let (channel, rx) = QueueChannel::unbounded();
        channel.post(WorkerMessage::Log { msg: "a".into() }).unwrap();
        channel.post(WorkerMessage::Log { msg: "b".into() }).unwrap();

        let got: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            got,
            vec![
                WorkerMessage::Log { msg: "a".into() },
                WorkerMessage::Log { msg: "b".into() },
            ]
        );
    }

    #[test]
    fn test_queue_channel_reports_dropped_receiver() {
        let (channel, rx) = QueueChannel::unbounded();
        drop(rx);

        let err = channel
            .post(WorkerMessage::UpdateCanvasSize { width: 1, height: 1 })
            .unwrap_err();
        match err {
            BridgeError::Channel(reason) => assert!(reason.contains("updateCanvasSize")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
