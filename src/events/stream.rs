//! Caller-owned stream handle with an explicit lifecycle.
//!
//! The transport (WebSocket, SSE, a test harness) publishes through a
//! cloneable [`StreamSender`]; the canvas side drains the paired
//! [`StreamHandle`]. There is no module-level connection state: the handle
//! is created with [`StreamHandle::open`], passed to whoever drives
//! ingestion, and torn down with [`StreamHandle::close`]. Reconnect and
//! backoff live with the transport, not here.

use thiserror::Error;

use super::event::ExecutionEvent;

/// One message on the stream channel: an event or a connectivity edge.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamSignal {
    /// An execution event, in delivery order.
    Event(ExecutionEvent),
    /// The transport (re-)established its connection.
    Connected,
    /// The transport lost its connection. Not an error; state is kept.
    Disconnected,
}

/// Error returned when publishing into a closed stream.
#[derive(Debug, Error)]
#[error("topology stream closed")]
pub struct StreamClosed;

/// Producer half of the stream channel; cheap to clone.
#[derive(Clone, Debug)]
pub struct StreamSender {
    sender: flume::Sender<StreamSignal>,
}

impl StreamSender {
    /// Publish an execution event.
    pub fn event(&self, event: ExecutionEvent) -> Result<(), StreamClosed> {
        self.send(StreamSignal::Event(event))
    }

    /// Signal that the transport connected.
    pub fn connected(&self) -> Result<(), StreamClosed> {
        self.send(StreamSignal::Connected)
    }

    /// Signal that the transport disconnected.
    pub fn disconnected(&self) -> Result<(), StreamClosed> {
        self.send(StreamSignal::Disconnected)
    }

    fn send(&self, signal: StreamSignal) -> Result<(), StreamClosed> {
        self.sender.send(signal).map_err(|_| StreamClosed)
    }
}

/// Consumer half of the stream channel.
///
/// Signals arrive strictly in publish order (the channel is the delivery
/// order the ingestion state machine trusts).
///
/// # Examples
///
/// ```rust
/// use toposync::events::{ExecutionEvent, StreamHandle, StreamSignal};
///
/// let (sender, handle) = StreamHandle::open();
/// sender.connected().unwrap();
/// sender.event(ExecutionEvent::entered("coder", 1.0)).unwrap();
///
/// assert_eq!(handle.try_recv(), Some(StreamSignal::Connected));
/// assert!(matches!(handle.try_recv(), Some(StreamSignal::Event(_))));
/// assert_eq!(handle.try_recv(), None);
/// ```
#[derive(Debug)]
pub struct StreamHandle {
    receiver: flume::Receiver<StreamSignal>,
}

impl StreamHandle {
    /// Open a stream, returning the producer and consumer halves.
    #[must_use]
    pub fn open() -> (StreamSender, StreamHandle) {
        let (sender, receiver) = flume::unbounded();
        (StreamSender { sender }, StreamHandle { receiver })
    }

    /// Receive the next signal, waiting if none is queued.
    ///
    /// Returns `None` once the stream is closed and drained.
    pub fn recv(&self) -> Option<StreamSignal> {
        self.receiver.recv().ok()
    }

    /// Receive the next signal without blocking.
    pub fn try_recv(&self) -> Option<StreamSignal> {
        self.receiver.try_recv().ok()
    }

    /// Receive the next signal, suspending cooperatively until one arrives.
    pub async fn recv_async(&self) -> Option<StreamSignal> {
        self.receiver.recv_async().await.ok()
    }

    /// Close the stream. Subsequent publishes fail with [`StreamClosed`];
    /// already-queued signals are dropped with the handle.
    pub fn close(self) {
        drop(self);
    }
}
