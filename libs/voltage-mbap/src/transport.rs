//! Transport seam
//!
//! The client only needs somewhere to put encoded frames. Socket lifecycle
//! lives behind this trait.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::TransportError;

/// Sink for encoded frames
pub trait Transport: Send {
    fn write(&mut self, frame: Bytes) -> Result<(), TransportError>;

    /// Refuse further writes. Called once the connection is known to be gone.
    fn close(&mut self) {}
}

/// Queues frames for an async writer task
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: Option<mpsc::UnboundedSender<Bytes>>,
}

impl ChannelTransport {
    /// Create a transport and the receiving end the writer task drains
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().map_or(true, |tx| tx.is_closed())
    }
}

impl Transport for ChannelTransport {
    fn write(&mut self, frame: Bytes) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Disconnected)?;
        let len = frame.len();
        tx.send(frame).map_err(|_| TransportError::Disconnected)?;
        debug!("TX queued: {}B", len);
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the sender ends the writer task once the queue drains
        self.tx = None;
    }
}
