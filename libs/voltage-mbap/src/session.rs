//! Modbus TCP session
//!
//! Owns the socket for one [`ModbusTcpClient`]: a writer task drains frames
//! queued by [`ChannelTransport`], a reader task feeds every received chunk
//! back into the client. The client (registry and receive buffer together)
//! sits behind one mutex shared by callers and the reader task.
//!
//! Events are queued under that mutex and handed to the response handler by
//! a separate dispatch task, so a handler may lock a [`SharedClient`] and
//! issue follow-up requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::{Mutex, MutexGuard};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::client::{ClientEvent, ModbusTcpClient, ResponseHandler};
use crate::config::ClientConfig;
use crate::constants::READ_BUFFER_SIZE;
use crate::error::{MbapError, Result};
use crate::transport::ChannelTransport;

/// Client handle shared between callers and the reader task
pub type SharedClient = Arc<Mutex<ModbusTcpClient<ChannelTransport>>>;

/// A connected Modbus TCP client
#[derive(Debug)]
pub struct ModbusTcpSession {
    client: SharedClient,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
    closed: Arc<AtomicBool>,
}

impl ModbusTcpSession {
    /// Connect to the configured server and start the I/O tasks
    pub async fn connect(
        config: &ClientConfig,
        handler: impl ResponseHandler + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let addr = config.address();
        debug!("TCP connecting: {}", addr);

        let stream = match timeout(config.connect_timeout(), TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                error!("TCP err: {} - {}", addr, e);
                return Err(MbapError::connection(format!(
                    "Failed to connect to {addr}: {e}"
                )));
            },
            Err(_) => {
                warn!("TCP timeout: {}", addr);
                return Err(MbapError::timeout(format!(
                    "Connection to {addr} timed out"
                )));
            },
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("TCP_NODELAY: {}", e);
        }

        info!("TCP connected: {}", addr);
        Ok(Self::from_stream(stream, config.unit_id, handler))
    }

    /// Start a session over an already connected stream
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_stream(
        stream: TcpStream,
        unit_id: u8,
        handler: impl ResponseHandler + 'static,
    ) -> Self {
        let (read_half, write_half) = stream.into_split();
        let (transport, rx) = ChannelTransport::new();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let queue_event = move |event: ClientEvent| {
            let _ = event_tx.send(event);
        };
        let client: SharedClient = Arc::new(Mutex::new(
            ModbusTcpClient::new(transport, queue_event).with_unit_id(unit_id),
        ));
        let closed = Arc::new(AtomicBool::new(false));

        let writer = tokio::spawn(write_loop(write_half, rx));
        let reader = tokio::spawn(read_loop(read_half, client.clone(), closed.clone()));
        let dispatcher = tokio::spawn(dispatch_loop(event_rx, handler));

        Self {
            client,
            reader,
            writer,
            dispatcher,
            closed,
        }
    }

    /// Lock the client to issue requests or inspect pending transactions
    pub fn client(&self) -> MutexGuard<'_, ModbusTcpClient<ChannelTransport>> {
        self.client.lock()
    }

    /// Shared handle to the client, for use outside the session (e.g. from
    /// the response handler)
    pub fn shared_client(&self) -> SharedClient {
        self.client.clone()
    }

    /// True once the reader has seen EOF or a socket error
    ///
    /// From then on every request fails with a transport error.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stop the I/O and dispatch tasks
    pub fn shutdown(self) {
        // Drop aborts the tasks
        info!("TCP session shutdown");
    }
}

impl Drop for ModbusTcpSession {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
        self.dispatcher.abort();
    }
}

async fn write_loop(mut stream: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<Bytes>) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = stream.write_all(&frame).await {
            error!("TCP TX: {}", e);
            break;
        }
        debug!("TCP TX: {}B", frame.len());
    }
}

async fn read_loop(mut stream: OwnedReadHalf, client: SharedClient, closed: Arc<AtomicBool>) {
    let mut buffer = BytesMut::with_capacity(READ_BUFFER_SIZE);

    loop {
        buffer.clear();
        match stream.read_buf(&mut buffer).await {
            Ok(0) => {
                info!("TCP closed by peer");
                break;
            },
            Ok(n) => {
                debug!("TCP RX: {}B", n);
                client.lock().feed(&buffer);
            },
            Err(e) => {
                error!("TCP RX: {}", e);
                break;
            },
        }
    }

    client.lock().disconnect();
    closed.store(true, Ordering::Release);
}

async fn dispatch_loop(
    mut events: mpsc::UnboundedReceiver<ClientEvent>,
    mut handler: impl ResponseHandler,
) {
    while let Some(event) = events.recv().await {
        handler.handle(event);
    }
}
