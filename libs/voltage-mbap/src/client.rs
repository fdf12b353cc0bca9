//! Modbus TCP client facade
//!
//! Outgoing: build a [`Request`], encode it, register its transaction and hand
//! the frame to the transport. Incoming: feed received chunks to the framer,
//! match each frame to its pending request and deliver decoded results to the
//! [`ResponseHandler`].
//!
//! Everything runs in the caller's context. When send and receive happen on
//! different tasks, wrap the client in a single mutex (see
//! [`ModbusTcpSession`](crate::session::ModbusTcpSession)).

use tracing::{debug, error, warn};

use crate::constants::DEFAULT_UNIT_ID;
use crate::decoder::{decode, Response};
use crate::encoder::encode_frame;
use crate::error::{DiscardReason, Result};
use crate::frame::Frame;
use crate::framer::FrameBuffer;
use crate::registry::TransactionRegistry;
use crate::request::Request;
use crate::transport::Transport;

/// Something delivered to the response handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A decoded result for a pending request
    Response {
        transaction_id: u16,
        response: Response,
    },
    /// A received frame that produced no result
    Discarded {
        transaction_id: u16,
        reason: DiscardReason,
    },
}

/// Receives client events
pub trait ResponseHandler: Send {
    fn handle(&mut self, event: ClientEvent);
}

impl<F> ResponseHandler for F
where
    F: FnMut(ClientEvent) + Send,
{
    fn handle(&mut self, event: ClientEvent) {
        self(event)
    }
}

/// Modbus TCP client over an arbitrary [`Transport`]
pub struct ModbusTcpClient<T: Transport> {
    unit_id: u8,
    transport: T,
    registry: TransactionRegistry,
    framer: FrameBuffer,
    handler: Box<dyn ResponseHandler>,
}

impl<T: Transport> ModbusTcpClient<T> {
    /// Create a client with unit id 0 and the transaction counter at 1
    pub fn new(transport: T, handler: impl ResponseHandler + 'static) -> Self {
        Self {
            unit_id: DEFAULT_UNIT_ID,
            transport,
            registry: TransactionRegistry::new(),
            framer: FrameBuffer::new(),
            handler: Box::new(handler),
        }
    }

    /// Set the unit identifier carried by every request
    pub fn with_unit_id(mut self, unit_id: u8) -> Self {
        self.unit_id = unit_id;
        self
    }

    pub fn unit_id(&self) -> u8 {
        self.unit_id
    }

    /// FC06
    pub fn write_single_register(&mut self, address: u16, value: u16) -> Result<u16> {
        self.send(Request::WriteSingleRegister { address, value })
    }

    /// FC03
    pub fn read_holding_registers(&mut self, start_address: u16, count: u16) -> Result<u16> {
        self.send(Request::ReadHoldingRegisters {
            start_address,
            count,
        })
    }

    /// FC04
    pub fn read_input_registers(&mut self, start_address: u16, count: u16) -> Result<u16> {
        self.send(Request::ReadInputRegisters {
            start_address,
            count,
        })
    }

    /// FC05
    pub fn force_single_coil(&mut self, address: u16, value: bool) -> Result<u16> {
        self.send(Request::ForceSingleCoil { address, value })
    }

    /// FC15, at most 2040 coils
    pub fn force_multiple_coils(&mut self, start_address: u16, values: &[bool]) -> Result<u16> {
        self.send(Request::ForceMultipleCoils {
            start_address,
            values: values.to_vec(),
        })
    }

    /// FC02
    pub fn read_input_status(&mut self, start_address: u16, count: u16) -> Result<u16> {
        self.send(Request::ReadInputStatus {
            start_address,
            count,
        })
    }

    /// FC16, at most 255 registers
    pub fn preset_multiple_registers(&mut self, start_address: u16, values: &[u16]) -> Result<u16> {
        self.send(Request::PresetMultipleRegisters {
            start_address,
            values: values.to_vec(),
        })
    }

    /// Encode, register and transmit a request, returning its transaction id
    ///
    /// An oversize request fails before a transaction id is allocated. The
    /// transaction is registered before the frame reaches the transport, and
    /// removed again if the transport rejects it.
    pub fn send(&mut self, request: Request) -> Result<u16> {
        let function_code = request.function_code();
        let payload = request.encode_payload().map_err(|e| {
            warn!("Request rejected: {}", e);
            e
        })?;

        let transaction_id = self.registry.allocate();
        let frame = encode_frame(transaction_id, self.unit_id, function_code, &payload);
        self.registry.register(transaction_id, request);

        if let Err(e) = self.transport.write(frame) {
            error!("TX trans_id={:04X}: {}", transaction_id, e);
            self.registry.take(transaction_id);
            return Err(e.into());
        }

        Ok(transaction_id)
    }

    /// Feed bytes received from the transport
    ///
    /// Returns the number of complete frames processed. Discards are reported
    /// to the handler; the client always stays ready for more bytes.
    pub fn feed(&mut self, chunk: &[u8]) -> usize {
        let frames = self.framer.feed(chunk);
        for frame in &frames {
            self.process_frame(frame);
        }
        frames.len()
    }

    fn process_frame(&mut self, frame: &Frame) {
        let transaction_id = frame.transaction_id();

        let Some(request) = self.registry.take(transaction_id) else {
            warn!(
                "Ignoring response with unknown transaction ID: {:04X}, pending={}",
                transaction_id,
                self.registry.len()
            );
            self.handler.handle(ClientEvent::Discarded {
                transaction_id,
                reason: DiscardReason::UnknownTransaction,
            });
            return;
        };

        match decode(frame, request) {
            Ok(responses) => {
                debug!(
                    "Validated TCP response: trans_id={:04X}, results={}",
                    transaction_id,
                    responses.len()
                );
                for response in responses {
                    self.handler.handle(ClientEvent::Response {
                        transaction_id,
                        response,
                    });
                }
            },
            Err(reason) => {
                warn!("Discarding trans_id={:04X}: {}", transaction_id, reason);
                self.handler.handle(ClientEvent::Discarded {
                    transaction_id,
                    reason,
                });
            },
        }
    }

    /// Mark the connection as gone
    ///
    /// Later requests fail with [`TransportError::Disconnected`] and any
    /// partial frame is dropped. Requests already pending stay registered.
    ///
    /// [`TransportError::Disconnected`]: crate::error::TransportError::Disconnected
    pub fn disconnect(&mut self) {
        let mut pending = self.registry.pending_ids();
        pending.sort_unstable();
        warn!(
            "Transport closed: {}B partial frame dropped, unanswered trans_ids={:04X?}",
            self.framer.buffered(),
            pending
        );
        self.transport.close();
        self.framer.clear();
    }

    /// Number of requests still waiting for a response
    pub fn pending(&self) -> usize {
        self.registry.len()
    }

    pub fn is_pending(&self, transaction_id: u16) -> bool {
        self.registry.contains(transaction_id)
    }

    /// Transaction id the next request will use
    pub fn next_transaction_id(&self) -> u16 {
        self.registry.peek_next()
    }

    /// Bytes of an incomplete frame held by the framer
    pub fn buffered(&self) -> usize {
        self.framer.buffered()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for ModbusTcpClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModbusTcpClient")
            .field("unit_id", &self.unit_id)
            .field("transport", &self.transport)
            .field("registry", &self.registry)
            .field("framer", &self.framer)
            .finish_non_exhaustive()
    }
}
