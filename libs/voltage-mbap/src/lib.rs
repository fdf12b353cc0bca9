//! VoltageEMS Modbus TCP client codec
//!
//! Turns typed requests into MBAP frames, tracks which transactions are
//! waiting for an answer, reassembles frames out of an arbitrary byte stream
//! and decodes responses back into typed results.
//!
//! # Architecture
//!
//! ```text
//! caller -> ModbusTcpClient -> Request::encode_payload + encode_frame
//!                           -> TransactionRegistry::register
//!                           -> Transport::write
//!
//! socket -> ModbusTcpClient::feed -> FrameBuffer -> TransactionRegistry::take
//!                                 -> decode -> ResponseHandler
//! ```
//!
//! # Supported Function Codes
//!
//! | Code | Function |
//! |------|----------|
//! | 0x02 | Read Discrete Inputs |
//! | 0x03 | Read Holding Registers |
//! | 0x04 | Read Input Registers |
//! | 0x05 | Write Single Coil |
//! | 0x06 | Write Single Register |
//! | 0x0F | Write Multiple Coils |
//! | 0x10 | Write Multiple Registers |
//!
//! # Example
//!
//! ```rust,no_run
//! use voltage_mbap::{ClientConfig, ClientEvent, ModbusTcpSession};
//!
//! # async fn run() -> voltage_mbap::Result<()> {
//! let config = ClientConfig::new("127.0.0.1", 502);
//! let session = ModbusTcpSession::connect(&config, |event: ClientEvent| {
//!     println!("{:?}", event);
//! })
//! .await?;
//!
//! session.client().read_holding_registers(0x0000, 2)?;
//! # Ok(())
//! # }
//! ```

pub mod bits;
pub mod client;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod framer;
pub mod registry;
pub mod request;
pub mod session;
pub mod transport;

pub use client::{ClientEvent, ModbusTcpClient, ResponseHandler};
pub use config::ClientConfig;
pub use decoder::{decode, Response};
pub use encoder::encode_frame;
pub use error::{DiscardReason, MbapError, Result, TransportError};
pub use frame::Frame;
pub use framer::{FrameBuffer, MbapCodec};
pub use registry::TransactionRegistry;
pub use request::Request;
pub use session::{ModbusTcpSession, SharedClient};
pub use transport::{ChannelTransport, Transport};
