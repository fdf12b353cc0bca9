//! Error Types
//!
//! `MbapError` is returned synchronously to callers. `DiscardReason` describes
//! a received frame that was dropped; it is reported through the response
//! handler and never aborts frame processing.

use thiserror::Error;

/// Result type for voltage-mbap operations
pub type Result<T> = std::result::Result<T, MbapError>;

/// Client errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MbapError {
    /// Request payload exceeds what the frame encoder accepts
    #[error("Oversize request: FC{function_code:02X} with {count} values (limit {limit})")]
    OversizeRequest {
        function_code: u8,
        count: usize,
        limit: usize,
    },

    /// Transport rejected an encoded frame
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout errors
    #[error("Timeout: {0}")]
    Timeout(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for MbapError {
    fn from(err: std::io::Error) -> Self {
        MbapError::Io(err.to_string())
    }
}

impl From<figment::Error> for MbapError {
    fn from(err: figment::Error) -> Self {
        MbapError::Config(err.to_string())
    }
}

impl MbapError {
    pub fn connection(msg: impl Into<String>) -> Self {
        MbapError::Connection(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        MbapError::Timeout(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        MbapError::Config(msg.into())
    }

    /// Check if this error means the connection is gone
    pub fn needs_reconnect(&self) -> bool {
        matches!(
            self,
            MbapError::Transport(TransportError::Disconnected) | MbapError::Connection(_)
        )
    }
}

/// Errors raised by a [`Transport`](crate::transport::Transport) write
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Writer side has gone away
    #[error("Not connected")]
    Disconnected,

    /// Socket-level failure
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// Why a received frame produced no result
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// No pending request carries the frame's transaction id
    #[error("Unknown transaction")]
    UnknownTransaction,

    /// Response function code differs from the request's
    #[error("Function code mismatch: expected FC{expected:02X}, got FC{actual:02X}")]
    FunctionCodeMismatch {
        expected: u8,
        actual: u8,
        /// Exception code when `actual` has the exception bit set
        exception_code: Option<u8>,
    },

    /// Frame too short for what its header or byte count declares
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),
}

impl DiscardReason {
    pub fn malformed(msg: impl Into<String>) -> Self {
        DiscardReason::MalformedFrame(msg.into())
    }
}
