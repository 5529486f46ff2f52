use thiserror::Error;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::rpc_request::RpcError as RpcRequestError;
use std::time::Duration;

/// JSON-RPC codes a node returns while it is catching up or overloaded:
/// block not available, node unhealthy, block status not available yet,
/// minimum context slot not reached.
pub const TRANSIENT_RPC_CODES: [i64; 4] = [-32004, -32005, -32014, -32016];

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("RPC node responded with error {code}: {message}")]
    ResponseError { code: i64, message: String },

    #[error("RPC request rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout error after {0:?}")]
    TimeoutError(Duration),

    #[error("Transaction decode failed: {0}")]
    DecodeError(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

impl RpcError {
    /// JSON-RPC error code, when the node answered with one.
    pub fn response_code(&self) -> Option<i64> {
        match self {
            RpcError::ResponseError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the same call may succeed later, judging response errors
    /// against `transient_codes`.
    pub fn is_transient(&self, transient_codes: &[i64]) -> bool {
        match self {
            RpcError::ResponseError { code, .. } => transient_codes.contains(code),
            RpcError::RpcError(_) | RpcError::NetworkError(_) | RpcError::TimeoutError(_) => true,
            RpcError::Rejected(_) | RpcError::DecodeError(_) | RpcError::InvalidSignature(_) => false,
        }
    }
}

impl From<ClientError> for RpcError {
    fn from(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
                RpcError::NetworkError(error.to_string())
            }
            ClientErrorKind::SerdeJson(_) => RpcError::DecodeError(error.to_string()),
            ClientErrorKind::RpcError(RpcRequestError::RpcResponseError { code, message, .. }) => {
                RpcError::ResponseError {
                    code: *code,
                    message: message.clone(),
                }
            }
            ClientErrorKind::RpcError(RpcRequestError::ParseError(_)) => {
                RpcError::DecodeError(error.to_string())
            }
            ClientErrorKind::RpcError(RpcRequestError::RpcRequestError(_)) => {
                RpcError::RpcError(error.to_string())
            }
            _ => RpcError::Rejected(error.to_string()),
        }
    }
}
