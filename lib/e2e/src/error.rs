use std::time::Duration;

use alloy::{
    hex,
    providers::PendingTransactionError,
    rpc::types::TransactionReceipt,
    sol_types::SolError,
    transports::{RpcError, TransportError, TransportErrorKind},
};

/// Convenience alias used across the harness.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while talking to the node.
///
/// Each variant carries the call that failed (JSON-RPC method or contract
/// method, with its arguments) so that a failure can be reproduced from the
/// test output alone.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The node could not be reached.
    #[error("{call}: node unreachable: {reason}")]
    Connection {
        /// Failed call.
        call: String,
        /// Transport level reason.
        reason: String,
    },
    /// The node answered with an error.
    #[error("{call}: rpc error {}: {message}", .code.map_or_else(|| "-".to_string(), |c| c.to_string()))]
    Rpc {
        /// Failed call.
        call: String,
        /// JSON-RPC error code, if the node sent one.
        code: Option<i64>,
        /// Error message.
        message: String,
        /// Raw `data` field of the error payload (revert data for reverted
        /// `eth_call`s).
        data: Option<String>,
    },
    /// The transaction was mined but its execution failed.
    #[error("{call}: transaction {} reverted (gas used {})", .receipt.transaction_hash, .receipt.gas_used)]
    Reverted {
        /// Failed call.
        call: String,
        /// Receipt of the failed transaction.
        receipt: Box<TransactionReceipt>,
    },
    /// The node did not answer in time.
    #[error("{call}: timed out after {after:?}")]
    Timeout {
        /// Failed call.
        call: String,
        /// Configured timeout.
        after: Duration,
    },
    /// A contract could not be deployed.
    #[error("deployment of {contract} failed: {reason}")]
    Deployment {
        /// Name of the contract (or `<unnamed>`).
        contract: String,
        /// Why the deployment failed.
        reason: String,
    },
    /// Method lookup, argument encoding or output decoding failed.
    #[error("{call}: abi error: {reason}")]
    Abi {
        /// Failed call.
        call: String,
        /// Encoder or decoder message.
        reason: String,
    },
    /// A contract artifact could not be loaded.
    #[error("invalid contract artifact: {0}")]
    Artifact(String),
    /// An environment variable is malformed.
    #[error("invalid configuration in {var}: {reason}")]
    Config {
        /// Offending variable.
        var: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl Error {
    /// Classify a transport level failure of `call`.
    pub(crate) fn from_rpc(call: impl Into<String>, err: TransportError) -> Self {
        let call = call.into();
        match err {
            RpcError::ErrorResp(payload) => Self::Rpc {
                call,
                code: Some(payload.code),
                message: payload.message.to_string(),
                data: payload.data.map(|data| data.get().to_owned()),
            },
            RpcError::Transport(kind) => match kind {
                // The node answered, just not with JSON-RPC.
                TransportErrorKind::HttpError(_) => Self::Rpc {
                    call,
                    code: None,
                    message: kind.to_string(),
                    data: None,
                },
                _ => Self::Connection { call, reason: kind.to_string() },
            },
            other => Self::Rpc {
                call,
                code: None,
                message: other.to_string(),
                data: None,
            },
        }
    }

    /// Classify a failure while waiting for a transaction to be mined.
    pub(crate) fn from_pending(
        call: impl Into<String>,
        err: PendingTransactionError,
    ) -> Self {
        match err {
            PendingTransactionError::TransportError(err) => {
                Self::from_rpc(call, err)
            }
            other => Self::Rpc {
                call: call.into(),
                code: None,
                message: other.to_string(),
                data: None,
            },
        }
    }

    /// Whether the node reported an execution revert, either while mining
    /// the transaction or while executing an `eth_call`.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        match self {
            Self::Reverted { .. } => true,
            Self::Rpc { message, .. } => {
                message.to_ascii_lowercase().contains("revert")
            }
            _ => false,
        }
    }

    /// Checks that `self` is an `eth_call` revert carrying the typed
    /// abi-encoded error `expected`.
    #[must_use]
    pub fn reverted_with<E: SolError>(&self, expected: &E) -> bool {
        let Self::Rpc { data: Some(data), .. } = self else {
            return false;
        };

        let actual = data.trim_matches('"');
        let actual = actual.strip_prefix("0x").unwrap_or(actual);
        let expected = hex::encode(expected.abi_encode());
        actual.eq_ignore_ascii_case(&expected)
    }
}
