use alloy::{
    contract::Error as ContractError,
    transports::{RpcError, TransportErrorKind},
};

/// How a failed call should be treated by the executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Infrastructure flakiness: rate limits, dropped connections, timeouts, lagging nodes.
    /// Worth retrying against another endpoint.
    Transient,
    /// Anything else. Retrying elsewhere would fail the same way.
    Fatal,
}

/// Classifies an error as [`Severity::Transient`] or [`Severity::Fatal`].
pub trait Classify {
    fn severity(&self) -> Severity;

    fn is_transient(&self) -> bool {
        self.severity() == Severity::Transient
    }
}

/// Lower-case fragments that mark an error message as transient.
pub const TRANSIENT_INDICATORS: &[&str] = &[
    "http error 429",
    "status code 429",
    "error code 429",
    "too many requests",
    "rate limit",
    "rate-limit",
    "exceeded the quota",
    "request limit",
    "connection pool",
    "pool timed out",
    "timeout",
    "timed out",
    "header not found",
    "non-existent block",
    "nonexistent block",
    "unknown block",
    "connection refused",
    "connection reset",
    "connection closed",
    "broken pipe",
    "error sending request",
    "backend connection task has stopped",
];

/// JSON-RPC error codes providers use for throttling (`-32005` is "limit exceeded").
const RATE_LIMIT_CODES: &[i64] = &[429, -32005];

const TRANSIENT_HTTP_STATUSES: &[u16] = &[408, 429, 502, 503, 504];

/// Classifies a free-form error message against [`TRANSIENT_INDICATORS`].
#[must_use]
pub fn classify_message(message: &str) -> Severity {
    let message = message.to_ascii_lowercase();
    if TRANSIENT_INDICATORS.iter().any(|indicator| message.contains(indicator)) {
        Severity::Transient
    } else {
        Severity::Fatal
    }
}

impl Classify for TransportErrorKind {
    fn severity(&self) -> Severity {
        match self {
            TransportErrorKind::BackendGone | TransportErrorKind::MissingBatchResponse(_) => {
                Severity::Transient
            }
            TransportErrorKind::HttpError(err) if TRANSIENT_HTTP_STATUSES.contains(&err.status) => {
                Severity::Transient
            }
            TransportErrorKind::HttpError(err) => classify_message(&err.body),
            TransportErrorKind::PubsubUnavailable => Severity::Fatal,
            other => classify_message(&other.to_string()),
        }
    }
}

impl Classify for RpcError<TransportErrorKind> {
    fn severity(&self) -> Severity {
        match self {
            RpcError::Transport(kind) => kind.severity(),
            RpcError::ErrorResp(payload) if RATE_LIMIT_CODES.contains(&payload.code) => {
                Severity::Transient
            }
            RpcError::ErrorResp(payload) => classify_message(&payload.message),
            // a node that answers `null` for a block it should know is lagging behind
            RpcError::NullResp => Severity::Transient,
            RpcError::DeserError { text, .. } => classify_message(text),
            other => classify_message(&other.to_string()),
        }
    }
}

impl Classify for ContractError {
    fn severity(&self) -> Severity {
        match self {
            ContractError::TransportError(err) => err.severity(),
            _ => Severity::Fatal,
        }
    }
}
