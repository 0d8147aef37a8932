use std::time::Duration;

use thiserror::Error;

use crate::failover::{Classify, Endpoint, Severity};

/// Failure to open a live connection to a single endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The transport could not be established.
    #[error("Endpoint {endpoint} is unreachable: {reason}")]
    Unreachable { endpoint: Endpoint, reason: String },

    /// The transport was established but the liveness probe failed or timed out.
    #[error("Endpoint {endpoint} is not live: {reason}")]
    NotLive { endpoint: Endpoint, reason: String },
}

impl ConnectError {
    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            ConnectError::Unreachable { endpoint, .. } | ConnectError::NotLive { endpoint, .. } => {
                endpoint
            }
        }
    }
}

/// Every candidate endpoint failed to open.
///
/// `attempts` lists each attempted endpoint exactly once, in registry order, with the reason
/// it failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("All providers exhausted ({count} attempted)", count = .attempts.len())]
pub struct AllProvidersExhausted {
    pub attempts: Vec<ConnectError>,
}

impl AllProvidersExhausted {
    /// The attempted endpoints, in the order they were tried.
    pub fn attempted(&self) -> impl Iterator<Item = &Endpoint> {
        self.attempts.iter().map(ConnectError::endpoint)
    }
}

/// The raw outcome of a single failed call attempt.
#[derive(Error, Debug)]
pub enum CallFailure<E> {
    /// The call itself returned an error.
    #[error("{0}")]
    Call(E),

    /// The call did not complete within the configured call timeout.
    #[error("Call timed out after {0:?}")]
    Timeout(Duration),
}

impl<E> CallFailure<E> {
    /// Returns the call error, if this failure was not a timeout.
    #[must_use]
    pub fn as_call_error(&self) -> Option<&E> {
        match self {
            CallFailure::Call(err) => Some(err),
            CallFailure::Timeout(_) => None,
        }
    }
}

impl<E: Classify> Classify for CallFailure<E> {
    fn severity(&self) -> Severity {
        match self {
            CallFailure::Call(err) => err.severity(),
            CallFailure::Timeout(_) => Severity::Transient,
        }
    }
}

/// Error returned by [`FailoverProvider::execute`](crate::failover::FailoverProvider::execute).
#[derive(Error, Debug)]
pub enum ExecuteError<E> {
    /// The call failed in a way another endpoint cannot fix. No failover was attempted.
    #[error("Fatal call error: {0}")]
    Fatal(E),

    /// The call failed transiently and every fallback failed too.
    ///
    /// Carries the error from the first attempt, which usually names the root cause, and the
    /// endpoints the call was attempted against.
    #[error(
        "All providers exhausted after {count} call attempt(s), original error: {original}",
        count = .attempted.len()
    )]
    AllProvidersExhausted { original: CallFailure<E>, attempted: Vec<Endpoint> },
}

impl<E> ExecuteError<E> {
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecuteError::Fatal(_))
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, ExecuteError::AllProvidersExhausted { .. })
    }
}
