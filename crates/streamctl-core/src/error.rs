use std::fmt;

use serde::{Deserialize, Serialize};

/// Error taxonomy for the admin engine.
///
/// These are engine-level kinds, not wire transport codes — a `Broker`
/// variant carries whatever numeric error code the cluster member sent back
/// verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminErrorKind {
    /// Caller passed a malformed value or violated a documented constraint.
    InvalidArg,
    /// The request-level deadline elapsed before a response arrived.
    TimedOut,
    /// More than one `BROKER` resource was given to a config API.
    Conflict,
    /// The reply structure did not match expectations (arity, unknown or
    /// duplicate element).
    BadMsg,
    /// In-engine cancellation due to client shutdown. Never delivered to
    /// the application as a result event.
    Destroy,
    /// A cluster-member error code, forwarded verbatim.
    Broker(i16),
}

impl AdminErrorKind {
    /// True for the one kind that must never reach the application's reply
    /// channel.
    pub fn is_destroy(self) -> bool {
        matches!(self, AdminErrorKind::Destroy)
    }

    /// Canonical message used when the server omits or empties an
    /// element's error message.
    pub fn canonical_message(self) -> String {
        match self {
            AdminErrorKind::InvalidArg => "invalid argument".to_string(),
            AdminErrorKind::TimedOut => "request timed out".to_string(),
            AdminErrorKind::Conflict => "conflicting resource".to_string(),
            AdminErrorKind::BadMsg => "protocol parse failure".to_string(),
            AdminErrorKind::Destroy => "destroyed".to_string(),
            AdminErrorKind::Broker(code) => format!("broker error {code}"),
        }
    }
}

impl fmt::Display for AdminErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminErrorKind::InvalidArg => write!(f, "InvalidArg"),
            AdminErrorKind::TimedOut => write!(f, "TimedOut"),
            AdminErrorKind::Conflict => write!(f, "Conflict"),
            AdminErrorKind::BadMsg => write!(f, "BadMsg"),
            AdminErrorKind::Destroy => write!(f, "Destroy"),
            AdminErrorKind::Broker(code) => write!(f, "Broker({code})"),
        }
    }
}

/// A kind plus a human-readable message, as delivered on a request- or
/// element-level result.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct AdminError {
    pub kind: AdminErrorKind,
    pub message: String,
}

impl AdminError {
    pub fn new(kind: AdminErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error whose message is the kind's canonical rendering
    pub fn canonical(kind: AdminErrorKind) -> Self {
        let message = kind.canonical_message();
        Self { kind, message }
    }

    pub fn invalid_arg(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::InvalidArg, message)
    }

    pub fn timed_out(state_name: &str) -> Self {
        Self::new(
            AdminErrorKind::TimedOut,
            format!("request timed out while {state_name}"),
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Conflict, message)
    }

    pub fn bad_msg(message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::BadMsg, message)
    }

    pub fn destroy() -> Self {
        Self::new(AdminErrorKind::Destroy, "client is terminating")
    }

    pub fn broker(code: i16, message: impl Into<String>) -> Self {
        Self::new(AdminErrorKind::Broker(code), message)
    }
}
