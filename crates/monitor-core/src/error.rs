//! Error types for monitor reconciliation
//!
//! Two layers live here:
//! - [`ClientError`]: the typed outcome of a single remote call, produced by
//!   [`MonitorClient`](crate::traits::MonitorClient) implementations
//! - [`Error`]: what the reconciler hands back to its host

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Remote operations, used to name the failing call in errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListMonitors,
    GetMonitor,
    CreateMonitor,
    UpdateMonitor,
    DeleteMonitor,
    ListClusters,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListMonitors => "list monitors",
            Operation::GetMonitor => "get monitor",
            Operation::CreateMonitor => "create monitor",
            Operation::UpdateMonitor => "update monitor",
            Operation::DeleteMonitor => "delete monitor",
            Operation::ListClusters => "list clusters",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a failed remote call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The configuration service answered 404 for a monitor lookup
    #[error("monitor with ID {id} not found")]
    NotFound {
        /// The identity that was looked up
        id: String,
    },

    /// Any status other than the one the operation expects
    #[error("{operation}: unexpected status {status}: {body}")]
    UnexpectedStatus {
        operation: Operation,
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// The request never produced a response (connect failure, timeout, cancellation)
    #[error("{operation}: request failed: {message}")]
    Transport { operation: Operation, message: String },

    /// The response arrived but could not be decoded
    #[error("{operation}: invalid response: {message}")]
    InvalidResponse { operation: Operation, message: String },
}

impl ClientError {
    /// Create a "not found" error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an unexpected status error
    pub fn status(operation: Operation, status: u16, body: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Create a transport error
    pub fn transport(operation: Operation, message: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(operation: Operation, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            operation,
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::NotFound { .. } => Some(404),
            ClientError::UnexpectedStatus { status, .. } => Some(*status),
            ClientError::Transport { .. } | ClientError::InvalidResponse { .. } => None,
        }
    }
}

/// Core error type returned to the host
#[derive(Error, Debug)]
pub enum Error {
    /// Update or Delete invoked on a resource without a usable identity
    #[error("cannot {operation} monitor {monitor:?}: {reason}")]
    Precondition {
        operation: &'static str,
        monitor: String,
        reason: String,
    },

    /// A sensor references a cluster the directory does not know about
    #[error(
        "cluster '{cluster}' does not exist. Monitors for non-existent clusters will not be visible in the monitoring UI"
    )]
    Validation {
        /// The missing cluster name
        cluster: String,
    },

    /// An opaque structured field could not be decoded
    #[error("failed to decode {field}: {message}")]
    Decode { field: String, message: String },

    /// A canonical document could not be encoded back to its opaque form
    #[error("failed to encode {field}: {message}")]
    Encode { field: String, message: String },

    /// A remote call failed
    #[error("cannot {operation} {monitor:?}{}: {source}", identity_suffix(.identity))]
    Remote {
        operation: Operation,
        monitor: String,
        identity: Option<String>,
        #[source]
        source: ClientError,
    },

    /// Client configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

fn identity_suffix(identity: &Option<String>) -> String {
    match identity {
        Some(id) => format!(" (id {id})"),
        None => String::new(),
    }
}

impl Error {
    /// Create a precondition error
    pub fn precondition(
        operation: &'static str,
        monitor: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Precondition {
            operation,
            monitor: monitor.into(),
            reason: reason.into(),
        }
    }

    /// Create a cluster validation error
    pub fn validation(cluster: impl Into<String>) -> Self {
        Self::Validation {
            cluster: cluster.into(),
        }
    }

    /// Create a decode error
    pub fn decode(field: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Create an encode error
    pub fn encode(field: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Encode {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Wrap a remote failure with the monitor and identity it concerned
    pub fn remote(
        operation: Operation,
        monitor: impl Into<String>,
        identity: Option<&str>,
        source: ClientError,
    ) -> Self {
        Self::Remote {
            operation,
            monitor: monitor.into(),
            identity: identity.map(str::to_string),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
