//! Classification of failed lookups during Observe
//!
//! Only two outcomes are resolved locally: a plain "not found", and a
//! client rejection of an identity that was never a server token in the
//! first place. Everything else goes back to the host.

use crate::error::ClientError;
use crate::identity;

/// Statuses the service answers with when handed a malformed identity
pub const REJECTION_STATUSES: [u16; 2] = [400, 403];

/// How a failed lookup should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Deleted out-of-band; report absence
    NotFound,
    /// Rejected, and the stored identity is not a token; clear it and report absence
    LikelyWrongIdentity,
    /// Rejected even though the identity is a token; a real failure
    ClientRejected,
    /// Anything else; a real failure
    Other,
}

impl FailureClass {
    /// Whether the lookup should be reported as "does not exist"
    pub fn is_absent(&self) -> bool {
        matches!(self, FailureClass::NotFound | FailureClass::LikelyWrongIdentity)
    }
}

/// Classify a failed lookup made with `identity`
pub fn classify(err: &ClientError, identity: &str) -> FailureClass {
    match err {
        ClientError::NotFound { .. } => FailureClass::NotFound,
        ClientError::UnexpectedStatus { status, .. } if REJECTION_STATUSES.contains(status) => {
            if identity::is_canonical_token(identity) {
                FailureClass::ClientRejected
            } else {
                FailureClass::LikelyWrongIdentity
            }
        }
        ClientError::UnexpectedStatus { .. }
        | ClientError::Transport { .. }
        | ClientError::InvalidResponse { .. } => FailureClass::Other,
    }
}
