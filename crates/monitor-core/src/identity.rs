//! External identity resolution
//!
//! A monitor is tied to its remote record by a single string: the
//! server-assigned identity. Only the canonical 8-4-4-4-12 lowercase
//! hexadecimal form is ever used to address the service.

use regex::Regex;
use std::sync::LazyLock;

static CANONICAL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("static pattern compiles")
});

/// Classification of a stored identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity<'a> {
    /// Nothing stored yet
    Missing,
    /// Something stored, but not in canonical form; must not be sent to the service
    Invalid(&'a str),
    /// A canonical token, usable verbatim as the lookup key
    Valid(&'a str),
}

/// Classify a stored identity
pub fn resolve(identity: &str) -> Identity<'_> {
    if identity.is_empty() {
        Identity::Missing
    } else if is_canonical_token(identity) {
        Identity::Valid(identity)
    } else {
        Identity::Invalid(identity)
    }
}

/// Whether `value` is a canonical identity token
pub fn is_canonical_token(value: &str) -> bool {
    value.len() == 36 && CANONICAL_TOKEN.is_match(value)
}
