//! Shared-secret bearer credential

use std::fmt;

use subtle::ConstantTimeEq;

const BEARER_PREFIX: &str = "Bearer ";

/// The secret every node of a sync group is configured with.
///
/// An empty secret authenticates nothing, including an empty credential.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value of the `authorization` member sent with each call.
    pub fn bearer(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.0)
    }

    /// Check a presented credential, with or without the `Bearer ` prefix.
    pub fn verify(&self, presented: Option<&str>) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let Some(presented) = presented else {
            return false;
        };
        let token = presented.strip_prefix(BEARER_PREFIX).unwrap_or(presented);
        token.as_bytes().ct_eq(self.0.as_bytes()).into()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("SharedSecret(<empty>)")
        } else {
            f.write_str("SharedSecret(<redacted>)")
        }
    }
}
