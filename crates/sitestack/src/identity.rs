//! Caller identity.
//!
//! The private topology scopes its bucket policy to the calling account.
//! The account is supplied by an [`IdentityLookup`] collaborator which the
//! plan emitter invokes once, when it emits the caller-identity lookup node.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Errors raised while determining the calling account.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid account id `{0}`: expected 12 digits")]
    InvalidAccountId(String),

    #[error("{0}")]
    Lookup(String),
}

/// A validated AWS account id (12 ASCII digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// Returns the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 12 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(IdentityError::InvalidAccountId(s.to_string()))
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of the calling account id.
pub trait IdentityLookup {
    /// Look up the account the stack is deployed into.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] if the account cannot be determined.
    fn account_id(&self) -> Result<AccountId, IdentityError>;
}

/// An identity known ahead of time.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    account_id: AccountId,
}

impl StaticIdentity {
    /// Create a lookup that always returns `account_id`.
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }
}

impl IdentityLookup for StaticIdentity {
    fn account_id(&self) -> Result<AccountId, IdentityError> {
        Ok(self.account_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_validation() {
        assert_eq!(
            "123456789012".parse::<AccountId>().unwrap().as_str(),
            "123456789012"
        );
        assert!("12345678901".parse::<AccountId>().is_err());
        assert!("12345678901a".parse::<AccountId>().is_err());
        assert!("".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_account_id_equality() {
        let a: AccountId = "123456789012".parse().unwrap();
        let b: AccountId = "123456789012".parse().unwrap();
        let c: AccountId = "999999999999".parse().unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "123456789012");
    }

    #[test]
    fn test_static_identity() {
        let identity = StaticIdentity::new("123456789012".parse().unwrap());
        assert_eq!(identity.account_id().unwrap().as_str(), "123456789012");
    }
}
