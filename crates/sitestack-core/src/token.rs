//! Identifier tokens: placeholders for values the provisioning backend
//! allocates.
//!
//! A [`Token`] names one attribute of one resource node, e.g. the generated
//! id of a distribution. Tokens are declared while a stack graph is built and
//! resolved by the plan emitter once their owning node has been emitted. The
//! resolved values live in a [`TokenTable`], which enforces that each token
//! is resolved once and never read before that.

use std::{collections::HashMap, fmt, str::FromStr};

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{expr::escape_literal, identifier::Id};

/// An attribute that a resource exports once the backend has created it.
///
/// The names match the attribute names used by the provisioning backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Backend identifier of the resource.
    Id,
    /// Amazon Resource Name.
    Arn,
    /// Physical bucket name.
    Bucket,
    /// Region-qualified domain name of a bucket.
    BucketRegionalDomainName,
    /// Public domain name of a distribution.
    DomainName,
    /// Route 53 zone of a distribution's domain name.
    HostedZoneId,
    /// Entity tag of the current resource version.
    Etag,
    /// Version of a stored object.
    VersionId,
    /// Account of the calling credentials.
    AccountId,
    /// Unique id of the calling principal.
    UserId,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 10] = [
        Attribute::Id,
        Attribute::Arn,
        Attribute::Bucket,
        Attribute::BucketRegionalDomainName,
        Attribute::DomainName,
        Attribute::HostedZoneId,
        Attribute::Etag,
        Attribute::VersionId,
        Attribute::AccountId,
        Attribute::UserId,
    ];

    /// Returns the backend name of the attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Id => "id",
            Attribute::Arn => "arn",
            Attribute::Bucket => "bucket",
            Attribute::BucketRegionalDomainName => "bucket_regional_domain_name",
            Attribute::DomainName => "domain_name",
            Attribute::HostedZoneId => "hosted_zone_id",
            Attribute::Etag => "etag",
            Attribute::VersionId => "version_id",
            Attribute::AccountId => "account_id",
            Attribute::UserId => "user_id",
        }
    }
}

impl FromStr for Attribute {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Attribute::Id),
            "arn" => Ok(Attribute::Arn),
            "bucket" => Ok(Attribute::Bucket),
            "bucket_regional_domain_name" => Ok(Attribute::BucketRegionalDomainName),
            "domain_name" => Ok(Attribute::DomainName),
            "hosted_zone_id" => Ok(Attribute::HostedZoneId),
            "etag" => Ok(Attribute::Etag),
            "version_id" => Ok(Attribute::VersionId),
            "account_id" => Ok(Attribute::AccountId),
            "user_id" => Ok(Attribute::UserId),
            _ => Err("Unknown attribute"),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deferred reference to one attribute of one resource node.
///
/// Until the owner is emitted the token has no value; its [`Display`]
/// form is an unmistakable placeholder (`${TOKEN[owner.attribute]}`) so an
/// unresolved token that leaks into output text is easy to spot.
///
/// # Examples
///
/// ```
/// use sitestack_core::{identifier::Id, token::{Attribute, Token}};
///
/// let token = Token::new(Id::new("website_distribution"), Attribute::DomainName);
/// assert_eq!(token.to_string(), "${TOKEN[website_distribution.domain_name]}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    owner: Id,
    attribute: Attribute,
}

impl Token {
    /// Prefix shared by all unresolved token placeholders.
    pub const PLACEHOLDER_PREFIX: &'static str = "${TOKEN[";

    /// Create a token for `attribute` of the node named `owner`.
    pub fn new(owner: Id, attribute: Attribute) -> Self {
        Self { owner, attribute }
    }

    /// Returns the name of the node that owns the value.
    pub fn owner(&self) -> Id {
        self.owner
    }

    /// Returns the attribute this token stands for.
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}]}}",
            Self::PLACEHOLDER_PREFIX,
            self.owner,
            self.attribute
        )
    }
}

/// Errors raised while resolving tokens to values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A token was read before its owning node was emitted.
    #[error("token `{0}` was read before `{owner}` was emitted", owner = .0.owner())]
    Unresolved(Token),

    /// A token was resolved twice.
    #[error("token `{0}` is already resolved")]
    AlreadyResolved(Token),

    /// A resolved structure could not be encoded.
    #[error("failed to encode resolved value: {0}")]
    Encode(String),
}

/// The value a token resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A value the synthesizer already knows, e.g. a configured bucket name.
    Literal(String),
    /// The backend address of a value only known at apply time, e.g.
    /// `aws_cloudfront_distribution.website_distribution.id`.
    Reference(String),
}

impl From<&str> for Resolved {
    fn from(value: &str) -> Self {
        Resolved::Literal(value.to_string())
    }
}

impl From<String> for Resolved {
    fn from(value: String) -> Self {
        Resolved::Literal(value)
    }
}

impl fmt::Display for Resolved {
    /// Writes the value in interpolation syntax: a reference as
    /// `${address}`, a literal with its own `${` and `%{` escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Literal(text) => f.write_str(&escape_literal(text)),
            Resolved::Reference(address) => write!(f, "${{{address}}}"),
        }
    }
}

/// Resolved values of all tokens emitted so far.
#[derive(Debug, Default)]
pub struct TokenTable {
    values: HashMap<Token, Resolved>,
}

impl TokenTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the value of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::AlreadyResolved`] if the token already has a
    /// value; resolved values are never replaced.
    pub fn resolve(
        &mut self,
        token: Token,
        value: impl Into<Resolved>,
    ) -> Result<(), ResolveError> {
        if self.values.contains_key(&token) {
            return Err(ResolveError::AlreadyResolved(token));
        }
        let value = value.into();
        trace!(token:% = token, value:% = value; "Resolved token");
        self.values.insert(token, value);
        Ok(())
    }

    /// Returns the resolved value of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolved`] if the owning node has not been
    /// emitted yet.
    pub fn lookup(&self, token: &Token) -> Result<&Resolved, ResolveError> {
        self.values
            .get(token)
            .ok_or(ResolveError::Unresolved(*token))
    }

    /// Returns `true` if `token` has a value.
    pub fn is_resolved(&self, token: &Token) -> bool {
        self.values.contains_key(token)
    }

    /// Returns the number of resolved tokens.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
