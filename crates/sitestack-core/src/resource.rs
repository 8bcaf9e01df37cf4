//! Resource kinds and resource nodes.
//!
//! A [`ResourceNode`] is one unit of declared infrastructure: a stable local
//! name, a [`ResourceKind`], its properties and its dependencies. References
//! to other nodes are made through [`Token`]s, and every referenced owner is
//! an implicit dependency.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    identifier::Id,
    token::{Attribute, Token},
    value::Value,
};

/// The kind of a resource node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Object-storage bucket.
    Bucket,
    /// Versioning configuration of a bucket.
    Versioning,
    /// Public-access block of a bucket.
    PublicAccessBlock,
    /// Bucket access policy.
    Policy,
    /// Origin access control binding a distribution to its origin.
    OriginAccessControl,
    /// Edge caching distribution.
    Distribution,
    /// Object stored in a bucket.
    ContentObject,
    /// Value surfaced to the operator after apply.
    Output,
    /// Read-only lookup of the calling account.
    CallerIdentity,
}

impl ResourceKind {
    /// Returns the backend type name, e.g. `aws_s3_bucket`.
    pub fn backend_type(self) -> &'static str {
        match self {
            ResourceKind::Bucket => "aws_s3_bucket",
            ResourceKind::Versioning => "aws_s3_bucket_versioning",
            ResourceKind::PublicAccessBlock => "aws_s3_bucket_public_access_block",
            ResourceKind::Policy => "aws_s3_bucket_policy",
            ResourceKind::OriginAccessControl => "aws_cloudfront_origin_access_control",
            ResourceKind::Distribution => "aws_cloudfront_distribution",
            ResourceKind::ContentObject => "aws_s3_object",
            ResourceKind::Output => "output",
            ResourceKind::CallerIdentity => "aws_caller_identity",
        }
    }

    /// Returns `true` for read-only data lookups.
    pub fn is_data(self) -> bool {
        matches!(self, ResourceKind::CallerIdentity)
    }

    /// Returns the attributes the backend exports for this kind.
    pub fn exported_attributes(self) -> &'static [Attribute] {
        match self {
            ResourceKind::Bucket => &[
                Attribute::Id,
                Attribute::Arn,
                Attribute::Bucket,
                Attribute::BucketRegionalDomainName,
            ],
            ResourceKind::Versioning | ResourceKind::PublicAccessBlock | ResourceKind::Policy => {
                &[Attribute::Id]
            }
            ResourceKind::OriginAccessControl => &[Attribute::Id, Attribute::Etag],
            ResourceKind::Distribution => &[
                Attribute::Id,
                Attribute::Arn,
                Attribute::DomainName,
                Attribute::HostedZoneId,
            ],
            ResourceKind::ContentObject => &[Attribute::Id, Attribute::Etag, Attribute::VersionId],
            ResourceKind::Output => &[],
            ResourceKind::CallerIdentity => {
                &[Attribute::AccountId, Attribute::Arn, Attribute::UserId]
            }
        }
    }

    /// Returns `true` if this kind exports `attribute`.
    pub fn exports(self, attribute: Attribute) -> bool {
        self.exported_attributes().contains(&attribute)
    }
}

impl From<ResourceKind> for &'static str {
    fn from(val: ResourceKind) -> Self {
        match val {
            ResourceKind::Bucket => "bucket",
            ResourceKind::Versioning => "versioning",
            ResourceKind::PublicAccessBlock => "public_access_block",
            ResourceKind::Policy => "policy",
            ResourceKind::OriginAccessControl => "origin_access_control",
            ResourceKind::Distribution => "distribution",
            ResourceKind::ContentObject => "content_object",
            ResourceKind::Output => "output",
            ResourceKind::CallerIdentity => "caller_identity",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A declared unit of infrastructure.
///
/// # Examples
///
/// ```
/// use sitestack_core::{
///     identifier::Id,
///     resource::{ResourceKind, ResourceNode},
///     token::Attribute,
/// };
///
/// let bucket = ResourceNode::new(Id::new("static_website"), ResourceKind::Bucket)
///     .with_property("bucket", "demo-bucket");
/// let versioning = ResourceNode::new(Id::new("enable_versioning"), ResourceKind::Versioning)
///     .with_property("bucket", bucket.token(Attribute::Id));
///
/// assert_eq!(versioning.dependencies(), vec![bucket.name()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    name: Id,
    kind: ResourceKind,
    properties: IndexMap<String, Value>,
    depends_on: Vec<Id>,
}

impl ResourceNode {
    /// Create a node without properties or dependencies.
    pub fn new(name: Id, kind: ResourceKind) -> Self {
        Self {
            name,
            kind,
            properties: IndexMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Set a property, replacing any previous value under `key`.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Declare an explicit dependency on a node that is not referenced through a token.
    pub fn with_dependency(mut self, name: Id) -> Self {
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
        self
    }

    /// Returns the local name.
    pub fn name(&self) -> Id {
        self.name
    }

    /// Returns the kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the properties in declaration order.
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Look up a property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns the dependencies declared with [`with_dependency`](Self::with_dependency).
    pub fn explicit_dependencies(&self) -> &[Id] {
        &self.depends_on
    }

    /// A token for one of this node's exported attributes.
    ///
    /// Whether the kind exports `attribute` is checked when the node is added
    /// to a graph.
    pub fn token(&self, attribute: Attribute) -> Token {
        Token::new(self.name, attribute)
    }

    /// Every token referenced by the node's properties, in declaration order.
    pub fn tokens(&self) -> Vec<Token> {
        self.properties
            .values()
            .flat_map(|value| value.tokens())
            .collect()
    }

    /// All nodes this node depends on: explicit dependencies first, then the
    /// owners of referenced tokens. Each name appears once.
    pub fn dependencies(&self) -> Vec<Id> {
        let mut dependencies = self.depends_on.clone();
        for token in self.tokens() {
            if !dependencies.contains(&token.owner()) {
                dependencies.push(token.owner());
            }
        }
        dependencies
    }
}
