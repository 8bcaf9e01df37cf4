//! Attribute resolution.

use sitestack_core::{
    resource::{ResourceKind, ResourceNode},
    token::{Attribute, Resolved},
    value::Value,
};

use crate::SitestackError;

/// Supplies the value of a node's exported attribute once the node has been
/// emitted.
pub trait AttributeResolver {
    /// Resolve `attribute` of `node`.
    ///
    /// # Errors
    ///
    /// Returns a [`SitestackError`] if the value cannot be determined.
    fn resolve(
        &self,
        node: &ResourceNode,
        attribute: Attribute,
    ) -> Result<Resolved, SitestackError>;
}

/// Resolves attributes to the backend's own reference syntax.
///
/// A bucket's name and ARN follow from its configuration and resolve to
/// literals. Everything else becomes a reference to
/// `<type>.<node>.<attribute>`, which the backend substitutes at apply time.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendReferenceResolver;

impl AttributeResolver for BackendReferenceResolver {
    fn resolve(
        &self,
        node: &ResourceNode,
        attribute: Attribute,
    ) -> Result<Resolved, SitestackError> {
        if node.kind() == ResourceKind::Bucket {
            if let Some(name) = literal_bucket_name(node) {
                match attribute {
                    Attribute::Id | Attribute::Bucket => return Ok(Resolved::Literal(name)),
                    Attribute::Arn => {
                        return Ok(Resolved::Literal(format!("arn:aws:s3:::{name}")));
                    }
                    _ => {}
                }
            }
        }

        let prefix = if node.kind().is_data() { "data." } else { "" };
        Ok(Resolved::Reference(format!(
            "{prefix}{}.{}.{attribute}",
            node.kind().backend_type(),
            node.name()
        )))
    }
}

fn literal_bucket_name(node: &ResourceNode) -> Option<String> {
    node.property("bucket")
        .and_then(Value::as_text)
        .filter(|expr| expr.is_literal())
        .map(ToString::to_string)
}
