//! The bucket, its versioning and its public access block.

use log::debug;

use sitestack_core::{
    identifier::Id,
    resource::{ResourceKind, ResourceNode},
    token::Attribute,
    value::Value,
};

use crate::{
    SitestackError,
    structure::{GraphBuilder, NodeRef},
};

/// The four flags of a bucket's public access block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicAccessSettings {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccessSettings {
    /// Block every form of public access.
    pub fn locked_down() -> Self {
        Self {
            block_public_acls: true,
            block_public_policy: true,
            ignore_public_acls: true,
            restrict_public_buckets: true,
        }
    }

    /// Allow public ACLs and public bucket policies.
    pub fn public(ignore_public_acls: bool, restrict_public_buckets: bool) -> Self {
        Self {
            block_public_acls: false,
            block_public_policy: false,
            ignore_public_acls,
            restrict_public_buckets,
        }
    }
}

/// Handles to the nodes added by [`build_bucket_core`].
#[derive(Debug, Clone)]
pub struct BucketCore {
    pub bucket: NodeRef,
    pub versioning: NodeRef,
    pub access_block: NodeRef,
    /// Region the bucket is created in.
    pub region: String,
}

/// Add the bucket named `bucket` in `region` with versioning enabled and the
/// given public access block.
///
/// Versioning is always enabled. The bucket node carries no region of its
/// own: the backend creates it in the provider's region, which is `region`.
/// The core keeps the region for addresses built from configuration alone.
///
/// # Errors
///
/// Returns [`SitestackError::Graph`] if one of the node names is taken.
pub fn build_bucket_core(
    graph: &mut GraphBuilder,
    bucket: &str,
    region: &str,
    settings: PublicAccessSettings,
) -> Result<BucketCore, SitestackError> {
    debug!(bucket, region; "Building bucket core");
    let bucket = graph.add(
        ResourceNode::new(Id::new("static_website"), ResourceKind::Bucket)
            .with_property("bucket", bucket),
    )?;

    let versioning = graph.add(
        ResourceNode::new(Id::new("enable_versioning"), ResourceKind::Versioning)
            .with_property("bucket", bucket.token(Attribute::Id))
            .with_property(
                "versioning_configuration",
                Value::map([("status", "Enabled")]),
            ),
    )?;

    let access_block = graph.add(
        ResourceNode::new(Id::new("block"), ResourceKind::PublicAccessBlock)
            .with_property("bucket", bucket.token(Attribute::Id))
            .with_property("block_public_acls", settings.block_public_acls)
            .with_property("block_public_policy", settings.block_public_policy)
            .with_property("ignore_public_acls", settings.ignore_public_acls)
            .with_property("restrict_public_buckets", settings.restrict_public_buckets),
    )?;

    Ok(BucketCore {
        bucket,
        versioning,
        access_block,
        region: region.to_string(),
    })
}
