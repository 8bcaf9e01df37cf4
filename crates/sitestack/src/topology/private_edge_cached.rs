//! A locked-down bucket served through a caching distribution.
//!
//! The bucket blocks all public access. A distribution signs its origin
//! requests through an origin access control, and the bucket policy grants
//! reads to the distribution service only when the request comes from this
//! particular distribution in the caller's account.

use sitestack_core::{
    expr::Expr,
    identifier::Id,
    policy::{ConditionOperator, Effect, PolicyDocument, Principal, Statement},
    resource::{ResourceKind, ResourceNode},
    token::Attribute,
    value::Value,
};

use crate::{
    SitestackError,
    config::SiteParameters,
    structure::{GraphBuilder, NodeRef},
};

use super::{BucketCore, PublicAccessSettings, build_bucket_core, content_object, output_node};

/// Origin id shared by the distribution's origin and its cache behavior.
const ORIGIN_ID: &str = "static-website-s3-origin";

const ALLOWED_METHODS: [&str; 7] = ["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"];
const CACHED_METHODS: [&str; 2] = ["GET", "HEAD"];

const MIN_TTL: i64 = 0;
const DEFAULT_TTL: i64 = 3600;
const MAX_TTL: i64 = 86400;

const CLOUDFRONT_SERVICE: &str = "cloudfront.amazonaws.com";

pub(super) fn build(
    graph: &mut GraphBuilder,
    params: &SiteParameters,
    content: &str,
) -> Result<(), SitestackError> {
    let caller_identity = graph.add(ResourceNode::new(
        Id::new("caller_identity"),
        ResourceKind::CallerIdentity,
    ))?;

    let core = build_bucket_core(
        graph,
        params.bucket(),
        params.region(),
        PublicAccessSettings::locked_down(),
    )?;
    content_object(graph, &core, params, content)?;

    let oac = graph.add(origin_access_control())?;
    let distribution = graph.add(distribution(&core, oac, params.index_document()))?;
    graph.add(bucket_policy(&core, distribution, caller_identity))?;

    graph.add(output_node(
        Id::new("cloudfront_distribution_domain"),
        Expr::token(distribution.token(Attribute::DomainName)),
        Some("Domain name of the CloudFront distribution"),
    ))?;
    Ok(())
}

fn origin_access_control() -> ResourceNode {
    ResourceNode::new(Id::new("website_oac"), ResourceKind::OriginAccessControl)
        .with_property("name", "website_oac")
        .with_property("origin_access_control_origin_type", "s3")
        .with_property("signing_behavior", "always")
        .with_property("signing_protocol", "sigv4")
}

fn distribution(core: &BucketCore, oac: NodeRef, index_document: &str) -> ResourceNode {
    let forwarded_values = Value::map([
        ("query_string", Value::from(false)),
        ("cookies", Value::map([("forward", "none")])),
    ]);

    let default_cache_behavior = Value::map([
        ("allowed_methods", Value::list(ALLOWED_METHODS)),
        ("cached_methods", Value::list(CACHED_METHODS)),
        ("target_origin_id", Value::from(ORIGIN_ID)),
        ("forwarded_values", forwarded_values),
        ("viewer_protocol_policy", Value::from("https-only")),
        ("min_ttl", Value::from(MIN_TTL)),
        ("default_ttl", Value::from(DEFAULT_TTL)),
        ("max_ttl", Value::from(MAX_TTL)),
    ]);

    let origin = Value::map([
        (
            "domain_name",
            Value::from(core.bucket.token(Attribute::BucketRegionalDomainName)),
        ),
        (
            "origin_access_control_id",
            Value::from(oac.token(Attribute::Id)),
        ),
        ("origin_id", Value::from(ORIGIN_ID)),
    ]);

    let restrictions = Value::map([(
        "geo_restriction",
        Value::map([
            ("restriction_type", Value::from("none")),
            ("locations", Value::List(Vec::new())),
        ]),
    )]);

    ResourceNode::new(Id::new("website_distribution"), ResourceKind::Distribution)
        .with_property("enabled", true)
        .with_property("default_root_object", index_document)
        .with_property("origin", Value::List(vec![origin]))
        .with_property("default_cache_behavior", default_cache_behavior)
        .with_property("restrictions", restrictions)
        .with_property(
            "viewer_certificate",
            Value::map([("cloudfront_default_certificate", true)]),
        )
}

/// Read access for the distribution service, scoped to one distribution.
fn bucket_policy(
    core: &BucketCore,
    distribution: NodeRef,
    caller_identity: NodeRef,
) -> ResourceNode {
    let objects = Expr::literal("arn:aws:s3:::")
        .with_token(core.bucket.token(Attribute::Id))
        .with_literal("/*");
    let source_arn = Expr::literal("arn:aws:cloudfront::")
        .with_token(caller_identity.token(Attribute::AccountId))
        .with_literal(":distribution/")
        .with_token(distribution.token(Attribute::Id));

    let document = PolicyDocument::new().with_statement(
        Statement::new(
            Effect::Allow,
            Principal::Service(CLOUDFRONT_SERVICE.to_string()),
            objects,
        )
        .with_sid("AllowCloudFrontServicePrincipalReadOnly")
        .with_action("s3:GetObject")
        .with_condition(ConditionOperator::StringEquals, "AWS:SourceArn", source_arn),
    );

    ResourceNode::new(Id::new("allow_cloudfront_only"), ResourceKind::Policy)
        .with_property("bucket", core.bucket.token(Attribute::Id))
        .with_property("policy", document)
}
