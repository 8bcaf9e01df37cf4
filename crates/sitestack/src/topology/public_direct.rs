//! A bucket serving its objects to anyone over HTTPS.

use sitestack_core::{
    expr::Expr,
    identifier::Id,
    policy::{ConditionOperator, Effect, PolicyDocument, Principal, Statement},
    resource::{ResourceKind, ResourceNode},
    token::Attribute,
};

use crate::{SitestackError, config::SiteParameters, structure::GraphBuilder};

use super::{BucketCore, PublicAccessSettings, build_bucket_core, content_object, output_node};

pub(super) fn build(
    graph: &mut GraphBuilder,
    params: &SiteParameters,
    content: &str,
) -> Result<(), SitestackError> {
    let access = params.public_access();
    let settings =
        PublicAccessSettings::public(access.ignore_public_acls, access.restrict_public_buckets);

    let core = build_bucket_core(graph, params.bucket(), params.region(), settings)?;
    graph.add(bucket_policy(&core))?;
    content_object(graph, &core, params, content)?;

    graph.add(output_node(
        Id::new("website_url"),
        Expr::literal(website_url(params.bucket(), &core.region, params.index_document())),
        Some("URL of the index document"),
    ))?;
    Ok(())
}

/// The object URL, built from configuration alone.
fn website_url(bucket: &str, region: &str, index_document: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{index_document}")
}

/// Anonymous reads, refused over plain HTTP.
///
/// The policy waits for the access block: a public policy is rejected while
/// the bucket still blocks public policies.
fn bucket_policy(core: &BucketCore) -> ResourceNode {
    let objects = || {
        Expr::literal("arn:aws:s3:::")
            .with_token(core.bucket.token(Attribute::Id))
            .with_literal("/*")
    };

    let document = PolicyDocument::new()
        .with_statement(
            Statement::new(Effect::Allow, Principal::Any, objects())
                .with_sid("AllowPublicRead")
                .with_action("s3:GetObject"),
        )
        .with_statement(
            Statement::new(Effect::Deny, Principal::Any, objects())
                .with_sid("DenyInsecureTransport")
                .with_action("s3:GetObject")
                .with_condition(ConditionOperator::Bool, "aws:SecureTransport", "false"),
        );

    ResourceNode::new(Id::new("allow_public_read"), ResourceKind::Policy)
        .with_dependency(core.access_block.name())
        .with_property("bucket", core.bucket.token(Attribute::Id))
        .with_property("policy", document)
}

#[cfg(test)]
mod tests {
    use sitestack_core::value::Value;

    use super::*;
    use crate::config::{AppConfig, PublicAccessConfig};

    fn params(config: AppConfig) -> SiteParameters {
        config
            .with_bucket("demo-bucket")
            .with_topology(sitestack_core::topology::Topology::PublicDirect)
            .validate()
            .unwrap()
    }

    #[test]
    fn test_website_url_uses_bucket_region() {
        let params = params(AppConfig::default().with_region("ap-south-1"));
        let mut graph = GraphBuilder::new(params.stack_name());
        build(&mut graph, &params, "").unwrap();
        let graph = graph.build().unwrap();

        let url = graph
            .node(Id::new("website_url"))
            .and_then(|node| node.property("value"))
            .and_then(Value::as_text)
            .unwrap();
        assert!(url.is_literal());
        assert_eq!(
            url.to_string(),
            "https://demo-bucket.s3.ap-south-1.amazonaws.com/index.html"
        );
    }

    #[test]
    fn test_no_distribution_or_identity() {
        let params = params(AppConfig::default());
        let mut graph = GraphBuilder::new(params.stack_name());
        build(&mut graph, &params, "").unwrap();
        let graph = graph.build().unwrap();

        assert!(graph.nodes().all(|node| {
            !matches!(
                node.kind(),
                ResourceKind::Distribution
                    | ResourceKind::OriginAccessControl
                    | ResourceKind::CallerIdentity
            )
        }));
        assert_eq!(
            graph.dependencies_of(Id::new("allow_public_read")),
            vec![Id::new("static_website"), Id::new("block")]
        );
    }

    #[test]
    fn test_access_block_overrides() {
        let params = params(AppConfig::default().with_public_access(PublicAccessConfig {
            ignore_public_acls: true,
            restrict_public_buckets: false,
        }));
        let mut graph = GraphBuilder::new(params.stack_name());
        build(&mut graph, &params, "").unwrap();
        let graph = graph.build().unwrap();

        let block = graph.node(Id::new("block")).unwrap();
        let flag = |name: &str| block.property(name).and_then(Value::as_bool);
        assert_eq!(flag("block_public_acls"), Some(false));
        assert_eq!(flag("block_public_policy"), Some(false));
        assert_eq!(flag("ignore_public_acls"), Some(true));
        assert_eq!(flag("restrict_public_buckets"), Some(false));
    }

    #[test]
    fn test_policy_statements() {
        let document = bucket_policy(&{
            let mut graph = GraphBuilder::new("test");
            build_bucket_core(
                &mut graph,
                "demo-bucket",
                "eu-central-1",
                PublicAccessSettings::public(false, false),
            )
            .unwrap()
        })
        .property("policy")
        .and_then(Value::as_policy)
        .cloned()
        .unwrap();

        let statements = document.statements();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].effect(), Effect::Allow);
        assert_eq!(statements[0].principal(), &Principal::Any);
        assert_eq!(statements[0].actions(), ["s3:GetObject"]);
        assert_eq!(statements[1].effect(), Effect::Deny);
        assert_eq!(
            statements[1]
                .condition(ConditionOperator::Bool, "aws:SecureTransport")
                .map(ToString::to_string)
                .as_deref(),
            Some("false")
        );
    }
}
