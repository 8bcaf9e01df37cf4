//! Plan emission.
//!
//! The [`Emitter`] walks a [`StackGraph`](crate::structure::StackGraph) in
//! dependency order. Each node's tokens are resolved against the nodes
//! emitted before it, then the node's own exported attributes are published
//! for the nodes after it. The result is a [`ProvisioningPlan`] in which no
//! token placeholder remains. Plan text is in interpolation syntax, so a
//! literal `${` in configuration or content never reads as a backend
//! reference.

mod plan;
mod resolver;

pub use plan::{Mode, PlanEntry, PlanOutput, ProvisioningPlan};
pub use resolver::{AttributeResolver, BackendReferenceResolver};

use log::{debug, info, trace};

use sitestack_core::{
    resource::{ResourceKind, ResourceNode},
    token::{Attribute, Resolved, TokenTable},
};

use crate::{
    SitestackError, config::ProviderConfig, identity::IdentityLookup, structure::StackGraph,
};

/// Turns a stack graph into a provisioning plan.
pub struct Emitter<'a> {
    provider: ProviderConfig,
    resolver: &'a dyn AttributeResolver,
    identity: &'a dyn IdentityLookup,
}

impl<'a> Emitter<'a> {
    /// Create an emitter.
    ///
    /// `identity` is consulted once, and only if the graph holds a
    /// caller-identity lookup.
    pub fn new(
        provider: ProviderConfig,
        resolver: &'a dyn AttributeResolver,
        identity: &'a dyn IdentityLookup,
    ) -> Self {
        Self {
            provider,
            resolver,
            identity,
        }
    }

    /// Emit `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::CyclicDependency`] if the graph has no
    /// emission order, [`SitestackError::UnresolvedTokenReference`] if a node
    /// reads a token its owner has not published, and
    /// [`SitestackError::Identity`] if the caller account cannot be looked
    /// up. No partial plan is returned.
    pub fn emit(&self, graph: StackGraph) -> Result<ProvisioningPlan, SitestackError> {
        info!(stack = graph.name(), nodes = graph.len(); "Emitting plan");

        let order = graph.emission_order()?;
        let mut tokens = TokenTable::new();
        let mut plan = ProvisioningPlan::new(graph.name(), self.provider.clone());

        for node in order {
            let properties = node
                .properties()
                .iter()
                .map(|(key, value)| {
                    value
                        .resolve(&tokens)
                        .map(|resolved| (key.clone(), resolved))
                        .map_err(|err| SitestackError::from_resolve(node.name(), err))
                })
                .collect::<Result<serde_json::Map<_, _>, _>>()?;
            let depends_on = graph.dependencies_of(node.name());

            if node.kind() == ResourceKind::Output {
                debug!(output:% = node.name(); "Emitted output");
                plan.push_output(PlanOutput::new(node.name(), properties, depends_on)?);
                continue;
            }

            self.publish(node, &mut tokens)?;
            debug!(
                name:% = node.name(),
                kind:% = node.kind(),
                position = plan.entries().len();
                "Emitted node"
            );
            plan.push_entry(PlanEntry::new(node, depends_on, properties));
        }

        trace!(plan:?; "Emitted plan");
        info!(
            entries = plan.entries().len(),
            outputs = plan.outputs().len();
            "Plan emitted"
        );
        Ok(plan)
    }

    /// Resolve every attribute `node` exports.
    fn publish(&self, node: &ResourceNode, tokens: &mut TokenTable) -> Result<(), SitestackError> {
        for &attribute in node.kind().exported_attributes() {
            let value = if node.kind() == ResourceKind::CallerIdentity
                && attribute == Attribute::AccountId
            {
                let account_id = self.identity.account_id()?;
                info!(account_id:% = account_id; "Resolved caller account");
                Resolved::Literal(account_id.to_string())
            } else {
                self.resolver.resolve(node, attribute)?
            };
            tokens
                .resolve(node.token(attribute), value)
                .map_err(|err| SitestackError::from_resolve(node.name(), err))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use sitestack_core::{expr::Expr, identifier::Id, token::Token};

    use super::*;
    use crate::{
        identity::{AccountId, IdentityError, StaticIdentity},
        structure::GraphBuilder,
    };

    struct CountingIdentity {
        calls: Cell<usize>,
    }

    impl IdentityLookup for CountingIdentity {
        fn account_id(&self) -> Result<AccountId, IdentityError> {
            self.calls.set(self.calls.get() + 1);
            "123456789012".parse()
        }
    }

    struct FailingIdentity;

    impl IdentityLookup for FailingIdentity {
        fn account_id(&self) -> Result<AccountId, IdentityError> {
            Err(IdentityError::Lookup("no credentials".to_string()))
        }
    }

    fn identity_graph() -> StackGraph {
        let mut builder = GraphBuilder::new("test");
        let identity = builder
            .add(ResourceNode::new(
                Id::new("caller_identity"),
                ResourceKind::CallerIdentity,
            ))
            .unwrap();
        builder
            .add(
                ResourceNode::new(Id::new("account"), ResourceKind::Output).with_property(
                    "value",
                    Expr::literal("acct-").with_token(identity.token(Attribute::AccountId)),
                ),
            )
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_identity_is_looked_up_once() {
        let identity = CountingIdentity {
            calls: Cell::new(0),
        };
        let plan = Emitter::new(
            ProviderConfig::default(),
            &BackendReferenceResolver,
            &identity,
        )
        .emit(identity_graph())
        .unwrap();

        assert_eq!(identity.calls.get(), 1);
        assert_eq!(plan.output(Id::new("account")).unwrap().value(), "acct-123456789012");

        let entry = plan.entry(Id::new("caller_identity")).unwrap();
        assert_eq!(entry.mode(), Mode::Data);
    }

    #[test]
    fn test_identity_failure_aborts() {
        let result = Emitter::new(
            ProviderConfig::default(),
            &BackendReferenceResolver,
            &FailingIdentity,
        )
        .emit(identity_graph());

        assert!(matches!(result, Err(SitestackError::Identity(_))));
    }

    #[test]
    fn test_backend_references_for_unknown_attributes() {
        let mut builder = GraphBuilder::new("test");
        let oac = builder
            .add(ResourceNode::new(
                Id::new("website_oac"),
                ResourceKind::OriginAccessControl,
            ))
            .unwrap();
        builder
            .add(
                ResourceNode::new(Id::new("oac_id"), ResourceKind::Output)
                    .with_property("value", oac.token(Attribute::Id)),
            )
            .unwrap();

        let identity = StaticIdentity::new("123456789012".parse().unwrap());
        let plan = Emitter::new(
            ProviderConfig::default(),
            &BackendReferenceResolver,
            &identity,
        )
        .emit(builder.build().unwrap())
        .unwrap();

        assert_eq!(
            plan.output(Id::new("oac_id")).unwrap().value(),
            "${aws_cloudfront_origin_access_control.website_oac.id}"
        );
        assert_eq!(
            plan.output(Id::new("oac_id")).unwrap().depends_on(),
            [Id::new("website_oac")]
        );
    }

    #[test]
    fn test_cycle_prevents_emission() {
        let mut builder = GraphBuilder::new("test");
        builder
            .add(
                ResourceNode::new(Id::new("a"), ResourceKind::Policy)
                    .with_property("bucket", Token::new(Id::new("b"), Attribute::Id)),
            )
            .unwrap();
        builder
            .add(
                ResourceNode::new(Id::new("b"), ResourceKind::Versioning)
                    .with_property("bucket", Token::new(Id::new("a"), Attribute::Id)),
            )
            .unwrap();

        let identity = StaticIdentity::new("123456789012".parse().unwrap());
        let result = Emitter::new(
            ProviderConfig::default(),
            &BackendReferenceResolver,
            &identity,
        )
        .emit(builder.build().unwrap());

        assert!(matches!(
            result,
            Err(SitestackError::CyclicDependency { .. })
        ));
    }
}
