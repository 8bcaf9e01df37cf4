//! Sitestack - Synthesizes provisioning plans for static-website stacks.
//!
//! A stack is a storage bucket holding the site, its access policy, the
//! seeded index document and, in the edge-cached topology, a caching
//! distribution in front of it. Resources refer to each other's generated
//! identifiers through tokens that are resolved while the plan is emitted
//! in dependency order.

pub mod config;
pub mod content;
pub mod emit;
pub mod export;
pub mod identity;
pub mod structure;
pub mod topology;

mod error;

pub use sitestack_core::{expr, identifier, policy, resource, template, token, value};
pub use sitestack_core::topology::Topology;

pub use error::SitestackError;

use log::{debug, info, trace};

use config::{AppConfig, SiteParameters};
use content::Clock;
use emit::{AttributeResolver, Emitter, ProvisioningPlan};
use export::Format;
use identity::IdentityLookup;
use structure::StackGraph;

/// Builder for synthesizing and exporting static-website stacks.
///
/// This provides an API for processing a stack through validation,
/// synthesis, emission, and export stages.
///
/// # Examples
///
/// ```rust
/// use sitestack::{
///     StackBuilder,
///     config::AppConfig,
///     content::FixedClock,
///     emit::BackendReferenceResolver,
///     export::Format,
///     identity::StaticIdentity,
/// };
///
/// let builder = StackBuilder::new(AppConfig::default().with_bucket("demo-bucket"));
///
/// let graph = builder.synthesize(&FixedClock(1_700_000_000)).unwrap();
/// let identity = StaticIdentity::new("123456789012".parse().unwrap());
/// let plan = builder
///     .emit(graph, &BackendReferenceResolver, &identity)
///     .unwrap();
///
/// let json = builder.export(&plan, Format::Terraform).unwrap();
/// assert!(json.contains("aws_cloudfront_distribution"));
/// ```
#[derive(Debug, Default)]
pub struct StackBuilder {
    config: AppConfig,
}

impl StackBuilder {
    /// Create a new stack builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Borrow the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::InvalidConfiguration`] or
    /// [`SitestackError::Parse`] for bad input.
    pub fn parameters(&self) -> Result<SiteParameters, SitestackError> {
        debug!("Validating configuration");
        self.config.validate()
    }

    /// Build the stack graph for the configured topology.
    ///
    /// The index document is rendered with the current reading of `clock`.
    /// Invalid configuration is reported before any node is built.
    ///
    /// # Errors
    ///
    /// Returns `SitestackError` for invalid configuration, a malformed
    /// template or output, or an inconsistent graph.
    pub fn synthesize(&self, clock: &dyn Clock) -> Result<StackGraph, SitestackError> {
        let params = self.parameters()?;
        info!(
            stack = params.stack_name(),
            topology:% = params.topology();
            "Synthesizing stack"
        );

        let content = content::render(params.template(), clock.now())?;
        let graph = topology::build(&params, &content)?;

        debug!(nodes = graph.len(); "Stack synthesized");
        trace!(graph:?; "Stack graph");
        Ok(graph)
    }

    /// Emit `graph` as a provisioning plan.
    ///
    /// # Errors
    ///
    /// Returns `SitestackError` if the graph cannot be ordered, a token
    /// cannot be resolved, or the caller identity lookup fails.
    pub fn emit(
        &self,
        graph: StackGraph,
        resolver: &dyn AttributeResolver,
        identity: &dyn IdentityLookup,
    ) -> Result<ProvisioningPlan, SitestackError> {
        Emitter::new(self.config.provider().clone(), resolver, identity).emit(graph)
    }

    /// Render `plan` in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::Export`] if rendering fails.
    pub fn export(&self, plan: &ProvisioningPlan, format: Format) -> Result<String, SitestackError> {
        info!(format:% = format; "Exporting plan");
        let rendered = format.exporter().export(plan)?;
        debug!(bytes = rendered.len(); "Plan exported");
        Ok(rendered)
    }
}
