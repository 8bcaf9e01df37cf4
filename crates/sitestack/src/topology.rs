//! Topology builders.
//!
//! A topology fully determines which resource nodes a stack holds and how
//! its bucket policy is shaped. Both topologies share the bucket core built
//! by [`bucket_core::build_bucket_core`] and differ only in what they put
//! around it.
//!
//! - [`private_edge_cached`] locks the bucket down and fronts it with a
//!   caching distribution that alone may read from it.
//! - [`public_direct`] serves objects straight from the bucket to anyone.

mod bucket_core;
mod private_edge_cached;
mod public_direct;

pub use bucket_core::{BucketCore, PublicAccessSettings, build_bucket_core};

use log::{debug, info};

use sitestack_core::{
    expr::Expr,
    identifier::Id,
    resource::{ResourceKind, ResourceNode},
    token::Attribute,
    topology::Topology,
};
use sitestack_parser::check_references;

use crate::{
    SitestackError,
    config::{DeclaredOutput, SiteParameters},
    content::CONTENT_TYPE,
    structure::{GraphBuilder, StackGraph},
};

/// Build the stack graph for `params`.
///
/// `content` is the rendered index document.
///
/// # Errors
///
/// Returns [`SitestackError::InvalidConfiguration`] if an operator output
/// reuses a node name, [`SitestackError::Parse`] if an operator output
/// references a node or attribute the stack does not have, and
/// [`SitestackError::Graph`] if the graph is inconsistent.
pub fn build(params: &SiteParameters, content: &str) -> Result<StackGraph, SitestackError> {
    info!(topology:% = params.topology(), bucket = params.bucket(); "Building stack graph");

    let mut graph = GraphBuilder::new(params.stack_name());
    match params.topology() {
        Topology::PrivateEdgeCached => private_edge_cached::build(&mut graph, params, content)?,
        Topology::PublicDirect => public_direct::build(&mut graph, params, content)?,
    }

    for output in params.outputs() {
        add_declared_output(&mut graph, output)?;
    }

    graph.build()
}

/// The index document object, identical in both topologies.
fn content_object(
    graph: &mut GraphBuilder,
    core: &BucketCore,
    params: &SiteParameters,
    content: &str,
) -> Result<(), SitestackError> {
    graph.add(
        ResourceNode::new(Id::new("static_website_index"), ResourceKind::ContentObject)
            .with_property("bucket", core.bucket.token(Attribute::Id))
            .with_property("key", params.index_document())
            .with_property("content", content)
            .with_property("content_type", CONTENT_TYPE),
    )?;
    Ok(())
}

/// An output node exposing `value`.
fn output_node(name: Id, value: Expr, description: Option<&str>) -> ResourceNode {
    let node = ResourceNode::new(name, ResourceKind::Output).with_property("value", value);
    match description {
        Some(description) => node.with_property("description", description),
        None => node,
    }
}

fn add_declared_output(
    graph: &mut GraphBuilder,
    output: &DeclaredOutput,
) -> Result<(), SitestackError> {
    if graph.contains(output.name()) {
        return Err(SitestackError::InvalidConfiguration(format!(
            "output `{}` collides with a node of the same name",
            output.name()
        )));
    }
    check_references(output.expression(), |name| graph.kind_of(name))
        .map_err(|err| SitestackError::new_parse_error(err, output.source()))?;

    debug!(output:% = output.name(); "Adding declared output");
    graph.add(output_node(
        output.name(),
        output.expression().expr().clone(),
        output.description(),
    ))?;
    Ok(())
}
