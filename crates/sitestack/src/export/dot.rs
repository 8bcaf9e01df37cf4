//! Dependency graph in Graphviz DOT.

use std::collections::HashMap;

use log::debug;
use petgraph::{
    dot::{Config, Dot},
    graph::DiGraph,
};

use crate::emit::ProvisioningPlan;

use super::{Error, Exporter};

/// Draws one node per entry and output, with an edge from every dependency
/// to its dependent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotExporter;

impl Exporter for DotExporter {
    fn export(&self, plan: &ProvisioningPlan) -> Result<String, Error> {
        let mut graph: DiGraph<String, &str> = DiGraph::new();
        let mut nodes = HashMap::new();

        for entry in plan.entries() {
            nodes.insert(entry.name(), graph.add_node(entry.address()));
        }
        let outputs: Vec<_> = plan
            .outputs()
            .iter()
            .map(|output| {
                let index = graph.add_node(format!("output.{}", output.name()));
                (index, output.depends_on())
            })
            .collect();

        let dependencies = plan
            .entries()
            .iter()
            .map(|entry| (nodes[&entry.name()], entry.depends_on()))
            .chain(outputs);
        for (dependent, depends_on) in dependencies {
            for name in depends_on {
                let Some(&dependency) = nodes.get(name) else {
                    return Err(Error::Render(format!(
                        "dependency `{name}` is not a plan entry"
                    )));
                };
                graph.add_edge(dependency, dependent, "");
            }
        }

        let rendered = format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]));
        debug!(nodes = graph.node_count(), edges = graph.edge_count(); "Exported DOT graph");
        Ok(rendered)
    }
}
