//! Stack graph construction and ordering.

use std::{cmp::Reverse, collections::BinaryHeap};

use indexmap::IndexMap;
use log::{debug, trace};
use petgraph::{
    Direction,
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

use sitestack_core::{
    identifier::Id,
    resource::{ResourceKind, ResourceNode},
    token::{Attribute, Token},
};

use crate::SitestackError;

/// A handle to a node already added to a [`GraphBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    name: Id,
    kind: ResourceKind,
}

impl NodeRef {
    /// Returns the node name.
    pub fn name(&self) -> Id {
        self.name
    }

    /// Returns the node kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// A token for one of the node's attributes.
    pub fn token(&self, attribute: Attribute) -> Token {
        Token::new(self.name, attribute)
    }
}

/// Collects the nodes of one deployment.
#[derive(Debug)]
pub struct GraphBuilder {
    name: String,
    nodes: IndexMap<Id, ResourceNode>,
}

impl GraphBuilder {
    /// Create an empty builder for the deployment `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
        }
    }

    /// Add a node.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::Graph`] if a node with the same name exists.
    pub fn add(&mut self, node: ResourceNode) -> Result<NodeRef, SitestackError> {
        let node_ref = NodeRef {
            name: node.name(),
            kind: node.kind(),
        };
        if self.nodes.contains_key(&node_ref.name) {
            return Err(SitestackError::Graph(format!(
                "node `{}` is declared more than once",
                node_ref.name
            )));
        }
        trace!(name:% = node_ref.name, kind:% = node_ref.kind; "Added node");
        self.nodes.insert(node_ref.name, node);
        Ok(node_ref)
    }

    /// Returns `true` if a node named `name` has been added.
    pub fn contains(&self, name: Id) -> bool {
        self.nodes.contains_key(&name)
    }

    /// Returns the kind of the node named `name`.
    pub fn kind_of(&self, name: Id) -> Option<ResourceKind> {
        self.nodes.get(&name).map(ResourceNode::kind)
    }

    /// Check every reference and seal the graph.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::Graph`] if a node depends on a node that was
    /// never added, or reads an attribute its owner's kind does not export.
    pub fn build(self) -> Result<StackGraph, SitestackError> {
        for node in self.nodes.values() {
            for dependency in node.explicit_dependencies() {
                if !self.nodes.contains_key(dependency) {
                    return Err(SitestackError::Graph(format!(
                        "`{}` depends on undeclared node `{dependency}`",
                        node.name()
                    )));
                }
            }
            for token in node.tokens() {
                let Some(owner) = self.nodes.get(&token.owner()) else {
                    return Err(SitestackError::Graph(format!(
                        "`{}` references undeclared node `{}`",
                        node.name(),
                        token.owner()
                    )));
                };
                if !owner.kind().exports(token.attribute()) {
                    return Err(SitestackError::Graph(format!(
                        "`{}` reads `{}` which a {} does not export",
                        node.name(),
                        token.attribute(),
                        owner.kind()
                    )));
                }
            }
        }

        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.nodes.len());
        let mut index = IndexMap::with_capacity(self.nodes.len());
        let mut edges = Vec::new();

        for (name, node) in self.nodes {
            for dependency in node.dependencies() {
                edges.push((dependency, name));
            }
            index.insert(name, graph.add_node(node));
        }
        for (from, to) in edges {
            graph.add_edge(index[&from], index[&to], ());
        }

        debug!(
            stack = self.name,
            nodes = graph.node_count(),
            edges = graph.edge_count();
            "Built stack graph"
        );

        Ok(StackGraph {
            name: self.name,
            graph,
            index,
        })
    }
}

/// The resource nodes of one deployment and their dependencies.
///
/// Edges point from a dependency to the node that depends on it.
#[derive(Debug)]
pub struct StackGraph {
    name: String,
    graph: DiGraph<ResourceNode, ()>,
    index: IndexMap<Id, NodeIndex>,
}

impl StackGraph {
    /// Returns the deployment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up a node by name.
    pub fn node(&self, name: Id) -> Option<&ResourceNode> {
        self.index.get(&name).map(|&index| &self.graph[index])
    }

    /// Iterate over nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.index.values().map(|&index| &self.graph[index])
    }

    /// Iterate over the declared outputs in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes()
            .filter(|node| node.kind() == ResourceKind::Output)
    }

    /// Names of the nodes `name` directly depends on, in declaration order.
    pub fn dependencies_of(&self, name: Id) -> Vec<Id> {
        let Some(&index) = self.index.get(&name) else {
            return Vec::new();
        };
        let mut dependencies: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .collect();
        dependencies.sort();
        dependencies
            .into_iter()
            .map(|dependency| self.graph[dependency].name())
            .collect()
    }

    /// Order the nodes so every node follows all of its dependencies.
    ///
    /// Among nodes whose dependencies are all placed, the one declared first
    /// goes first, so the order is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::CyclicDependency`] naming the nodes on a
    /// cycle if no such order exists.
    pub fn emission_order(&self) -> Result<Vec<&ResourceNode>, SitestackError> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|index| in_degree[index.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(index)) = ready.pop() {
            order.push(&self.graph[index]);
            for dependent in self.graph.neighbors_directed(index, Direction::Outgoing) {
                in_degree[dependent.index()] -= 1;
                if in_degree[dependent.index()] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if order.len() < self.graph.node_count() {
            return Err(SitestackError::CyclicDependency {
                nodes: self.cycle_members(),
            });
        }

        Ok(order)
    }

    /// Names of every node that lies on a cycle, in declaration order.
    fn cycle_members(&self) -> Vec<Id> {
        let mut members: Vec<NodeIndex> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.graph.contains_edge(component[0], component[0])
            })
            .flatten()
            .collect();
        members.sort();
        members
            .into_iter()
            .map(|index| self.graph[index].name())
            .collect()
    }
}
