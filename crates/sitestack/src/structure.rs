//! Stack graph structures.
//!
//! A stack is built node by node through a [`GraphBuilder`], which checks
//! every cross-node reference when it is sealed into a [`StackGraph`]. The
//! stack graph owns its nodes and yields them in a deterministic dependency
//! order for the plan emitter.

mod graph;

pub use graph::{GraphBuilder, NodeRef, StackGraph};
