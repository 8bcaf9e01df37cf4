//! Error types for sitestack operations.
//!
//! This module provides the main error type [`SitestackError`] which wraps
//! the error conditions that can occur while synthesizing a stack.

use std::io;

use thiserror::Error;

use sitestack_core::{
    identifier::Id,
    token::{ResolveError, Token},
};
use sitestack_parser::error::ParseError;

use crate::identity::IdentityError;

/// The main error type for sitestack operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the diagnostics together with the text they
/// point into (a content template or an output expression), for rich error
/// reporting.
#[derive(Debug, Error)]
pub enum SitestackError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("`{node}` reads `{token}` before `{owner}` was emitted", owner = .token.owner())]
    UnresolvedTokenReference { node: Id, token: Token },

    #[error("Cyclic dependency between {}", join_ids(.nodes))]
    CyclicDependency { nodes: Vec<Id> },

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Identity lookup error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for SitestackError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl SitestackError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Attribute a token resolution failure to the node being emitted.
    pub fn from_resolve(node: Id, err: ResolveError) -> Self {
        match err {
            ResolveError::Unresolved(token) => Self::UnresolvedTokenReference { node, token },
            ResolveError::AlreadyResolved(_) => Self::Graph(format!("`{node}`: {err}")),
            ResolveError::Encode(_) => Self::Export(Box::new(err)),
        }
    }
}

fn join_ids(ids: &[Id]) -> String {
    ids.iter()
        .map(|id| format!("`{id}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
