//! Export functionality for provisioning plans.
//!
//! This module provides the [`Exporter`] trait that renders a
//! [`ProvisioningPlan`] for whoever consumes it. It is the final stage of the
//! sitestack pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Configuration
//!     ↓ validate
//! Site Parameters
//!     ↓ topology
//! Stack Graph
//!     ↓ emit
//! Provisioning Plan
//!     ↓ export (this module)
//! Output File
//! ```
//!
//! # Available Backends
//!
//! - [`json::PlanExporter`]: the plan itself as JSON
//! - [`terraform::TerraformExporter`]: a Terraform JSON configuration
//! - [`dot::DotExporter`]: the dependency graph in Graphviz DOT
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. [`Error`] converts into
//! [`SitestackError::Export`] at the crate boundary.
//!
//! [`SitestackError::Export`]: crate::SitestackError::Export

pub mod dot;
pub mod json;
pub mod terraform;

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::emit::ProvisioningPlan;

/// Abstraction for plan export backends.
pub trait Exporter {
    /// Render `plan` in the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the plan cannot be converted.
    fn export(&self, plan: &ProvisioningPlan) -> Result<String, Error>;
}

/// Available export formats.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// The provisioning plan as JSON (default)
    #[default]
    Plan,
    /// Terraform JSON configuration
    Terraform,
    /// Graphviz DOT dependency graph
    Dot,
}

impl Format {
    /// Returns the exporter for this format.
    pub fn exporter(self) -> Box<dyn Exporter> {
        match self {
            Self::Plan => Box::new(json::PlanExporter),
            Self::Terraform => Box::new(terraform::TerraformExporter),
            Self::Dot => Box::new(dot::DotExporter),
        }
    }
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Self::Plan),
            "terraform" => Ok(Self::Terraform),
            "dot" => Ok(Self::Dot),
            _ => Err("Unsupported export format"),
        }
    }
}

impl From<Format> for &'static str {
    fn from(val: Format) -> Self {
        match val {
            Format::Plan => "plan",
            Format::Terraform => "terraform",
            Format::Dot => "dot",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Errors that can occur during plan export.
///
/// This type is converted into [`SitestackError::Export`] at the crate
/// boundary via the [`From`] implementation in [`crate::error`].
///
/// [`SitestackError::Export`]: crate::SitestackError::Export
#[derive(Debug)]
pub enum Error {
    /// A conversion failure described by `message`.
    Render(String),
    /// A JSON encoding failure.
    Json(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
