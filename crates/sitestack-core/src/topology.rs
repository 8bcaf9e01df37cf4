//! Deployment topologies.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// The deployment shape of a stack.
///
/// Selecting a topology fully determines which resource kinds a stack
/// contains and how its access policy is shaped. The names match external
/// configuration strings (snake_case).
///
/// # Variants
///
/// - `PrivateEdgeCached` - Locked-down bucket behind a caching distribution (default)
/// - `PublicDirect` - Bucket served directly with an anonymous-read policy
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Private origin bucket fronted by an edge distribution (default)
    #[default]
    #[serde(alias = "private-edge-cached")]
    PrivateEdgeCached,
    /// Publicly readable bucket without a distribution
    #[serde(alias = "public-direct")]
    PublicDirect,
}

impl Topology {
    /// Returns `true` if the topology places a distribution in front of the bucket.
    pub fn has_distribution(self) -> bool {
        matches!(self, Topology::PrivateEdgeCached)
    }
}

impl FromStr for Topology {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private_edge_cached" | "private-edge-cached" => Ok(Self::PrivateEdgeCached),
            "public_direct" | "public-direct" => Ok(Self::PublicDirect),
            _ => Err("Unsupported topology"),
        }
    }
}

impl From<Topology> for &'static str {
    fn from(val: Topology) -> Self {
        match val {
            Topology::PrivateEdgeCached => "private_edge_cached",
            Topology::PublicDirect => "public_direct",
        }
    }
}

impl Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}
