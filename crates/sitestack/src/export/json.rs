//! The provisioning plan as pretty-printed JSON.

use log::debug;

use crate::emit::ProvisioningPlan;

use super::{Error, Exporter};

/// Writes the plan as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanExporter;

impl Exporter for PlanExporter {
    fn export(&self, plan: &ProvisioningPlan) -> Result<String, Error> {
        let json = serde_json::to_string_pretty(plan)?;
        debug!(bytes = json.len(); "Exported plan JSON");
        Ok(json)
    }
}
