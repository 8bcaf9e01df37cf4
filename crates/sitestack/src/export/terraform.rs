//! Terraform JSON configuration.
//!
//! Entries become `resource` or `data` blocks keyed by backend type and
//! node name, outputs become `output` blocks, and the provider settings
//! become a single `aws` provider. Dependencies are written as explicit
//! `depends_on` addresses because some references were resolved to literals.
//!
//! Plan text is already in Terraform's interpolation syntax, with literal
//! `${` and `%{` escaped, so property values are written unchanged.

use log::debug;
use serde_json::{Map, Value, json};

use sitestack_core::identifier::Id;

use crate::emit::{Mode, PlanEntry, ProvisioningPlan};

use super::{Error, Exporter};

/// Writes a configuration the Terraform CLI can apply.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerraformExporter;

impl Exporter for TerraformExporter {
    fn export(&self, plan: &ProvisioningPlan) -> Result<String, Error> {
        let mut resources: Map<String, Value> = Map::new();
        let mut data: Map<String, Value> = Map::new();

        for entry in plan.entries() {
            let mut block = entry.properties().clone();
            if !entry.depends_on().is_empty() {
                block.insert(
                    "depends_on".to_string(),
                    addresses(plan, entry.depends_on())?,
                );
            }

            let section = match entry.mode() {
                Mode::Managed => &mut resources,
                Mode::Data => &mut data,
            };
            let Value::Object(by_type) = section
                .entry(entry.backend_type())
                .or_insert_with(|| Value::Object(Map::new()))
            else {
                return Err(Error::Render(format!(
                    "`{}` is not an object block",
                    entry.backend_type()
                )));
            };
            by_type.insert(entry.name().to_name(), Value::Object(block));
        }

        let mut outputs = Map::new();
        for output in plan.outputs() {
            let mut block = Map::new();
            block.insert("value".to_string(), Value::from(output.value()));
            if let Some(description) = output.description() {
                block.insert("description".to_string(), Value::from(description));
            }
            if !output.depends_on().is_empty() {
                block.insert(
                    "depends_on".to_string(),
                    addresses(plan, output.depends_on())?,
                );
            }
            outputs.insert(output.name().to_name(), Value::Object(block));
        }

        let mut config = Map::new();
        config.insert(
            "provider".to_string(),
            json!({ "aws": [{ "region": plan.provider().region() }] }),
        );
        for (key, section) in [("data", data), ("resource", resources), ("output", outputs)] {
            if !section.is_empty() {
                config.insert(key.to_string(), Value::Object(section));
            }
        }

        let rendered = serde_json::to_string_pretty(&Value::Object(config))?;
        debug!(stack = plan.stack(), bytes = rendered.len(); "Exported Terraform configuration");
        Ok(rendered)
    }
}

fn addresses(plan: &ProvisioningPlan, names: &[Id]) -> Result<Value, Error> {
    names
        .iter()
        .map(|&name| {
            plan.entry(name)
                .map(PlanEntry::address)
                .map(Value::from)
                .ok_or_else(|| Error::Render(format!("dependency `{name}` is not a plan entry")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
