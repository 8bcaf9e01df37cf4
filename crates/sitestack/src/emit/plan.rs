//! The provisioning plan handed to the backend.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use sitestack_core::{
    identifier::Id,
    resource::{ResourceKind, ResourceNode},
};

use crate::{SitestackError, config::ProviderConfig};

/// Whether the backend creates an entry or only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Managed,
    Data,
}

/// One resource declaration with every reference resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    name: Id,
    kind: ResourceKind,
    mode: Mode,
    backend_type: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<Id>,
    properties: Map<String, JsonValue>,
}

impl PlanEntry {
    pub(crate) fn new(
        node: &ResourceNode,
        depends_on: Vec<Id>,
        properties: Map<String, JsonValue>,
    ) -> Self {
        let kind = node.kind();
        Self {
            name: node.name(),
            kind,
            mode: if kind.is_data() {
                Mode::Data
            } else {
                Mode::Managed
            },
            backend_type: kind.backend_type(),
            depends_on,
            properties,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn backend_type(&self) -> &'static str {
        self.backend_type
    }

    /// Names of the entries this entry must be created after.
    pub fn depends_on(&self) -> &[Id] {
        &self.depends_on
    }

    pub fn properties(&self) -> &Map<String, JsonValue> {
        &self.properties
    }

    /// Look up a resolved property.
    pub fn property(&self, key: &str) -> Option<&JsonValue> {
        self.properties.get(key)
    }

    /// The backend address, e.g. `aws_s3_bucket.static_website`.
    pub fn address(&self) -> String {
        match self.mode {
            Mode::Managed => format!("{}.{}", self.backend_type, self.name),
            Mode::Data => format!("data.{}.{}", self.backend_type, self.name),
        }
    }
}

/// A value surfaced to the operator after apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanOutput {
    name: Id,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<Id>,
}

impl PlanOutput {
    /// Build an output from an emitted output node's resolved properties.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::Graph`] if the node has no text `value`.
    pub(crate) fn new(
        name: Id,
        properties: Map<String, JsonValue>,
        depends_on: Vec<Id>,
    ) -> Result<Self, SitestackError> {
        let text = |key: &str| properties.get(key).and_then(JsonValue::as_str);
        let Some(value) = text("value") else {
            return Err(SitestackError::Graph(format!(
                "output `{name}` has no text value"
            )));
        };
        Ok(Self {
            name,
            value: value.to_string(),
            description: text("description").map(str::to_string),
            depends_on,
        })
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn depends_on(&self) -> &[Id] {
        &self.depends_on
    }
}

/// An ordered list of resource declarations and the outputs read from them.
///
/// Every entry appears after all entries it depends on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisioningPlan {
    stack: String,
    provider: ProviderConfig,
    entries: Vec<PlanEntry>,
    outputs: Vec<PlanOutput>,
}

impl ProvisioningPlan {
    pub(crate) fn new(stack: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            stack: stack.into(),
            provider,
            entries: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub(crate) fn push_entry(&mut self, entry: PlanEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn push_output(&mut self, output: PlanOutput) {
        self.outputs.push(output);
    }

    /// Returns the deployment name.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Returns the provider configuration.
    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Returns the entries in emission order.
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    /// Returns the outputs in emission order.
    pub fn outputs(&self) -> &[PlanOutput] {
        &self.outputs
    }

    /// Look up an entry by name.
    pub fn entry(&self, name: Id) -> Option<&PlanEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Returns the position of the entry `name` in emission order.
    pub fn position(&self, name: Id) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    /// Look up an output by name.
    pub fn output(&self, name: Id) -> Option<&PlanOutput> {
        self.outputs.iter().find(|output| output.name == name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_entry_address() {
        let node = ResourceNode::new(Id::new("caller_identity"), ResourceKind::CallerIdentity);
        let entry = PlanEntry::new(&node, Vec::new(), Map::new());
        assert_eq!(entry.address(), "data.aws_caller_identity.caller_identity");

        let node = ResourceNode::new(Id::new("static_website"), ResourceKind::Bucket);
        let entry = PlanEntry::new(&node, Vec::new(), Map::new());
        assert_eq!(entry.mode(), Mode::Managed);
        assert_eq!(entry.address(), "aws_s3_bucket.static_website");
    }

    #[test]
    fn test_output_requires_text_value() {
        let mut properties = Map::new();
        properties.insert("value".to_string(), json!(true));

        assert!(matches!(
            PlanOutput::new(Id::new("out"), properties, Vec::new()),
            Err(SitestackError::Graph(_))
        ));
    }

    #[test]
    fn test_plan_serialization() {
        let node = ResourceNode::new(Id::new("static_website"), ResourceKind::Bucket);
        let mut properties = Map::new();
        properties.insert("bucket".to_string(), json!("demo-bucket"));

        let mut plan = ProvisioningPlan::new("static-website", ProviderConfig::new("eu-central-1"));
        plan.push_entry(PlanEntry::new(&node, Vec::new(), properties));

        assert_eq!(
            serde_json::to_value(&plan).unwrap(),
            json!({
                "stack": "static-website",
                "provider": { "region": "eu-central-1" },
                "entries": [{
                    "name": "static_website",
                    "kind": "bucket",
                    "mode": "managed",
                    "backend_type": "aws_s3_bucket",
                    "properties": { "bucket": "demo-bucket" }
                }],
                "outputs": []
            })
        );
        assert_eq!(plan.position(Id::new("static_website")), Some(0));
        assert!(plan.entry(Id::new("missing")).is_none());
    }
}
