//! Configuration types for stack synthesis.
//!
//! This module provides the configuration read from TOML files and command
//! line flags, and its validated form [`SiteParameters`]. All configuration
//! types implement [`serde::Deserialize`] and every section is defaulted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`StackConfig`] - Deployment name, topology, bucket and index document.
//! - [`ProviderConfig`] - Provider settings handed to the plan.
//! - [`PublicAccessConfig`] - Access-block overrides for the public topology.
//! - [`ContentConfig`] - Optional inline content template.
//! - [`OutputConfig`] - Extra outputs declared by the operator.
//!
//! # Example
//!
//! ```
//! # use sitestack::config::AppConfig;
//! let params = AppConfig::default()
//!     .with_bucket("demo-bucket")
//!     .validate()
//!     .unwrap();
//! assert_eq!(params.index_document(), "index.html");
//! assert_eq!(params.region(), "eu-central-1");
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use sitestack_core::{identifier::Id, template::Template, topology::Topology};
use sitestack_parser::{ParsedExpression, parse_expression, parse_template};

use crate::{
    SitestackError,
    content::{DEFAULT_TEMPLATE, PLACEHOLDERS},
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Stack configuration section.
    #[serde(default)]
    stack: StackConfig,

    /// Provider configuration section.
    #[serde(default)]
    provider: ProviderConfig,

    /// Public access overrides section.
    #[serde(default)]
    public_access: PublicAccessConfig,

    /// Content configuration section.
    #[serde(default)]
    content: ContentConfig,

    /// Operator-declared outputs.
    #[serde(default)]
    outputs: Vec<OutputConfig>,
}

impl AppConfig {
    /// Returns the stack configuration.
    pub fn stack(&self) -> &StackConfig {
        &self.stack
    }

    /// Returns the provider configuration.
    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Returns the public access overrides.
    pub fn public_access(&self) -> PublicAccessConfig {
        self.public_access
    }

    /// Returns the content configuration.
    pub fn content(&self) -> &ContentConfig {
        &self.content
    }

    /// Returns the operator-declared outputs.
    pub fn outputs(&self) -> &[OutputConfig] {
        &self.outputs
    }

    /// Override the deployment name.
    pub fn with_stack_name(mut self, name: impl Into<String>) -> Self {
        self.stack.name = name.into();
        self
    }

    /// Override the topology.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.stack.topology = topology;
        self
    }

    /// Override the bucket name.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.stack.bucket = bucket.into();
        self
    }

    /// Override the index document name.
    pub fn with_index_document(mut self, index_document: impl Into<String>) -> Self {
        self.stack.index_document = index_document.into();
        self
    }

    /// Override the provider region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.provider.region = region.into();
        self
    }

    /// Override the content template. It must hold exactly one
    /// `{{ timestamp }}` placeholder.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.content.template = Some(template.into());
        self
    }

    /// Override the public access settings.
    pub fn with_public_access(mut self, public_access: PublicAccessConfig) -> Self {
        self.public_access = public_access;
        self
    }

    /// Append an operator-declared output.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.outputs.push(output);
        self
    }

    /// Check the configuration and parse its embedded templates and
    /// expressions.
    ///
    /// # Errors
    ///
    /// Returns [`SitestackError::InvalidConfiguration`] for missing or
    /// inconsistent values, and [`SitestackError::Parse`] for a malformed
    /// content template or output expression.
    pub fn validate(&self) -> Result<SiteParameters, SitestackError> {
        let invalid = |message: &str| Err(SitestackError::InvalidConfiguration(message.to_string()));

        if self.stack.name.trim().is_empty() {
            return invalid("stack name must not be empty");
        }
        if self.provider.region.trim().is_empty() {
            return invalid("region must not be empty");
        }
        if self.stack.bucket.trim().is_empty() {
            return invalid("bucket name must not be empty");
        }
        if self.stack.index_document.trim().is_empty() {
            return invalid("index document must not be empty");
        }
        if self.stack.index_document.starts_with('/') {
            return invalid("index document must be a key relative to the bucket root, without a leading `/`");
        }
        if self.stack.topology == Topology::PublicDirect && self.public_access.restrict_public_buckets
        {
            return invalid(
                "`restrict_public_buckets = true` blocks the public-read policy of the `public_direct` topology",
            );
        }

        let template_source = self.content.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
        let template = parse_template(template_source, PLACEHOLDERS)
            .map_err(|err| SitestackError::new_parse_error(err, template_source))?;

        let mut seen = HashSet::new();
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for output in &self.outputs {
            if !is_output_name(&output.name) {
                return Err(SitestackError::InvalidConfiguration(format!(
                    "output name `{}` must start with a letter or `_` and contain only letters, digits, `_` and `-`",
                    output.name
                )));
            }
            if !seen.insert(output.name.as_str()) {
                return Err(SitestackError::InvalidConfiguration(format!(
                    "output `{}` is declared more than once",
                    output.name
                )));
            }
            let expression = parse_expression(&output.value)
                .map_err(|err| SitestackError::new_parse_error(err, output.value.as_str()))?;
            outputs.push(DeclaredOutput {
                name: Id::new(&output.name),
                source: output.value.clone(),
                expression,
                description: output.description.clone(),
            });
        }

        Ok(SiteParameters {
            stack_name: self.stack.name.clone(),
            topology: self.stack.topology,
            region: self.provider.region.clone(),
            bucket: self.stack.bucket.clone(),
            index_document: self.stack.index_document.clone(),
            public_access: self.public_access,
            template,
            outputs,
        })
    }
}

fn is_output_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Stack configuration section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Deployment name.
    name: String,

    /// Deployment shape.
    topology: Topology,

    /// Bucket name. Required.
    bucket: String,

    /// Object key of the index document.
    index_document: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: "static-website".to_string(),
            topology: Topology::default(),
            bucket: String::new(),
            index_document: "index.html".to_string(),
        }
    }
}

impl StackConfig {
    /// Returns the deployment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the topology.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the index document name.
    pub fn index_document(&self) -> &str {
        &self.index_document
    }
}

/// Provider configuration section.
///
/// Passed explicitly into the plan; there is no process-wide provider state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Cloud region code.
    region: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: "eu-central-1".to_string(),
        }
    }
}

impl ProviderConfig {
    /// Create a provider configuration for `region`.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }

    /// Returns the region.
    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Access-block overrides for the `public_direct` topology.
///
/// The private topology always blocks everything and ignores this section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublicAccessConfig {
    /// Ignore public ACLs on the bucket and its objects.
    pub ignore_public_acls: bool,

    /// Restrict access to buckets with public policies.
    pub restrict_public_buckets: bool,
}

/// Content configuration section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
    /// Inline content template replacing the default page, with a single
    /// `{{ timestamp }}` substitution point.
    #[serde(default)]
    template: Option<String>,
}

impl ContentConfig {
    /// Returns the inline template, if configured.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }
}

/// An operator-declared output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Output name.
    pub name: String,

    /// Output value; may contain `${node.attribute}` references.
    pub value: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// An operator-declared output with its parsed expression.
#[derive(Debug, Clone)]
pub struct DeclaredOutput {
    name: Id,
    source: String,
    expression: ParsedExpression,
    description: Option<String>,
}

impl DeclaredOutput {
    /// Returns the output name.
    pub fn name(&self) -> Id {
        self.name
    }

    /// Returns the expression source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the parsed expression.
    pub fn expression(&self) -> &ParsedExpression {
        &self.expression
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Validated inputs to a topology builder.
#[derive(Debug, Clone)]
pub struct SiteParameters {
    stack_name: String,
    topology: Topology,
    region: String,
    bucket: String,
    index_document: String,
    public_access: PublicAccessConfig,
    template: Template,
    outputs: Vec<DeclaredOutput>,
}

impl SiteParameters {
    /// Returns the deployment name.
    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Returns the topology.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Returns the region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the index document name.
    pub fn index_document(&self) -> &str {
        &self.index_document
    }

    /// Returns the public access overrides.
    pub fn public_access(&self) -> PublicAccessConfig {
        self.public_access
    }

    /// Returns the parsed content template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Returns the operator-declared outputs.
    pub fn outputs(&self) -> &[DeclaredOutput] {
        &self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig::default().with_bucket("demo-bucket")
    }

    fn invalid_message(config: AppConfig) -> String {
        match config.validate() {
            Err(SitestackError::InvalidConfiguration(message)) => message,
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let params = valid().validate().unwrap();

        assert_eq!(params.stack_name(), "static-website");
        assert_eq!(params.topology(), Topology::PrivateEdgeCached);
        assert_eq!(params.region(), "eu-central-1");
        assert_eq!(params.bucket(), "demo-bucket");
        assert_eq!(params.index_document(), "index.html");
        assert_eq!(params.public_access(), PublicAccessConfig::default());
        assert_eq!(params.template().placeholders().collect::<Vec<_>>(), ["timestamp"]);
        assert!(params.outputs().is_empty());
    }

    #[test]
    fn test_empty_values_are_rejected() {
        assert!(invalid_message(AppConfig::default()).contains("bucket"));
        assert!(invalid_message(valid().with_region(" ")).contains("region"));
        assert!(invalid_message(valid().with_stack_name("")).contains("stack name"));
        assert!(invalid_message(valid().with_index_document("")).contains("index document"));
    }

    #[test]
    fn test_index_document_must_be_relative() {
        assert!(invalid_message(valid().with_index_document("/index.html")).contains("leading"));
    }

    #[test]
    fn test_restrict_public_buckets_conflicts_with_public_topology() {
        let config = valid()
            .with_topology(Topology::PublicDirect)
            .with_public_access(PublicAccessConfig {
                ignore_public_acls: false,
                restrict_public_buckets: true,
            });
        assert!(invalid_message(config).contains("restrict_public_buckets"));

        // The private topology ignores the overrides.
        let private = valid().with_public_access(PublicAccessConfig {
            ignore_public_acls: true,
            restrict_public_buckets: true,
        });
        assert!(private.validate().is_ok());
    }

    #[test]
    fn test_duplicate_outputs_are_rejected() {
        let output = OutputConfig {
            name: "site".to_string(),
            value: "https://example.com".to_string(),
            description: None,
        };
        let config = valid().with_output(output.clone()).with_output(output);

        assert!(invalid_message(config).contains("more than once"));
    }

    #[test]
    fn test_malformed_template_is_a_parse_error() {
        let err = valid().with_template("{{ clock }}").validate().unwrap_err();
        match err {
            SitestackError::Parse { err, src } => {
                assert_eq!(src, "{{ clock }}");
                assert_eq!(err.diagnostics().len(), 1);
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_template_needs_one_timestamp() {
        let codes = |template: &str| match valid().with_template(template).validate() {
            Err(SitestackError::Parse { err, .. }) => err
                .diagnostics()
                .iter()
                .filter_map(|diag| diag.code())
                .map(|code| code.as_str())
                .collect::<Vec<_>>(),
            other => panic!("expected Parse, got {other:?}"),
        };

        assert_eq!(codes("<html>static</html>"), ["E204"]);
        assert_eq!(codes("{{ timestamp }}/{{ timestamp }}"), ["E203"]);
        assert_eq!(codes("{{ bucket }}-{{ timestamp }}"), ["E200"]);

        let params = valid().with_template("<p>{{timestamp}}</p>").validate().unwrap();
        assert_eq!(params.template().placeholders().collect::<Vec<_>>(), ["timestamp"]);
    }

    #[test]
    fn test_output_expressions_are_parsed() {
        let params = valid()
            .with_output(OutputConfig {
                name: "bucket_arn".to_string(),
                value: "${static_website.arn}".to_string(),
                description: Some("ARN of the bucket".to_string()),
            })
            .validate()
            .unwrap();

        let output = &params.outputs()[0];
        assert_eq!(output.name(), Id::new("bucket_arn"));
        assert_eq!(output.expression().references().len(), 1);
        assert_eq!(output.description(), Some("ARN of the bucket"));
    }

    #[test]
    fn test_deserialize_sections() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "stack": { "bucket": "demo-bucket", "topology": "public_direct" },
            "provider": { "region": "us-west-2" },
            "public_access": { "ignore_public_acls": true },
            "outputs": [{ "name": "home", "value": "https://example.com" }]
        }))
        .unwrap();

        assert_eq!(config.stack().name(), "static-website");
        assert_eq!(config.stack().topology(), Topology::PublicDirect);
        assert_eq!(config.provider().region(), "us-west-2");
        assert!(config.public_access().ignore_public_acls);
        assert!(!config.public_access().restrict_public_buckets);
        assert_eq!(config.outputs().len(), 1);
        assert!(config.content().template().is_none());
    }
}
