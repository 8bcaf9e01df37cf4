//! Typed access-policy documents.
//!
//! Policies are declared as structured statements whose text fields are
//! [`Expr`]s, so references to generated identifiers are substituted on the
//! structure itself. Resolution yields a `PolicyDocument<String>` which has a
//! single canonical JSON encoding.

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    expr::Expr,
    token::{ResolveError, Token, TokenTable},
};

/// Policy language version written into every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Whether a statement grants or refuses access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Who a statement applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Everyone, including anonymous callers (`"*"`).
    Any,
    /// An AWS service principal such as `cloudfront.amazonaws.com`.
    Service(String),
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Principal::Any => serializer.serialize_str("*"),
            Principal::Service(service) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Service", service)?;
                map.end()
            }
        }
    }
}

/// Condition operators used by the generated policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConditionOperator {
    StringEquals,
    Bool,
}

/// Writes a single action as a bare string and several as a list.
fn one_or_many<S: Serializer>(actions: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    match actions {
        [single] => serializer.serialize_str(single),
        many => many.serialize(serializer),
    }
}

/// One statement of a policy document.
///
/// `S` is the type of the substitutable fields: [`Expr`] while declared,
/// `String` once resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement<S = Expr> {
    #[serde(skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
    effect: Effect,
    principal: Principal,
    #[serde(serialize_with = "one_or_many")]
    action: Vec<String>,
    resource: S,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    condition: IndexMap<ConditionOperator, IndexMap<String, S>>,
}

impl Statement<Expr> {
    /// Create a statement with the given effect, principal and resource.
    pub fn new(effect: Effect, principal: Principal, resource: impl Into<Expr>) -> Self {
        Self {
            sid: None,
            effect,
            principal,
            action: Vec::new(),
            resource: resource.into(),
            condition: IndexMap::new(),
        }
    }

    /// Set the statement id.
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    /// Add an action such as `s3:GetObject`.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action.push(action.into());
        self
    }

    /// Add a condition `operator { key: value }`.
    pub fn with_condition(
        mut self,
        operator: ConditionOperator,
        key: impl Into<String>,
        value: impl Into<Expr>,
    ) -> Self {
        self.condition
            .entry(operator)
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Iterate over every token referenced by the statement.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.resource.tokens().chain(
            self.condition
                .values()
                .flat_map(|entries| entries.values())
                .flat_map(Expr::tokens),
        )
    }
}

impl<S> Statement<S> {
    /// Returns the statement id, if any.
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    /// Returns the effect.
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Returns the principal.
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the actions.
    pub fn actions(&self) -> &[String] {
        &self.action
    }

    /// Returns the resource.
    pub fn resource(&self) -> &S {
        &self.resource
    }

    /// Returns the value of condition `operator { key }`, if present.
    pub fn condition(&self, operator: ConditionOperator, key: &str) -> Option<&S> {
        self.condition
            .get(&operator)
            .and_then(|entries| entries.get(key))
    }

    /// Apply `f` to every substitutable field.
    pub fn try_map<T, E>(
        &self,
        mut f: impl FnMut(&S) -> Result<T, E>,
    ) -> Result<Statement<T>, E> {
        let resource = f(&self.resource)?;
        let mut condition = IndexMap::with_capacity(self.condition.len());
        for (operator, entries) in &self.condition {
            let mut mapped = IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                mapped.insert(key.clone(), f(value)?);
            }
            condition.insert(*operator, mapped);
        }
        Ok(Statement {
            sid: self.sid.clone(),
            effect: self.effect,
            principal: self.principal.clone(),
            action: self.action.clone(),
            resource,
            condition,
        })
    }
}

/// A complete policy document.
///
/// # Examples
///
/// ```
/// use sitestack_core::policy::{Effect, PolicyDocument, Principal, Statement};
/// use sitestack_core::token::TokenTable;
///
/// let document = PolicyDocument::new().with_statement(
///     Statement::new(Effect::Allow, Principal::Any, "arn:aws:s3:::demo-bucket/*")
///         .with_action("s3:GetObject"),
/// );
///
/// let json = document.render(&TokenTable::new()).unwrap();
/// assert_eq!(
///     json,
///     r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Principal":"*","Action":"s3:GetObject","Resource":"arn:aws:s3:::demo-bucket/*"}]}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument<S = Expr> {
    version: String,
    statement: Vec<Statement<S>>,
}

impl<S> PolicyDocument<S> {
    /// Returns the statements in declaration order.
    pub fn statements(&self) -> &[Statement<S>] {
        &self.statement
    }

    /// Apply `f` to every substitutable field of every statement.
    pub fn try_map<T, E>(
        &self,
        mut f: impl FnMut(&S) -> Result<T, E>,
    ) -> Result<PolicyDocument<T>, E> {
        let statement = self
            .statement
            .iter()
            .map(|statement| statement.try_map(&mut f))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(PolicyDocument {
            version: self.version.clone(),
            statement,
        })
    }
}

impl PolicyDocument<Expr> {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
        }
    }

    /// Append a statement.
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statement.push(statement);
        self
    }

    /// Iterate over every token referenced by the document.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.statement.iter().flat_map(Statement::tokens)
    }

    /// Substitute every token with its resolved value.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolved`] if any referenced token has no
    /// value yet.
    pub fn resolve(&self, tokens: &TokenTable) -> Result<PolicyDocument<String>, ResolveError> {
        self.try_map(|expr| expr.resolve(tokens))
    }

    /// Resolve the document and encode it as compact JSON.
    ///
    /// # Errors
    ///
    /// Fails with [`ResolveError::Unresolved`] instead of emitting a
    /// placeholder when a referenced node has not been emitted.
    pub fn render(&self, tokens: &TokenTable) -> Result<String, ResolveError> {
        self.resolve(tokens)?.to_json()
    }
}

impl Default for PolicyDocument<Expr> {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyDocument<String> {
    /// Encode the resolved document as compact JSON.
    pub fn to_json(&self) -> Result<String, ResolveError> {
        serde_json::to_string(self).map_err(|err| ResolveError::Encode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{identifier::Id, token::Attribute};

    fn bucket_id() -> Token {
        Token::new(Id::new("static_website"), Attribute::Id)
    }

    fn distribution_id() -> Token {
        Token::new(Id::new("website_distribution"), Attribute::Id)
    }

    fn cloudfront_document() -> PolicyDocument {
        PolicyDocument::new().with_statement(
            Statement::new(
                Effect::Allow,
                Principal::Service("cloudfront.amazonaws.com".to_string()),
                Expr::literal("arn:aws:s3:::")
                    .with_token(bucket_id())
                    .with_literal("/*"),
            )
            .with_sid("AllowCloudFrontServicePrincipalReadOnly")
            .with_action("s3:GetObject")
            .with_condition(
                ConditionOperator::StringEquals,
                "AWS:SourceArn",
                Expr::literal("arn:aws:cloudfront::123456789012:distribution/")
                    .with_token(distribution_id()),
            ),
        )
    }

    #[test]
    fn test_tokens_cover_resource_and_conditions() {
        let tokens: Vec<Token> = cloudfront_document().tokens().collect();
        assert_eq!(tokens, vec![bucket_id(), distribution_id()]);
    }

    #[test]
    fn test_render_resolved_document() {
        let mut tokens = TokenTable::new();
        tokens.resolve(bucket_id(), "demo-bucket").unwrap();
        tokens.resolve(distribution_id(), "E2QWRUHAPOMQZL").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&cloudfront_document().render(&tokens).unwrap()).unwrap();

        assert_eq!(
            json,
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Sid": "AllowCloudFrontServicePrincipalReadOnly",
                    "Effect": "Allow",
                    "Principal": { "Service": "cloudfront.amazonaws.com" },
                    "Action": "s3:GetObject",
                    "Resource": "arn:aws:s3:::demo-bucket/*",
                    "Condition": {
                        "StringEquals": {
                            "AWS:SourceArn": "arn:aws:cloudfront::123456789012:distribution/E2QWRUHAPOMQZL"
                        }
                    }
                }]
            })
        );
    }

    #[test]
    fn test_render_fails_loudly_on_unresolved_token() {
        let mut tokens = TokenTable::new();
        tokens.resolve(bucket_id(), "demo-bucket").unwrap();

        let err = cloudfront_document().render(&tokens).unwrap_err();
        assert_eq!(err, ResolveError::Unresolved(distribution_id()));
    }

    #[test]
    fn test_multiple_actions_serialize_as_list() {
        let document = PolicyDocument::new().with_statement(
            Statement::new(Effect::Deny, Principal::Any, "arn:aws:s3:::demo-bucket/*")
                .with_action("s3:GetObject")
                .with_action("s3:PutObject")
                .with_condition(ConditionOperator::Bool, "aws:SecureTransport", "false"),
        );

        let json: serde_json::Value =
            serde_json::from_str(&document.render(&TokenTable::new()).unwrap()).unwrap();

        assert_eq!(
            json["Statement"][0]["Action"],
            json!(["s3:GetObject", "s3:PutObject"])
        );
        assert_eq!(
            json["Statement"][0]["Condition"]["Bool"]["aws:SecureTransport"],
            json!("false")
        );
    }

    #[test]
    fn test_condition_lookup() {
        let mut tokens = TokenTable::new();
        tokens.resolve(bucket_id(), "demo-bucket").unwrap();
        tokens.resolve(distribution_id(), "E2QWRUHAPOMQZL").unwrap();

        let resolved = cloudfront_document().resolve(&tokens).unwrap();
        let statement = &resolved.statements()[0];

        assert_eq!(
            statement
                .condition(ConditionOperator::StringEquals, "AWS:SourceArn")
                .map(String::as_str),
            Some("arn:aws:cloudfront::123456789012:distribution/E2QWRUHAPOMQZL")
        );
        assert!(statement.condition(ConditionOperator::Bool, "AWS:SourceArn").is_none());
    }
}
