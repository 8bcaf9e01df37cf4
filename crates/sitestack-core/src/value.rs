//! Resource property values.
//!
//! A [`Value`] is either known at declaration time or contains tokens that
//! the plan emitter substitutes once their owners exist. Resolution turns a
//! value into plain JSON.

use indexmap::IndexMap;

use crate::{
    expr::Expr,
    policy::PolicyDocument,
    token::{ResolveError, Token, TokenTable},
};

/// A property value of a resource node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    /// Text, possibly containing tokens.
    Text(Expr),
    List(Vec<Value>),
    /// Nested block with ordered keys.
    Map(IndexMap<String, Value>),
    /// A typed policy document, encoded as compact JSON text when resolved.
    Policy(PolicyDocument),
}

impl Value {
    /// Build a list value.
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a nested block value.
    pub fn map<K: Into<String>, V: Into<Value>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Returns the text expression, if this is a text value.
    pub fn as_text(&self) -> Option<&Expr> {
        match self {
            Value::Text(expr) => Some(expr),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the policy document, if this is a policy value.
    pub fn as_policy(&self) -> Option<&PolicyDocument> {
        match self {
            Value::Policy(document) => Some(document),
            _ => None,
        }
    }

    /// Look up a key of a nested block.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Collect every token referenced by this value, in declaration order.
    pub fn tokens(&self) -> Vec<Token> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens(&self, out: &mut Vec<Token>) {
        match self {
            Value::Bool(_) | Value::Int(_) => {}
            Value::Text(expr) => out.extend(expr.tokens()),
            Value::List(items) => items.iter().for_each(|item| item.collect_tokens(out)),
            Value::Map(entries) => entries
                .values()
                .for_each(|value| value.collect_tokens(out)),
            Value::Policy(document) => out.extend(document.tokens()),
        }
    }

    /// Substitute every token and convert to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unresolved`] if any referenced token has no
    /// value yet.
    pub fn resolve(&self, tokens: &TokenTable) -> Result<serde_json::Value, ResolveError> {
        Ok(match self {
            Value::Bool(value) => serde_json::Value::Bool(*value),
            Value::Int(value) => serde_json::Value::from(*value),
            Value::Text(expr) => serde_json::Value::String(expr.resolve(tokens)?),
            Value::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| item.resolve(tokens))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), value.resolve(tokens)?)))
                    .collect::<Result<_, ResolveError>>()?,
            ),
            Value::Policy(document) => serde_json::Value::String(document.render(tokens)?),
        })
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(Expr::literal(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Expr::literal(value))
    }
}

impl From<Expr> for Value {
    fn from(value: Expr) -> Self {
        Value::Text(value)
    }
}

impl From<Token> for Value {
    fn from(value: Token) -> Self {
        Value::Text(Expr::token(value))
    }
}

impl From<PolicyDocument> for Value {
    fn from(value: PolicyDocument) -> Self {
        Value::Policy(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}
