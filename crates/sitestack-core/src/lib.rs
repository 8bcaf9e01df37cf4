//! Sitestack Core Types and Definitions
//!
//! This crate provides the foundational types shared by every stage of stack
//! synthesis. It includes:
//!
//! - **Identifiers**: String-interned resource names ([`identifier::Id`])
//! - **Tokens**: Deferred references to backend-generated values ([`token::Token`])
//! - **Expressions**: Text mixing literals and tokens ([`expr::Expr`])
//! - **Values**: Resource property values ([`value::Value`])
//! - **Policies**: Typed access-policy documents ([`policy::PolicyDocument`])
//! - **Resources**: Resource kinds and nodes ([`resource`] module)
//! - **Templates**: Parsed content templates ([`template::Template`])
//! - **Topology**: Deployment shapes ([`topology::Topology`])

pub mod expr;
pub mod identifier;
pub mod policy;
pub mod resource;
pub mod template;
pub mod token;
pub mod topology;
pub mod value;
