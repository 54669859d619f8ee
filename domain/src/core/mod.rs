//! Core domain concepts shared across all subdomains.
//!
//! - [`ids::ConversationId`] / [`ids::MessageId`]: identities
//! - [`model_key::ModelKey`]: upstream model selector
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod ids;
pub mod model_key;
