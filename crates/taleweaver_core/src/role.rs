//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Author of a message.
///
/// # Examples
///
/// ```
/// use taleweaver_core::Role;
///
/// assert_eq!(format!("{}", Role::System), "System");
/// assert_ne!(Role::User, Role::Model);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum Role {
    /// Instructions that frame the conversation
    System,
    /// Content supplied by the pipeline
    User,
    /// Content produced by the model
    Model,
}
