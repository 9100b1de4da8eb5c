//! Encore Types - Shared domain types
//!
//! This crate contains domain types used across Encore crates:
//! - User identity and the request-scoped admin credential
//! - Subscription records, derived status and audit history
//! - Payment-provider notification events and money

pub mod error;
pub mod identity;
pub mod money;
pub mod notification;
pub mod subscription;
pub mod window;

pub use error::*;
pub use identity::*;
pub use money::*;
pub use notification::*;
pub use subscription::*;
pub use window::*;
