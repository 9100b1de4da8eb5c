//! REST API handlers

pub mod health;
pub mod revenue;
pub mod shared;
pub mod subscription;
pub mod users;
pub mod webhook;

pub use health::*;
pub use revenue::*;
pub use subscription::*;
pub use users::*;
pub use webhook::*;
