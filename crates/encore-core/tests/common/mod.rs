//! Common test utilities for encore-core integration tests

pub mod fixtures;
pub mod mock_stores;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_stores::{InterleavingStore, UnavailableStore};
