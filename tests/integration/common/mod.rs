//! Shared fixtures for dispatch integration tests.

pub mod assertions;
pub mod helpers;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use helpers::*;
