//! Common test utilities for image-acquire integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod sources;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use sources::*;
