#![allow(dead_code)]

pub mod builders;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use builders::{at, SeedBuilder};
#[allow(unused_imports)]
pub use mocks::CountingApi;
#[allow(unused_imports)]
pub use setup::TestSetup;
