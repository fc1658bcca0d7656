pub mod common;
pub mod config;
pub mod quote;
pub mod store;

#[cfg(feature = "test-utils")]
pub mod test_utils;
