//! Configuration utility types.

mod error;

pub use error::ConfigError;
