//! Markup templating: `@@include`, `@@if` and `@@var` directives.

mod condition;
mod error;
mod include;

pub use include::{Context, resolve_includes};
