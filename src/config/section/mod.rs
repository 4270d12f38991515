//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetline.toml`:
//!
//! | Module  | TOML Section | Purpose                          |
//! |---------|--------------|----------------------------------|
//! | `paths` | `[paths]`    | Source tree and output roots     |
//! | `serve` | `[serve]`    | Development server               |

mod paths;
mod serve;

pub use paths::PathsConfig;
pub use serve::ServeConfig;
