//! Asset classes and the transformations applied to them.
//!
//! - [`class`]: what each task reads and where it writes
//! - [`pattern`]: single-level `<dir>/*.<ext>` source patterns
//! - [`style`] / [`minify`] / [`script`]: grass, lightningcss and oxc wrappers

pub mod class;
pub mod minify;
pub mod pattern;
pub mod script;
pub mod style;

pub use class::{AssetClass, is_webp_source};
pub use minify::{minify_css, minify_js};
pub use script::{concat, transpile_js};
pub use style::{autoprefix, compile_sass, is_partial};
