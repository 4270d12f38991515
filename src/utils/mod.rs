//! Small helpers shared by the config layer and the dev server.

pub mod mime;
pub mod path;
