//! Core types shared across the codebase.

mod profile;
mod state;

pub use profile::BuildProfile;
pub use state::{is_shutdown, register_server, setup_shutdown_handler};
