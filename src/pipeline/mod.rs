//! Build pipeline: step vocabulary, per-profile table, runner and composer.
//!
//! ```text
//! CLI ─► compose::run_plan ─► Task::Clear ─► clean::clean_output
//!                           └► Task::Asset ─► runner::run_asset_task
//!                                              └► table::steps_for ─► Step::apply
//! ```

mod clean;
mod compose;
mod runner;
mod step;
mod table;


pub use compose::{BuildReport, Task, build_plan, run_plan};
pub use runner::TaskContext;
