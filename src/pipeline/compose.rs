//! Entry points as ordered task lists.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use super::clean::clean_output;
use super::runner::{TaskContext, run_asset_task};
use crate::asset::AssetClass;
use crate::log;

/// A unit the composer can schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Clear,
    Asset(AssetClass),
}

impl Task {
    pub fn run(self, ctx: &TaskContext) -> Result<usize> {
        match self {
            Self::Clear => {
                let root = ctx.output_root();
                clean_output(&root).with_context(|| format!("failed to clear {}", root.display()))
            }
            Self::Asset(class) => run_asset_task(class, ctx),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => f.write_str("clear"),
            Self::Asset(class) => class.fmt(f),
        }
    }
}

/// Cleanup followed by every asset task in build order.
pub fn build_plan() -> Vec<Task> {
    std::iter::once(Task::Clear)
        .chain(AssetClass::ALL.into_iter().map(Task::Asset))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: Task,
    /// Files written, or removed for `clear`.
    pub files: usize,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub tasks: Vec<TaskReport>,
    pub elapsed: Duration,
}

impl BuildReport {
    pub fn files_written(&self) -> usize {
        self.tasks
            .iter()
            .filter(|report| report.task != Task::Clear)
            .map(|report| report.files)
            .sum()
    }
}

/// Run tasks in order, stopping at the first failure.
///
/// Output written by tasks that already finished is left in place.
pub fn run_plan(plan: &[Task], ctx: &TaskContext) -> Result<BuildReport> {
    let start = Instant::now();
    let mut report = BuildReport::default();

    for &task in plan {
        let task_start = Instant::now();
        let files = task.run(ctx)?;
        let elapsed = task_start.elapsed();
        log!(&task.to_string(); "{} ({} file{}) in {:.2?}",
            summary(task), files, if files == 1 { "" } else { "s" }, elapsed);
        report.tasks.push(TaskReport { task, files });
    }

    report.elapsed = start.elapsed();
    Ok(report)
}

fn summary(task: Task) -> &'static str {
    match task {
        Task::Clear => "removed previous output",
        Task::Asset(_) => "done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_plan_order() {
        assert_eq!(
            build_plan(),
            [
                Task::Clear,
                Task::Asset(AssetClass::Markup),
                Task::Asset(AssetClass::Sass),
                Task::Asset(AssetClass::Css),
                Task::Asset(AssetClass::Script),
                Task::Asset(AssetClass::Image),
            ]
        );
    }

    #[test]
    fn test_task_names() {
        let names: Vec<_> = build_plan().iter().map(Task::to_string).collect();
        assert_eq!(names, ["clear", "html", "sass", "css", "js", "img"]);
    }
}
