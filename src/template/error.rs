//! Template directive errors.

use std::path::PathBuf;
use thiserror::Error;

use super::include::MAX_DEPTH;

/// A markup file with a directive that cannot be resolved.
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("{}:{line}: unterminated `@@{directive}`", .file.display())]
    Unterminated {
        file: PathBuf,
        line: usize,
        directive: &'static str,
    },

    #[error("{}:{line}: invalid @@include arguments: {reason}", .file.display())]
    BadArguments {
        file: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{}:{line}: invalid @@if condition `{condition}`", .file.display())]
    BadCondition {
        file: PathBuf,
        line: usize,
        condition: String,
    },

    #[error("{}:{line}: cannot include `{}`", .file.display(), .target.display())]
    Missing {
        file: PathBuf,
        line: usize,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: include cycle through `{}`", .file.display(), .target.display())]
    Cycle { file: PathBuf, target: PathBuf },

    #[error("{}: includes nested deeper than {MAX_DEPTH} levels", .file.display())]
    TooDeep { file: PathBuf },
}
