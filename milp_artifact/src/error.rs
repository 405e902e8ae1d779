use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No specification is registered for the solver.
    #[error("unknown solver: {0}")]
    UnknownSolver(String),

    /// The transcript does not report a solve time. The solver is probably installed but
    /// could not run, e.g. because of a missing license.
    #[error("no solve time in the output of {solver}; the solver license may be missing")]
    MissingSolverOutput { solver: String },

    #[error("invalid solve time `{0}`")]
    InvalidSolveTime(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ArtifactError>;
