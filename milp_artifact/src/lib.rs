//! Reading the artifacts of an external MILP solver run: the transcript it printed and the
//! solution file it wrote.

pub mod config;
pub mod error;
pub mod summary;

pub use config::{ArtifactConfig, SolverSpec, SolverSpecs};
pub use error::{ArtifactError, Result};
pub use summary::{
    extract_summary, parse_external_solver_output, parse_variable_values, ModelType,
    SolveStatus, SolverReport, SolverSummary, VariableValues,
};
