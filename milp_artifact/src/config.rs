use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::Result;

/// How to read the transcript of one solver.
#[derive(Clone, Debug)]
pub struct SolverSpec {
    /// Matches the solve time; the first capture group holds the seconds. `.` also
    /// matches a newline, so a pattern may span lines of the transcript.
    pub time_pattern: Regex,
    /// Printed by the solver iff the model is infeasible.
    pub unsat_condition: String,
}

impl SolverSpec {
    pub fn new(time_pattern: &str, unsat_condition: &str) -> Result<SolverSpec> {
        Ok(SolverSpec {
            time_pattern: Regex::new(&format!("(?s){}", time_pattern))?,
            unsat_condition: String::from(unsat_condition),
        })
    }
}

/// Solver name -> `SolverSpec`.
#[derive(Clone, Debug)]
pub struct SolverSpecs(BTreeMap<String, SolverSpec>);

const DEFAULT_SOLVERS: [(&str, &str, &str); 4] = [
    (
        "glpk",
        r"Time used:[\s]+([0-9]+\.[0-9]+)",
        "PROBLEM HAS NO PRIMAL FEASIBLE SOLUTION",
    ),
    (
        "cplex",
        r"Solution time =[\s]+([0-9]+\.[0-9]+)",
        "MIP - Integer infeasible.",
    ),
    (
        "Gurobi",
        r"Explored [0-9]+ nodes \([0-9]+ simplex iterations\) in ([0-9]+\.[0-9]+) seconds",
        "Model is infeasible",
    ),
    (
        "scip",
        r"Solving Time \(sec\)[\s]+:[\s]+([0-9]+\.[0-9]+)",
        "problem is infeasible",
    ),
];

impl SolverSpecs {
    pub fn empty() -> SolverSpecs {
        SolverSpecs(BTreeMap::new())
    }

    pub fn insert(&mut self, name: &str, spec: SolverSpec) {
        self.0.insert(String::from(name), spec);
    }

    pub fn get(&self, name: &str) -> Option<&SolverSpec> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }
}

impl Default for SolverSpecs {
    /// Specifications for glpk, cplex, Gurobi and scip.
    fn default() -> SolverSpecs {
        let mut ret = SolverSpecs::empty();
        for (name, time_pattern, unsat_condition) in DEFAULT_SOLVERS {
            let spec = SolverSpec::new(time_pattern, unsat_condition)
                .expect("default time patterns are valid");
            ret.insert(name, spec);
        }
        ret
    }
}

/// Where models are written and where the solver leaves its solution.
#[derive(Clone, Debug)]
pub struct ArtifactConfig {
    pub model_dir: PathBuf,
    pub solution_file_name: String,
}

impl ArtifactConfig {
    pub fn new<P: AsRef<Path>>(model_dir: P) -> ArtifactConfig {
        ArtifactConfig {
            model_dir: model_dir.as_ref().to_path_buf(),
            solution_file_name: String::from("milp_model.sol"),
        }
    }

    /// `<model_dir>/<cipher_id>_<model_type>.lp`
    pub fn model_file_path(&self, cipher_id: &str, model_type: &str) -> PathBuf {
        self.model_dir
            .join(format!("{}_{}.lp", cipher_id, model_type))
    }

    pub fn solution_file_path(&self) -> PathBuf {
        self.model_dir.join(&self.solution_file_name)
    }
}

impl Default for ArtifactConfig {
    fn default() -> ArtifactConfig {
        ArtifactConfig::new(".")
    }
}
