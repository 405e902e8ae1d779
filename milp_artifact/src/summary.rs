use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::sync::OnceLock;

use milp_logic::model::{Model, Var};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{ArtifactConfig, SolverSpecs};
use crate::error::{ArtifactError, Result};

/// Scale between the probability variable and the weight it encodes.
const PROBABILITY_SCALE: f64 = 10.0;

/// Name of the integer variable holding the scaled weight of a trail.
pub const PROBABILITY_VARIABLE: &str = "probability";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveStatus {
    Satisfiable,
    Unsatisfiable,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Satisfiable => write!(f, "SATISFIABLE"),
            SolveStatus::Unsatisfiable => write!(f, "UNSATISFIABLE"),
        }
    }
}

/// Kind of the model that was solved; it appears in model file names.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ModelType {
    Cipher,
    XorDifferential,
    XorLinear,
    DeterministicTruncatedXorDifferential,
    WordwiseDeterministicTruncatedXorDifferential,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Cipher => "cipher",
            ModelType::XorDifferential => "xor_differential",
            ModelType::XorLinear => "xor_linear",
            ModelType::DeterministicTruncatedXorDifferential => {
                "deterministic_truncated_xor_differential"
            }
            ModelType::WordwiseDeterministicTruncatedXorDifferential => {
                "wordwise_deterministic_truncated_xor_differential"
            }
        }
    }

    /// Whether the probability variable holds the weight unscaled.
    pub fn is_deterministic_truncated(self) -> bool {
        matches!(
            self,
            ModelType::DeterministicTruncatedXorDifferential
                | ModelType::WordwiseDeterministicTruncatedXorDifferential
        )
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SolverSummary {
    pub status: SolveStatus,
    /// Seconds, as reported by the solver.
    pub solve_time: f64,
}

/// Reads status and solve time from a solver transcript.
pub fn extract_summary(
    specs: &SolverSpecs,
    solver_name: &str,
    transcript: &str,
) -> Result<SolverSummary> {
    let spec = specs
        .get(solver_name)
        .ok_or_else(|| ArtifactError::UnknownSolver(String::from(solver_name)))?;

    let caps = spec.time_pattern.captures(transcript).ok_or_else(|| {
        ArtifactError::MissingSolverOutput {
            solver: String::from(solver_name),
        }
    })?;
    let time_text = caps.get(1).map_or("", |m| m.as_str());
    let solve_time = time_text
        .parse::<f64>()
        .map_err(|_| ArtifactError::InvalidSolveTime(String::from(time_text)))?;

    let status = if transcript.contains(&spec.unsat_condition) {
        SolveStatus::Unsatisfiable
    } else {
        SolveStatus::Satisfiable
    };
    debug!(solver = solver_name, %status, solve_time, "solver summary");
    Ok(SolverSummary { status, solve_time })
}

/// Values read from a solution file.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct VariableValues {
    pub values: BTreeMap<String, f64>,
    /// Requested variables without a record in the file. Their value is reported as 0.0.
    pub unmatched: Vec<String>,
}

fn record_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b[xyz]_(\d+)\s+\*?\s*(-?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)").unwrap()
    })
}

/// Looks up the value of every requested variable. A variable with index `i` is recorded as
/// `x_<i+1>` (or `y_`/`z_`), optionally followed by `*`, then its value. The first record of
/// an index wins.
pub fn parse_variable_values(requested: &[(String, Var)], solution: &str) -> VariableValues {
    let mut records = BTreeMap::<usize, f64>::new();
    for caps in record_pattern().captures_iter(solution) {
        let (Ok(column), Ok(value)) = (caps[1].parse::<usize>(), caps[2].parse::<f64>()) else {
            continue;
        };
        records.entry(column).or_insert(value);
    }

    let mut ret = VariableValues::default();
    for (name, var) in requested {
        let value = match records.get(&(var.index() + 1)) {
            Some(&v) => v,
            None => {
                warn!(variable = %name, column = %var.column_name(), "no value in solution file, using 0.0");
                ret.unmatched.push(name.clone());
                0.0
            }
        };
        ret.values.insert(name.clone(), value);
    }
    ret
}

#[derive(Clone, PartialEq, Debug)]
pub struct SolverReport {
    pub status: SolveStatus,
    /// Weight of the solution, `None` when unsatisfiable or when the model has no
    /// probability variable.
    pub total_weight: Option<f64>,
    /// Values of the integer variables.
    pub probability_variables: VariableValues,
    /// Values of the binary variables.
    pub components_variables: VariableValues,
    pub solve_time: f64,
}

/// Builds the report of a finished solver run. The solution file is read only when the
/// transcript does not declare the model infeasible.
pub fn parse_external_solver_output(
    config: &ArtifactConfig,
    specs: &SolverSpecs,
    model: &Model,
    model_type: ModelType,
    solver_name: &str,
    transcript: &str,
) -> Result<SolverReport> {
    let summary = extract_summary(specs, solver_name, transcript)?;

    let mut report = SolverReport {
        status: summary.status,
        total_weight: None,
        probability_variables: VariableValues::default(),
        components_variables: VariableValues::default(),
        solve_time: summary.solve_time,
    };
    if summary.status == SolveStatus::Unsatisfiable {
        return Ok(report);
    }

    let path = config.solution_file_path();
    let solution = fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
        path: path.clone(),
        source,
    })?;

    report.components_variables = parse_variable_values(&model.binary_variables(), &solution);
    report.probability_variables = parse_variable_values(&model.integer_variables(), &solution);
    report.total_weight = report
        .probability_variables
        .values
        .get(PROBABILITY_VARIABLE)
        .map(|&p| {
            if model_type.is_deterministic_truncated() {
                p
            } else {
                p / PROBABILITY_SCALE
            }
        });
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverSpec;
    use milp_logic::model::VarKey;
    use std::io::Write;

    fn requested(model: &mut Model, names: &[&str]) -> Vec<(String, Var)> {
        names
            .iter()
            .map(|&name| (String::from(name), model.named_binary(name)))
            .collect()
    }

    #[test]
    fn test_parse_variable_values() {
        let mut model = Model::new();
        let vars = requested(&mut model, &["a", "b", "c"]);

        let values = parse_variable_values(&vars, "x_1 * 0.5\ny_2 1.0");
        assert_eq!(values.values["a"], 0.5);
        assert_eq!(values.values["b"], 1.0);
        assert_eq!(values.values["c"], 0.0);
        assert_eq!(values.unmatched, vec![String::from("c")]);
    }

    #[test]
    fn test_parse_variable_values_columns() {
        let mut model = Model::new();
        let names = (0..12).map(|i| format!("v{}", i)).collect::<Vec<_>>();
        let names = names.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        let vars = requested(&mut model, &names);

        // x_1 must not pick up the record of x_10 or x_11
        let text = "   10 x_10         *              3\n   11 x_11  2.5e1\n   1 z_1 -1\n x_1 7\n";
        let values = parse_variable_values(&vars, text);
        assert_eq!(values.values["v0"], -1.0);
        assert_eq!(values.values["v9"], 3.0);
        assert_eq!(values.values["v10"], 25.0);
        assert_eq!(values.unmatched.len(), 9);
    }

    #[test]
    fn test_parse_variable_values_same_rendered_name() {
        let mut model = Model::new();
        let a = model.named_binary("a");
        let b = model.named_binary("b");
        let user = model.named_binary("a_and_b_dummy");
        let and_ab = model.binary_variable(VarKey::And(vec![a, b]));
        assert_eq!(model.var_name(user), model.var_name(and_ab));

        let requested = model.binary_variables();
        let values = parse_variable_values(&requested, "x_3 0\nx_4 1\n");
        assert_eq!(values.values.len(), requested.len());
        assert_eq!(values.values["a_and_b_dummy"], 0.0);
        assert_eq!(values.values["a_and_b_dummy_x_4"], 1.0);
        assert_eq!(values.unmatched, vec![String::from("a"), String::from("b")]);
    }

    #[test]
    fn test_extract_summary() {
        let specs = SolverSpecs::default();

        let transcript = "INTEGER OPTIMAL SOLUTION FOUND\nTime used:   0.1 secs\n";
        let summary = extract_summary(&specs, "glpk", transcript).unwrap();
        assert_eq!(summary.status, SolveStatus::Satisfiable);
        assert_eq!(summary.solve_time, 0.1);

        let transcript = "Explored 0 nodes (0 simplex iterations) in 0.02 seconds\nModel is infeasible\n";
        let summary = extract_summary(&specs, "Gurobi", transcript).unwrap();
        assert_eq!(summary.status, SolveStatus::Unsatisfiable);
        assert_eq!(summary.status.to_string(), "UNSATISFIABLE");
        assert_eq!(summary.solve_time, 0.02);
    }

    #[test]
    fn test_extract_summary_errors() {
        let specs = SolverSpecs::default();
        assert!(matches!(
            extract_summary(&specs, "scip", "license not found"),
            Err(ArtifactError::MissingSolverOutput { .. })
        ));
        assert!(matches!(
            extract_summary(&specs, "minisat", "Time used: 0.1"),
            Err(ArtifactError::UnknownSolver(_))
        ));

        let mut specs = SolverSpecs::empty();
        specs.insert("toy", SolverSpec::new(r"time (\S+)", "infeasible").unwrap());
        assert!(matches!(
            extract_summary(&specs, "toy", "time soon"),
            Err(ArtifactError::InvalidSolveTime(_))
        ));
    }

    fn probability_model() -> Model {
        let mut model = Model::new();
        model.named_binary("a");
        model.named_binary("b");
        model.named_integer(PROBABILITY_VARIABLE, 0, 1000);
        model
    }

    #[test]
    fn test_parse_external_solver_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArtifactConfig::new(dir.path());
        let mut file = std::fs::File::create(config.solution_file_path()).unwrap();
        writeln!(file, "x_1 * 1\nx_2 * 0\nx_3 * 35").unwrap();
        drop(file);

        let specs = SolverSpecs::default();
        let model = probability_model();
        let transcript = "Solution time =    0.25 sec.";

        let report = parse_external_solver_output(
            &config,
            &specs,
            &model,
            ModelType::XorDifferential,
            "cplex",
            transcript,
        )
        .unwrap();
        assert_eq!(report.status, SolveStatus::Satisfiable);
        assert_eq!(report.solve_time, 0.25);
        assert_eq!(report.total_weight, Some(3.5));
        assert_eq!(report.components_variables.values["a"], 1.0);
        assert_eq!(report.components_variables.values["b"], 0.0);
        assert!(report.components_variables.unmatched.is_empty());
        assert_eq!(report.probability_variables.values[PROBABILITY_VARIABLE], 35.0);

        let report = parse_external_solver_output(
            &config,
            &specs,
            &model,
            ModelType::DeterministicTruncatedXorDifferential,
            "cplex",
            transcript,
        )
        .unwrap();
        assert_eq!(report.total_weight, Some(35.0));
    }

    #[test]
    fn test_parse_external_solver_output_unsat() {
        // the solution file is not read for an infeasible model
        let dir = tempfile::tempdir().unwrap();
        let config = ArtifactConfig::new(dir.path().join("missing"));
        let report = parse_external_solver_output(
            &config,
            &SolverSpecs::default(),
            &probability_model(),
            ModelType::XorDifferential,
            "scip",
            "problem is infeasible\nSolving Time (sec) : 0.01\n",
        )
        .unwrap();
        assert_eq!(report.status, SolveStatus::Unsatisfiable);
        assert_eq!(report.total_weight, None);
        assert!(report.components_variables.values.is_empty());
    }

    #[test]
    fn test_parse_external_solver_output_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArtifactConfig::new(dir.path().join("missing"));
        assert!(matches!(
            parse_external_solver_output(
                &config,
                &SolverSpecs::default(),
                &probability_model(),
                ModelType::XorLinear,
                "glpk",
                "Time used: 1.5 secs",
            ),
            Err(ArtifactError::Io { .. })
        ));
    }

    #[test]
    fn test_model_without_probability() {
        let dir = tempfile::tempdir().unwrap();
        let config = ArtifactConfig::new(dir.path());
        std::fs::write(config.solution_file_path(), "x_1 1\n").unwrap();

        let mut model = Model::new();
        model.named_binary("a");
        let report = parse_external_solver_output(
            &config,
            &SolverSpecs::default(),
            &model,
            ModelType::Cipher,
            "glpk",
            "Time used: 1.5 secs",
        )
        .unwrap();
        assert_eq!(report.total_weight, None);
        assert_eq!(report.components_variables.values["a"], 1.0);
        assert_eq!(ModelType::Cipher.to_string(), "cipher");
    }
}
