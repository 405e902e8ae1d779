/// Compiles a stream of statements into an LP listing.
use std::io::{self, BufRead};

use thiserror::Error;
use tracing::{debug, info};

use crate::conditional::{if_elif_else, if_then, if_then_else};
use crate::config::Config;
use crate::error::EncodeError;
use crate::logic::{generalized_and, generalized_or};
use crate::model::{Model, Var, VarKey};
use crate::parser::{parse, Declared, ParseError, ParseResult, Relation, Stmt, VarMap};
use crate::relational::{eq, geq, greater, less, leq, neq};
use crate::truncated::{xor_truncated, xor_truncated_wordwise, BIT_WIDTH, WORD_WIDTH};
use crate::xor::{generalized_xor, xor3};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Parse { line: usize, source: ParseError },
    #[error("line {line}: {source}")]
    Encode { line: usize, source: EncodeError },
}

fn split3(vars: &[Var], width: usize) -> (&[Var], &[Var], &[Var]) {
    let n = vars.len();
    let first = width.min(n);
    let second = (2 * width).min(n);
    (&vars[..first], &vars[first..second], &vars[second..])
}

/// Adds the constraints of `stmt` to `model`. Returns the indicator of the statement, if any.
fn apply(model: &mut Model, stmt: Stmt, config: &Config) -> Result<Option<Var>, EncodeError> {
    let big_m = |m: Option<i64>| m.unwrap_or(config.default_big_m);

    let (indicator, constraints) = match stmt {
        Stmt::Relation(relation, a, b, m) => {
            let (r, constraints) = match relation {
                Relation::Less => less(model, a, b, big_m(m)),
                Relation::Leq => leq(model, a, b, big_m(m)),
                Relation::Greater => greater(model, a, b, big_m(m)),
                Relation::Geq => geq(model, a, b, big_m(m)),
                Relation::Eq => eq(model, a, b, big_m(m)),
                Relation::Neq => neq(model, a, b, big_m(m)),
            };
            (Some(r), constraints)
        }
        Stmt::And(vars) => {
            let (r, constraints) = generalized_and(model, &vars);
            (Some(r), constraints)
        }
        Stmt::Or(vars) => {
            let (r, constraints) = generalized_or(model, &vars);
            (Some(r), constraints)
        }
        Stmt::Xor(inputs, output) => {
            if inputs.len() == 2 {
                (None, xor3(inputs[0], inputs[1], output))
            } else {
                (None, generalized_xor(&inputs, output)?)
            }
        }
        Stmt::XorTruncated(vars) => {
            let (a, b, c) = split3(&vars, BIT_WIDTH);
            (None, xor_truncated(a, b, c)?)
        }
        Stmt::XorTruncatedWordwise(vars) => {
            let (a, b, c) = split3(&vars, WORD_WIDTH);
            (None, xor_truncated_wordwise(a, b, c)?)
        }
        Stmt::Linear(constraint) => (None, vec![constraint]),
        Stmt::IfThen(cond, then_constraints, m) => {
            (None, if_then(cond, &then_constraints, big_m(m)))
        }
        Stmt::IfThenElse(cond, then_constraints, else_constraints, m) => (
            None,
            if_then_else(cond, &then_constraints, &else_constraints, big_m(m)),
        ),
        Stmt::IfElifElse(conds, then_lists, else_constraints, m) => (
            None,
            if_elif_else(model, &conds, &then_lists, &else_constraints, big_m(m))?,
        ),
    };
    debug!(constraints = constraints.len(), "encoded statement");
    model.add_constraints(constraints);
    Ok(indicator)
}

pub fn lp_cli<R: BufRead>(input: &mut R, config: Config) -> Result<String, CliError> {
    let mut var_map = VarMap::new();
    let mut model = Model::new();

    let mut buffer = String::new();
    let mut line_no = 0;
    loop {
        buffer.clear();
        let num_bytes = input.read_line(&mut buffer)?;
        if num_bytes == 0 {
            // EOF
            break;
        }
        line_no += 1;
        let line = buffer.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        let result = parse(&var_map, line).map_err(|source| CliError::Parse {
            line: line_no,
            source,
        })?;
        let registered = match result {
            ParseResult::BinVarDecl(name) => {
                let var = model.named_binary(name);
                var_map.add_binary_var(name, var)
            }
            ParseResult::IntVarDecl(name, low, high) => {
                let var = model.named_integer(name, low, high);
                var_map.add_integer_var(name, var)
            }
            ParseResult::Stmt(stmt) => {
                if let Some(r) = apply(&mut model, stmt, &config)
                    .map_err(|source| CliError::Encode {
                        line: line_no,
                        source,
                    })?
                {
                    debug!(indicator = %model.var_name(r), column = %r.column_name());
                }
                Ok(())
            }
        };
        registered.map_err(|source| CliError::Parse {
            line: line_no,
            source,
        })?;
    }

    info!(
        variables = model.num_vars(),
        constraints = model.constraints().len(),
        "compiled model"
    );

    let mut out = Vec::<u8>::new();
    write_listing(&mut out, &model, &var_map, &config)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn write_listing<W: io::Write>(
    out: &mut W,
    model: &Model,
    var_map: &VarMap,
    config: &Config,
) -> io::Result<()> {
    if config.show_variables {
        for (name, &var) in var_map.iter() {
            let kind = match var {
                Declared::Binary(_) => "bin",
                Declared::Integer(_) => "int",
            };
            writeln!(out, "\\ {} {} = {}", kind, name, var.var().column_name())?;
        }
    }
    if config.show_indicators {
        for (name, var) in model.binary_variables() {
            if !matches!(model.key(var), VarKey::Named(_)) {
                writeln!(out, "\\ aux {} = {}", name, var.column_name())?;
            }
        }
    }
    model.pretty_print(out)
}
