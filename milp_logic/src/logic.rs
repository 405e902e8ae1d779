//! AND / OR over binary variables.
//!
//! Every operation returns a binary indicator together with the constraints tying it to its
//! operands. Indicators are keyed by the ordered operand list, so `and2(a, b)` and
//! `generalized_and(&[a, b])` share one indicator while `generalized_and(&[b, a])` gets
//! another.

use crate::model::{Constraint, LinearExpr, Model, Var, VarKey};

/// `r = 1` iff `a = 1` and `b = 1`.
pub fn and2(model: &mut Model, a: Var, b: Var) -> (Var, Vec<Constraint>) {
    let r = model.binary_variable(VarKey::And(vec![a, b]));
    let constraints = vec![(a + b - 1).le(r), r.le(a), r.le(b)];
    (r, constraints)
}

/// `r = 1` iff `a = 1` or `b = 1`.
pub fn or2(model: &mut Model, a: Var, b: Var) -> (Var, Vec<Constraint>) {
    let r = model.binary_variable(VarKey::Or(vec![a, b]));
    let constraints = vec![(a + b).ge(r), r.ge(a), r.ge(b)];
    (r, constraints)
}

/// `r = 1` iff every variable in `vars` is 1.
pub fn generalized_and(model: &mut Model, vars: &[Var]) -> (Var, Vec<Constraint>) {
    let r = model.binary_variable(VarKey::And(vars.to_vec()));
    let n = vars.len() as i64;

    let mut constraints = vec![(LinearExpr::sum(vars) - n + 1).le(r)];
    for &v in vars {
        constraints.push(r.le(v));
    }
    (r, constraints)
}

/// `r = 1` iff some variable in `vars` is 1.
pub fn generalized_or(model: &mut Model, vars: &[Var]) -> (Var, Vec<Constraint>) {
    let r = model.binary_variable(VarKey::Or(vars.to_vec()));

    let mut constraints = vec![LinearExpr::sum(vars).ge(r)];
    for &v in vars {
        constraints.push(r.ge(v));
    }
    (r, constraints)
}
