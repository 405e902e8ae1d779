//! Conditional activation of constraint sets.
//!
//! A constraint is switched off by adding a big-M slack to its right-hand side. The slack is
//! `M * (1 - cond)` for "enforce when `cond = 1`", so `M` has to exceed the largest violation
//! any switched-off constraint can reach.

use tracing::trace;

use crate::error::{EncodeError, Result};
use crate::model::{Constraint, LinearExpr, Model, Var, VarKey};

/// Rewrites `constraints` as `lhs <= rhs + slack` (both directions for equalities).
pub fn relax(constraints: &[Constraint], slack: &LinearExpr) -> Vec<Constraint> {
    let mut ret = vec![];
    for constraint in constraints {
        for (lhs, rhs) in constraint.inequalities() {
            ret.push(lhs.le(rhs + slack));
        }
    }
    ret
}

/// Enforces `then_constraints` when `cond = 1`.
pub fn if_then(cond: Var, then_constraints: &[Constraint], big_m: i64) -> Vec<Constraint> {
    relax(then_constraints, &((1 - cond) * big_m))
}

/// Enforces `then_constraints` when `cond = 1` and `else_constraints` when `cond = 0`.
pub fn if_then_else(
    cond: Var,
    then_constraints: &[Constraint],
    else_constraints: &[Constraint],
    big_m: i64,
) -> Vec<Constraint> {
    let mut ret = if_then(cond, then_constraints, big_m);
    ret.extend(relax(else_constraints, &(cond * big_m)));
    ret
}

/// Priority chain: enforces `then_lists[i]` for the first `i` with `conds[i] = 1`, and
/// `else_constraints` when every condition is 0.
///
/// With more than one condition, a selector indicator is created per branch. Selector `i` is
/// 1 exactly when `conds[0..i]` are all 0 and `conds[i]` is 1. Writing
/// `p_i = conds[i] + sum_{j<i} (1 - conds[j])`, this holds iff `p_i = i + 1`, which is
/// expressed as `p_i <= s_i + i` and `p_i >= (i + 1) * s_i`.
pub fn if_elif_else(
    model: &mut Model,
    conds: &[Var],
    then_lists: &[Vec<Constraint>],
    else_constraints: &[Constraint],
    big_m: i64,
) -> Result<Vec<Constraint>> {
    if conds.len() != then_lists.len() {
        return Err(EncodeError::ArityMismatch {
            conditions: conds.len(),
            branches: then_lists.len(),
        });
    }

    match conds.len() {
        0 => return Ok(else_constraints.to_vec()),
        1 => {
            return Ok(if_then_else(
                conds[0],
                &then_lists[0],
                else_constraints,
                big_m,
            ))
        }
        _ => (),
    }

    let mut ret = vec![];
    let mut selectors = vec![];
    let mut prefix = LinearExpr::new();
    for (i, &cond) in conds.iter().enumerate() {
        let s = model.binary_variable(VarKey::Selector(conds.to_vec(), i));
        let p = prefix.clone() + cond;
        let k = i as i64;

        ret.push(p.clone().le(s + k));
        ret.push(p.ge(s * (k + 1)));
        ret.extend(relax(&then_lists[i], &((1 - s) * big_m)));

        selectors.push(s);
        prefix += 1 - cond;
    }
    ret.extend(relax(
        else_constraints,
        &(LinearExpr::sum(&selectors) * big_m),
    ));

    trace!(
        branches = conds.len(),
        constraints = ret.len(),
        "encoded if-elif-else"
    );
    Ok(ret)
}
