//! Integer comparisons as binary indicators, using big-M constraints.
//!
//! `big_m` must exceed `|a - b|` over every value the operands can take. A smaller `big_m` is
//! not detected and lets the indicator disagree with the comparison.

use crate::logic::{and2, or2};
use crate::model::{Constraint, LinearExpr, Model, Var, VarKey};

/// `r = 1` iff `a < b`.
pub fn less<A, B>(model: &mut Model, a: A, b: B, big_m: i64) -> (Var, Vec<Constraint>)
where
    A: Into<LinearExpr>,
    B: Into<LinearExpr>,
{
    let a = a.into();
    let b = b.into();
    let r = model.binary_variable(VarKey::Less(a.clone(), b.clone()));
    let constraints = vec![
        a.clone().le(b.clone() - 1 + (1 - r) * big_m),
        a.ge(b - r * big_m),
    ];
    (r, constraints)
}

/// `r = 1` iff `a <= b`.
pub fn leq<A, B>(model: &mut Model, a: A, b: B, big_m: i64) -> (Var, Vec<Constraint>)
where
    A: Into<LinearExpr>,
    B: Into<LinearExpr>,
{
    less(model, a, b.into() + 1, big_m)
}

/// `r = 1` iff `a > b`.
pub fn greater<A, B>(model: &mut Model, a: A, b: B, big_m: i64) -> (Var, Vec<Constraint>)
where
    A: Into<LinearExpr>,
    B: Into<LinearExpr>,
{
    less(model, b, a, big_m)
}

/// `r = 1` iff `a >= b`.
pub fn geq<A, B>(model: &mut Model, a: A, b: B, big_m: i64) -> (Var, Vec<Constraint>)
where
    A: Into<LinearExpr>,
    B: Into<LinearExpr>,
{
    less(model, b, a.into() + 1, big_m)
}

/// `r = 1` iff `a == b`.
pub fn eq<A, B>(model: &mut Model, a: A, b: B, big_m: i64) -> (Var, Vec<Constraint>)
where
    A: Into<LinearExpr>,
    B: Into<LinearExpr>,
{
    let a = a.into();
    let b = b.into();
    let (d_leq, mut constraints) = leq(model, a.clone(), b.clone(), big_m);
    let (d_geq, c_geq) = geq(model, a, b, big_m);
    constraints.extend(c_geq);

    let (r, c_and) = and2(model, d_leq, d_geq);
    constraints.extend(c_and);
    (r, constraints)
}

/// `r = 1` iff `a != b`.
pub fn neq<A, B>(model: &mut Model, a: A, b: B, big_m: i64) -> (Var, Vec<Constraint>)
where
    A: Into<LinearExpr>,
    B: Into<LinearExpr>,
{
    let a = a.into();
    let b = b.into();
    let (d_less, mut constraints) = less(model, a.clone(), b.clone(), big_m);
    let (d_greater, c_greater) = greater(model, a, b, big_m);
    constraints.extend(c_greater);

    let (r, c_or) = or2(model, d_less, d_greater);
    constraints.extend(c_or);
    (r, constraints)
}
