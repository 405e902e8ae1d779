//! XOR over binary variables.

use crate::cover::CoverCache;
use crate::error::Result;
use crate::model::{Constraint, Var};

/// `c = a xor b`, as the four odd-weight cuts over `(a, b, c)`.
pub fn xor3(a: Var, b: Var, c: Var) -> Vec<Constraint> {
    vec![
        (a + b).ge(c),
        (a + c).ge(b),
        (b + c).ge(a),
        (a + b + c).le(2),
    ]
}

/// `output = inputs[0] xor ... xor inputs[n-1]`, from the process-wide cover cache.
pub fn generalized_xor(inputs: &[Var], output: Var) -> Result<Vec<Constraint>> {
    generalized_xor_with_cache(CoverCache::global(), inputs, output)
}

/// Like `generalized_xor`, with covers taken from `cache`.
pub fn generalized_xor_with_cache(
    cache: &CoverCache,
    inputs: &[Var],
    output: Var,
) -> Result<Vec<Constraint>> {
    let cover = cache.get_or_compute(inputs.len())?;

    let mut vars = inputs.to_vec();
    vars.push(output);
    Ok(cover.iter().map(|p| p.to_constraint(&vars)).collect())
}
