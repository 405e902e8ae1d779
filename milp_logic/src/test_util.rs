use crate::model::{Assignment, Constraint, Var};

/// Given [v1, v2, ..., vn], return v1 * v2 * ... * vn, where * represents the Cartesian product.
pub fn product_multi<T: Clone>(inputs: &Vec<Vec<T>>) -> Vec<Vec<T>> {
    let mut ret = vec![];

    fn visit<T: Clone>(inputs: &Vec<Vec<T>>, i: usize, buf: &mut Vec<T>, ret: &mut Vec<Vec<T>>) {
        if i == inputs.len() {
            ret.push(buf.clone());
            return;
        }
        for x in &inputs[i] {
            buf.push(x.clone());
            visit(inputs, i + 1, buf, ret);
            buf.pop();
        }
    }

    visit(inputs, 0, &mut vec![], &mut ret);
    ret
}

/// All 0/1 vectors of length `n`.
pub fn bool_vectors(n: usize) -> Vec<Vec<bool>> {
    product_multi(&vec![vec![false, true]; n])
}

/// Enumerates every assignment of `domains` (extending `fixed`) and returns those which
/// satisfy all of `constraints`.
pub fn satisfying_assignments(
    constraints: &[Constraint],
    fixed: &Assignment,
    domains: &[(Var, Vec<i64>)],
) -> Vec<Assignment> {
    let values = domains.iter().map(|(_, d)| d.clone()).collect::<Vec<_>>();
    let mut ret = vec![];
    for tuple in product_multi(&values) {
        let mut assignment = fixed.clone();
        for ((var, _), value) in domains.iter().zip(tuple) {
            assignment.set(*var, value);
        }
        if assignment.satisfies(constraints) {
            ret.push(assignment);
        }
    }
    ret
}

/// Whether some assignment of the binary variables `free` extends `fixed` to a solution.
pub fn is_feasible(constraints: &[Constraint], fixed: &Assignment, free: &[Var]) -> bool {
    let domains = free
        .iter()
        .map(|&v| (v, vec![0, 1]))
        .collect::<Vec<_>>();
    !satisfying_assignments(constraints, fixed, &domains).is_empty()
}

pub fn assign_bools(vars: &[Var], values: &[bool]) -> Assignment {
    let mut ret = Assignment::new();
    for (&var, &value) in vars.iter().zip(values) {
        ret.set_bool(var, value);
    }
    ret
}

#[test]
fn test_product_multi() {
    assert_eq!(
        product_multi(&vec![vec![1, 2], vec![3, 4, 5], vec![6]]),
        vec![
            vec![1, 3, 6],
            vec![1, 4, 6],
            vec![1, 5, 6],
            vec![2, 3, 6],
            vec![2, 4, 6],
            vec![2, 5, 6],
        ]
    );
    assert_eq!(product_multi::<i32>(&vec![]), vec![Vec::<i32>::new()]);
    assert_eq!(bool_vectors(3).len(), 8);
}
