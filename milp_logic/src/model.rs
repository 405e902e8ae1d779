use std::collections::{btree_map, BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::Write;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::arithmetic::{CheckedInt, CmpOp};

/// Decision variable. The index is the column position in the model, shared by the binary
/// and the integer pool.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Var(usize);

impl Var {
    pub fn index(self) -> usize {
        self.0
    }

    /// Column name used in LP listings and solver solution files (1-based).
    pub fn column_name(self) -> String {
        format!("x_{}", self.0 + 1)
    }

    pub fn expr(self) -> LinearExpr {
        LinearExpr::singleton(self)
    }

    pub fn le<T: Into<LinearExpr>>(self, rhs: T) -> Constraint {
        self.expr().le(rhs)
    }

    pub fn ge<T: Into<LinearExpr>>(self, rhs: T) -> Constraint {
        self.expr().ge(rhs)
    }

    pub fn eq<T: Into<LinearExpr>>(self, rhs: T) -> Constraint {
        self.expr().eq(rhs)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VarKind {
    Binary,
    Integer {
        lower: Option<i64>,
        upper: Option<i64>,
    },
}

/// Lookup key of a pool entry.
///
/// Auxiliary variables are keyed by the operator and the ordered identities of its operands,
/// so that asking twice for the same derived condition yields the same variable.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum VarKey {
    Named(String),
    Less(LinearExpr, LinearExpr),
    And(Vec<Var>),
    Or(Vec<Var>),
    Selector(Vec<Var>, usize),
}

impl VarKey {
    pub fn named(name: &str) -> VarKey {
        VarKey::Named(String::from(name))
    }
}

/// Affine expression `sum(coef * var) + constant` with integer coefficients.
/// Zero coefficients are never stored, so equal expressions compare and hash equal.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct LinearExpr {
    term: BTreeMap<Var, CheckedInt>,
    constant: CheckedInt,
}

impl LinearExpr {
    pub fn new() -> LinearExpr {
        LinearExpr::default()
    }

    pub fn constant(v: i64) -> LinearExpr {
        LinearExpr {
            term: BTreeMap::new(),
            constant: CheckedInt::new(v),
        }
    }

    pub fn singleton(var: Var) -> LinearExpr {
        let mut ret = LinearExpr::new();
        ret.add_coef(var, CheckedInt::new(1));
        ret
    }

    pub fn sum(vars: &[Var]) -> LinearExpr {
        let mut ret = LinearExpr::new();
        for &v in vars {
            ret.add_coef(v, CheckedInt::new(1));
        }
        ret
    }

    pub fn is_constant(&self) -> bool {
        self.term.is_empty()
    }

    pub fn constant_term(&self) -> CheckedInt {
        self.constant
    }

    pub fn coef(&self, var: Var) -> CheckedInt {
        self.term.get(&var).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> btree_map::Iter<Var, CheckedInt> {
        self.term.iter()
    }

    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.term.keys().copied()
    }

    pub fn add_constant(&mut self, v: CheckedInt) {
        self.constant += v;
    }

    pub fn add_coef(&mut self, var: Var, coef: CheckedInt) {
        if coef == 0 {
            return;
        }
        let new_coef = match self.term.get(&var) {
            Some(&e) => e + coef,
            _ => coef,
        };
        if new_coef == 0 {
            self.term.remove(&var);
        } else {
            self.term.insert(var, new_coef);
        }
    }

    pub fn le<T: Into<LinearExpr>>(self, rhs: T) -> Constraint {
        Constraint::Inequality {
            lhs: self,
            rhs: rhs.into(),
        }
    }

    pub fn ge<T: Into<LinearExpr>>(self, rhs: T) -> Constraint {
        Constraint::Inequality {
            lhs: rhs.into(),
            rhs: self,
        }
    }

    pub fn eq<T: Into<LinearExpr>>(self, rhs: T) -> Constraint {
        Constraint::Equality {
            lhs: self,
            rhs: rhs.into(),
        }
    }

    /// Value of the expression, or `None` if some variable is unassigned.
    pub fn eval(&self, assignment: &Assignment) -> Option<CheckedInt> {
        let mut ret = self.constant;
        for (&var, &coef) in &self.term {
            ret += coef * CheckedInt::new(assignment.get(var)?);
        }
        Some(ret)
    }

    fn pretty_print<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if self.term.is_empty() {
            return write!(out, "0");
        }
        for (i, (var, coef)) in self.term.iter().enumerate() {
            let c = coef.get();
            let sign = if c < 0 { "-" } else { "+" };
            if i > 0 {
                write!(out, " {} ", sign)?;
            } else if c < 0 {
                write!(out, "-")?;
            }
            if c.abs() != 1 {
                write!(out, "{} ", c.abs())?;
            }
            write!(out, "{}", var.column_name())?;
        }
        Ok(())
    }
}

impl From<Var> for LinearExpr {
    fn from(var: Var) -> LinearExpr {
        LinearExpr::singleton(var)
    }
}

impl From<i64> for LinearExpr {
    fn from(v: i64) -> LinearExpr {
        LinearExpr::constant(v)
    }
}

impl From<i32> for LinearExpr {
    fn from(v: i32) -> LinearExpr {
        LinearExpr::constant(v as i64)
    }
}

impl From<&LinearExpr> for LinearExpr {
    fn from(e: &LinearExpr) -> LinearExpr {
        e.clone()
    }
}

impl<T: Into<LinearExpr>> AddAssign<T> for LinearExpr {
    fn add_assign(&mut self, rhs: T) {
        let rhs = rhs.into();
        for (&key, &value) in rhs.term.iter() {
            self.add_coef(key, value);
        }
        self.add_constant(rhs.constant);
    }
}

impl<T: Into<LinearExpr>> SubAssign<T> for LinearExpr {
    fn sub_assign(&mut self, rhs: T) {
        let rhs = rhs.into();
        for (&key, &value) in rhs.term.iter() {
            self.add_coef(key, -value);
        }
        self.add_constant(-rhs.constant);
    }
}

impl<T: Into<LinearExpr>> Add<T> for LinearExpr {
    type Output = LinearExpr;

    fn add(self, rhs: T) -> LinearExpr {
        let mut ret = self;
        ret += rhs;
        ret
    }
}

impl<T: Into<LinearExpr>> Sub<T> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: T) -> LinearExpr {
        let mut ret = self;
        ret -= rhs;
        ret
    }
}

impl Mul<i64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, rhs: i64) -> LinearExpr {
        let rhs = CheckedInt::new(rhs);
        if rhs == 0 {
            return LinearExpr::new();
        }
        let mut ret = self;
        ret.constant *= rhs;
        for (_, value) in ret.term.iter_mut() {
            *value *= rhs;
        }
        ret
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1
    }
}

impl<T: Into<LinearExpr>> Add<T> for Var {
    type Output = LinearExpr;

    fn add(self, rhs: T) -> LinearExpr {
        self.expr() + rhs
    }
}

impl<T: Into<LinearExpr>> Sub<T> for Var {
    type Output = LinearExpr;

    fn sub(self, rhs: T) -> LinearExpr {
        self.expr() - rhs
    }
}

impl Mul<i64> for Var {
    type Output = LinearExpr;

    fn mul(self, rhs: i64) -> LinearExpr {
        self.expr() * rhs
    }
}

impl Sub<Var> for i64 {
    type Output = LinearExpr;

    fn sub(self, rhs: Var) -> LinearExpr {
        LinearExpr::constant(self) - rhs
    }
}

impl Sub<LinearExpr> for i64 {
    type Output = LinearExpr;

    fn sub(self, rhs: LinearExpr) -> LinearExpr {
        LinearExpr::constant(self) - rhs
    }
}

/// Linear constraint. `Inequality` stands for `lhs <= rhs`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Constraint {
    Inequality { lhs: LinearExpr, rhs: LinearExpr },
    Equality { lhs: LinearExpr, rhs: LinearExpr },
}

impl Constraint {
    pub fn new(lhs: LinearExpr, op: CmpOp, rhs: LinearExpr) -> Constraint {
        match op {
            CmpOp::Le => lhs.le(rhs),
            CmpOp::Ge => lhs.ge(rhs),
            CmpOp::Eq => lhs.eq(rhs),
        }
    }

    pub fn is_less_or_equal(&self) -> bool {
        matches!(self, Constraint::Inequality { .. })
    }

    /// Decomposes the constraint into `lhs <= rhs` pairs: one for an inequality,
    /// both directions for an equality.
    pub fn inequalities(&self) -> Vec<(LinearExpr, LinearExpr)> {
        match self {
            Constraint::Inequality { lhs, rhs } => vec![(lhs.clone(), rhs.clone())],
            Constraint::Equality { lhs, rhs } => {
                vec![(lhs.clone(), rhs.clone()), (rhs.clone(), lhs.clone())]
            }
        }
    }

    /// `lhs - rhs` together with the relation it has to satisfy against 0.
    pub fn normalized(&self) -> (LinearExpr, CmpOp) {
        match self {
            Constraint::Inequality { lhs, rhs } => (lhs.clone() - rhs, CmpOp::Le),
            Constraint::Equality { lhs, rhs } => (lhs.clone() - rhs, CmpOp::Eq),
        }
    }

    pub fn vars(&self) -> BTreeSet<Var> {
        let (lhs, rhs) = match self {
            Constraint::Inequality { lhs, rhs } | Constraint::Equality { lhs, rhs } => (lhs, rhs),
        };
        lhs.vars().chain(rhs.vars()).collect()
    }

    /// Whether `assignment` satisfies the constraint, or `None` if some variable is unassigned.
    pub fn is_satisfied(&self, assignment: &Assignment) -> Option<bool> {
        let (sum, op) = self.normalized();
        Some(op.compare(sum.eval(assignment)?, CheckedInt::new(0)))
    }

    pub fn pretty_print<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let (sum, op) = self.normalized();
        let mut lhs = sum;
        let constant = lhs.constant;
        lhs.constant = CheckedInt::new(0);
        lhs.pretty_print(out)?;
        write!(out, " {} {}", op, -constant)
    }
}

/// Variable pools plus the append-only constraint sink.
pub struct Model {
    kinds: Vec<VarKind>,
    keys: Vec<VarKey>,
    binary: HashMap<VarKey, Var>,
    integer: HashMap<VarKey, Var>,
    constraints: Vec<Constraint>,
}

impl Model {
    pub fn new() -> Model {
        Model {
            kinds: vec![],
            keys: vec![],
            binary: HashMap::new(),
            integer: HashMap::new(),
            constraints: vec![],
        }
    }

    fn new_var(&mut self, key: VarKey, kind: VarKind) -> Var {
        let var = Var(self.kinds.len());
        self.kinds.push(kind);
        self.keys.push(key);
        var
    }

    /// Returns the binary variable registered under `key`, creating it on first request.
    pub fn binary_variable(&mut self, key: VarKey) -> Var {
        if let Some(&var) = self.binary.get(&key) {
            return var;
        }
        let var = self.new_var(key.clone(), VarKind::Binary);
        self.binary.insert(key, var);
        var
    }

    /// Returns the integer variable registered under `key`, creating it (unbounded) on
    /// first request.
    pub fn integer_variable(&mut self, key: VarKey) -> Var {
        if let Some(&var) = self.integer.get(&key) {
            return var;
        }
        let var = self.new_var(
            key.clone(),
            VarKind::Integer {
                lower: None,
                upper: None,
            },
        );
        self.integer.insert(key, var);
        var
    }

    pub fn named_binary(&mut self, name: &str) -> Var {
        self.binary_variable(VarKey::named(name))
    }

    /// Returns the integer variable `name`. The bounds apply only when the variable is
    /// created by this call; an existing variable keeps its bounds.
    pub fn named_integer(&mut self, name: &str, lower: i64, upper: i64) -> Var {
        let key = VarKey::named(name);
        if let Some(&var) = self.integer.get(&key) {
            return var;
        }
        let var = self.integer_variable(key);
        self.set_bounds(var, Some(lower), Some(upper));
        var
    }

    /// Sets the bounds of an integer variable. Binary variables are left untouched.
    pub fn set_bounds(&mut self, var: Var, lower: Option<i64>, upper: Option<i64>) {
        if let VarKind::Integer { .. } = self.kinds[var.0] {
            self.kinds[var.0] = VarKind::Integer { lower, upper };
        }
    }

    pub fn num_vars(&self) -> usize {
        self.kinds.len()
    }

    pub fn kind(&self, var: Var) -> VarKind {
        self.kinds[var.0]
    }

    pub fn key(&self, var: Var) -> &VarKey {
        &self.keys[var.0]
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn add_constraints<I: IntoIterator<Item = Constraint>>(&mut self, constraints: I) {
        self.constraints.extend(constraints);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Readable name of a variable. Auxiliary variables are named after their operands.
    pub fn var_name(&self, var: Var) -> String {
        match self.key(var) {
            VarKey::Named(name) => name.clone(),
            VarKey::Less(a, b) => format!(
                "{}_less_{}_dummy",
                self.expr_name(a),
                self.expr_name(b)
            ),
            VarKey::And(ops) => self.join_names(ops, "_and_") + "_dummy",
            VarKey::Or(ops) => self.join_names(ops, "_or_") + "_dummy",
            VarKey::Selector(conds, i) => format!("{}_dummy_{}", self.join_names(conds, "_and_"), i),
        }
    }

    fn join_names(&self, vars: &[Var], sep: &str) -> String {
        vars.iter()
            .map(|&v| self.var_name(v))
            .collect::<Vec<_>>()
            .join(sep)
    }

    fn expr_name(&self, expr: &LinearExpr) -> String {
        let mut ret = String::new();
        for (var, coef) in expr.iter() {
            if !ret.is_empty() {
                ret.push('+');
            }
            if *coef != 1 {
                ret.push_str(&format!("{}*", coef));
            }
            ret.push_str(&self.var_name(*var));
        }
        let c = expr.constant_term();
        if ret.is_empty() {
            ret = c.to_string();
        } else if c != 0 {
            ret.push_str(&format!("{:+}", c.get()));
        }
        ret
    }

    /// Logical names of all binary variables, in column order. Names are distinct within
    /// the pool; see `pool_entries`.
    pub fn binary_variables(&self) -> Vec<(String, Var)> {
        self.pool_entries(true)
    }

    /// Logical names of all integer variables, in column order. Names are distinct within
    /// the pool.
    pub fn integer_variables(&self) -> Vec<(String, Var)> {
        self.pool_entries(false)
    }

    fn pool_entries(&self, binary: bool) -> Vec<(String, Var)> {
        let mut vars = if binary {
            self.binary.values().copied().collect::<Vec<_>>()
        } else {
            self.integer.values().copied().collect::<Vec<_>>()
        };
        vars.sort();

        // A user name may coincide with the rendered name of an auxiliary variable.
        // Named variables keep their names; the auxiliary one gets its column appended.
        let mut used = vars
            .iter()
            .filter_map(|&v| match self.key(v) {
                VarKey::Named(name) => Some(name.clone()),
                _ => None,
            })
            .collect::<HashSet<_>>();
        vars.into_iter()
            .map(|v| {
                if let VarKey::Named(name) = self.key(v) {
                    return (name.clone(), v);
                }
                let mut name = self.var_name(v);
                while !used.insert(name.clone()) {
                    name = format!("{}_{}", name, v.column_name());
                }
                (name, v)
            })
            .collect()
    }

    /// Writes the model as an LP listing.
    pub fn pretty_print<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "Subject To")?;
        for (i, constraint) in self.constraints.iter().enumerate() {
            write!(out, " c{}: ", i + 1)?;
            constraint.pretty_print(out)?;
            writeln!(out)?;
        }

        let mut bounds = vec![];
        let mut binaries = vec![];
        let mut generals = vec![];
        for (i, kind) in self.kinds.iter().enumerate() {
            let var = Var(i);
            match *kind {
                VarKind::Binary => binaries.push(var),
                VarKind::Integer { lower, upper } => {
                    generals.push(var);
                    bounds.push((var, lower, upper));
                }
            }
        }

        writeln!(out, "Bounds")?;
        for (var, lower, upper) in bounds {
            match (lower, upper) {
                (Some(l), Some(u)) => writeln!(out, " {} <= {} <= {}", l, var.column_name(), u)?,
                (Some(l), None) => writeln!(out, " {} >= {}", var.column_name(), l)?,
                (None, Some(u)) => writeln!(out, " -inf <= {} <= {}", var.column_name(), u)?,
                (None, None) => writeln!(out, " {} free", var.column_name())?,
            }
        }
        if !binaries.is_empty() {
            writeln!(out, "Binary")?;
            for var in binaries {
                writeln!(out, " {}", var.column_name())?;
            }
        }
        if !generals.is_empty() {
            writeln!(out, "General")?;
            for var in generals {
                writeln!(out, " {}", var.column_name())?;
            }
        }
        writeln!(out, "End")?;
        Ok(())
    }
}

/// Values of (some of) the variables of a model.
#[derive(Clone, Debug, Default)]
pub struct Assignment {
    values: BTreeMap<Var, i64>,
}

impl Assignment {
    pub fn new() -> Assignment {
        Assignment::default()
    }

    pub fn set(&mut self, var: Var, value: i64) {
        self.values.insert(var, value);
    }

    pub fn set_bool(&mut self, var: Var, value: bool) {
        self.set(var, if value { 1 } else { 0 });
    }

    pub fn get(&self, var: Var) -> Option<i64> {
        self.values.get(&var).copied()
    }

    /// Whether every constraint is satisfied. Constraints over unassigned variables count
    /// as violated.
    pub fn satisfies(&self, constraints: &[Constraint]) -> bool {
        constraints
            .iter()
            .all(|c| c.is_satisfied(self) == Some(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_create_or_get() {
        let mut model = Model::new();
        let a = model.named_binary("a");
        let b = model.named_binary("b");
        assert_ne!(a, b);
        assert_eq!(model.named_binary("a"), a);
        assert_eq!(model.num_vars(), 2);

        // the integer pool is separate
        let x = model.integer_variable(VarKey::named("a"));
        assert_ne!(x, a);
        assert_eq!(model.integer_variable(VarKey::named("a")), x);
        assert_eq!(
            model.kind(x),
            VarKind::Integer {
                lower: None,
                upper: None
            }
        );
    }

    #[test]
    fn test_structural_keys() {
        let mut model = Model::new();
        let a = model.named_binary("a");
        let b = model.named_binary("b");
        let k1 = model.binary_variable(VarKey::And(vec![a, b]));
        let k2 = model.binary_variable(VarKey::And(vec![a, b]));
        let k3 = model.binary_variable(VarKey::And(vec![b, a]));
        let k4 = model.binary_variable(VarKey::Or(vec![a, b]));
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
        assert_ne!(k1, k4);
        assert_eq!(model.var_name(k1), "a_and_b_dummy");
        assert_eq!(model.var_name(k4), "a_or_b_dummy");
    }

    #[test]
    fn test_pool_names_distinct() {
        let mut model = Model::new();
        let a = model.named_binary("a");
        let b = model.named_binary("b");
        let and_ab = model.binary_variable(VarKey::And(vec![a, b]));
        let user = model.named_binary("a_and_b_dummy");
        assert_ne!(and_ab, user);
        assert_eq!(model.var_name(and_ab), model.var_name(user));

        assert_eq!(
            model.binary_variables(),
            vec![
                (String::from("a"), a),
                (String::from("b"), b),
                (String::from("a_and_b_dummy_x_3"), and_ab),
                (String::from("a_and_b_dummy"), user),
            ]
        );
    }

    #[test]
    fn test_named_integer_keeps_bounds() {
        let mut model = Model::new();
        let x = model.named_integer("x", 0, 3);
        assert_eq!(model.named_integer("x", -5, 5), x);
        assert_eq!(
            model.kind(x),
            VarKind::Integer {
                lower: Some(0),
                upper: Some(3)
            }
        );
    }

    #[test]
    fn test_linear_expr_normalization() {
        let mut model = Model::new();
        let x = model.named_integer("x", 0, 10);
        let y = model.named_integer("y", 0, 10);

        let e1 = x + y - x;
        let e2 = LinearExpr::singleton(y);
        assert_eq!(e1, e2);
        assert!(e1.coef(x) == 0);

        let e3 = (x + 3) * 2 - y;
        assert!(e3.coef(x) == 2);
        assert!(e3.coef(y) == -1);
        assert!(e3.constant_term() == 6);
        assert!((x * 0).is_constant());
    }

    #[test]
    fn test_eval_and_satisfaction() {
        let mut model = Model::new();
        let x = model.named_integer("x", 0, 10);
        let y = model.named_integer("y", 0, 10);

        let mut assignment = Assignment::new();
        assignment.set(x, 3);
        assert_eq!((x * 2 + 1).eval(&assignment), Some(CheckedInt::new(7)));
        assert_eq!((x + y).eval(&assignment), None);

        assignment.set(y, 5);
        assert_eq!(x.le(y).is_satisfied(&assignment), Some(true));
        assert_eq!(x.ge(y).is_satisfied(&assignment), Some(false));
        assert_eq!((x + 2).eq(y).is_satisfied(&assignment), Some(true));
        assert!(assignment.satisfies(&[x.le(y), (x + 2).eq(y)]));
    }

    #[test]
    fn test_inequalities_decomposition() {
        let mut model = Model::new();
        let x = model.named_integer("x", 0, 10);
        let y = model.named_integer("y", 0, 10);

        let le = x.le(y);
        assert!(le.is_less_or_equal());
        assert_eq!(le.inequalities(), vec![(x.expr(), y.expr())]);

        let ge = x.ge(y + 1);
        assert_eq!(ge.inequalities(), vec![(y + 1, x.expr())]);

        let eq = x.eq(y);
        assert!(!eq.is_less_or_equal());
        assert_eq!(
            eq.inequalities(),
            vec![(x.expr(), y.expr()), (y.expr(), x.expr())]
        );
    }

    #[test]
    fn test_pretty_print() {
        let mut model = Model::new();
        let a = model.named_binary("a");
        let x = model.named_integer("x", 0, 7);
        model.add_constraint((x * 2 - a + 3).le(5));
        model.add_constraint(x.eq(a));

        let mut buf = Vec::<u8>::new();
        model.pretty_print(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Subject To\n c1: -x_1 + 2 x_2 <= 2\n c2: -x_1 + x_2 = 0\nBounds\n 0 <= x_2 <= 7\nBinary\n x_1\nGeneral\n x_2\nEnd\n"
        );
    }
}
