use std::cmp::{PartialEq, PartialOrd};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Integer type for coefficients and constants of linear expressions.
/// Every operation panics on overflow instead of wrapping silently.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct CheckedInt(i64);

impl CheckedInt {
    pub fn new(value: i64) -> CheckedInt {
        CheckedInt(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> CheckedInt {
        CheckedInt(self.0.checked_abs().unwrap())
    }
}

impl fmt::Display for CheckedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for CheckedInt {
    type Output = CheckedInt;

    fn add(self, rhs: Self) -> Self::Output {
        CheckedInt(self.0.checked_add(rhs.0).unwrap())
    }
}

impl AddAssign for CheckedInt {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.checked_add(rhs.0).unwrap();
    }
}

impl Sub for CheckedInt {
    type Output = CheckedInt;

    fn sub(self, rhs: Self) -> Self::Output {
        CheckedInt(self.0.checked_sub(rhs.0).unwrap())
    }
}

impl SubAssign for CheckedInt {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.checked_sub(rhs.0).unwrap();
    }
}

impl Mul for CheckedInt {
    type Output = CheckedInt;

    fn mul(self, rhs: Self) -> Self::Output {
        CheckedInt(self.0.checked_mul(rhs.0).unwrap())
    }
}

impl MulAssign for CheckedInt {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 = self.0.checked_mul(rhs.0).unwrap();
    }
}

impl Neg for CheckedInt {
    type Output = CheckedInt;

    fn neg(self) -> Self::Output {
        CheckedInt(self.0.checked_neg().unwrap())
    }
}

impl PartialEq<i64> for CheckedInt {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<CheckedInt> for i64 {
    fn eq(&self, other: &CheckedInt) -> bool {
        *self == other.0
    }
}

impl PartialOrd<i64> for CheckedInt {
    fn partial_cmp(&self, other: &i64) -> Option<std::cmp::Ordering> {
        Some(self.0.cmp(other))
    }
}

impl PartialOrd<CheckedInt> for i64 {
    fn partial_cmp(&self, other: &CheckedInt) -> Option<std::cmp::Ordering> {
        Some(self.cmp(&other.0))
    }
}

/// Relation of a linear constraint. Strict relations and `!=` are not linear
/// and have to go through the relational encoder instead.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Le,
    Ge,
}

impl CmpOp {
    pub fn compare(self, lhs: CheckedInt, rhs: CheckedInt) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}
