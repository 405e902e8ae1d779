//! Inequality covers of truth tables.
//!
//! A cover is a list of ternary patterns over an ordered vector of binary variables. Each
//! pattern stands for the inequality `sum(contributions) >= 1`, where position `i`
//! contributes `1 - v_i` for `'1'`, `v_i` for `'0'` and nothing for `'-'`. A pattern without
//! don't-cares therefore cuts off exactly the single point it spells out.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::{EncodeError, Result};
use crate::model::{Constraint, LinearExpr, Var};

/// Largest XOR arity for which a cover is provided. The parity cover of arity `n` has
/// `2^n` patterns.
pub const MAX_XOR_ARITY: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Ternary {
    Zero,
    One,
    DontCare,
}

impl Ternary {
    pub fn from_char(c: char) -> Ternary {
        match c {
            '0' => Ternary::Zero,
            '1' => Ternary::One,
            _ => Ternary::DontCare,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Ternary::Zero => '0',
            Ternary::One => '1',
            Ternary::DontCare => '-',
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Pattern(Vec<Ternary>);

impl Pattern {
    pub fn new(cells: Vec<Ternary>) -> Pattern {
        Pattern(cells)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cells(&self) -> &[Ternary] {
        &self.0
    }

    /// Whether the point `bits` satisfies the inequality of this pattern.
    pub fn admits(&self, bits: &[bool]) -> bool {
        self.0.iter().zip(bits).any(|(&t, &b)| match t {
            Ternary::One => !b,
            Ternary::Zero => b,
            Ternary::DontCare => false,
        })
    }

    pub fn to_constraint(&self, vars: &[Var]) -> Constraint {
        pattern_constraint(self.0.iter().copied(), vars)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Pattern {
        Pattern(s.chars().map(Ternary::from_char).collect())
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for t in &self.0 {
            write!(f, "{}", t.as_char())?;
        }
        Ok(())
    }
}

/// Builds `sum(contributions) >= 1` for one pattern over `vars`, position by position.
pub fn pattern_constraint<I: IntoIterator<Item = Ternary>>(pattern: I, vars: &[Var]) -> Constraint {
    let mut sum = LinearExpr::new();
    for (t, &var) in pattern.into_iter().zip(vars) {
        match t {
            Ternary::One => sum += 1 - var,
            Ternary::Zero => sum += var,
            Ternary::DontCare => (),
        }
    }
    sum.ge(1)
}

/// Source of XOR covers. The cover for arity `n` is over `n` inputs followed by the output
/// and must be satisfied exactly when the output is the XOR of the inputs.
pub trait CoverGenerator: Send + Sync {
    fn generate(&self, arity: usize) -> Vec<Pattern>;
}

/// Cuts off every odd-weight point of `inputs ++ output` with one full-width pattern.
/// The parity function has no larger implicants, so this cover is irredundant.
pub struct ParityCoverGenerator;

impl CoverGenerator for ParityCoverGenerator {
    fn generate(&self, arity: usize) -> Vec<Pattern> {
        let width = arity + 1;
        let mut ret = vec![];
        for point in 0u64..(1u64 << width) {
            if point.count_ones() % 2 == 0 {
                continue;
            }
            let cells = (0..width)
                .map(|i| {
                    if (point >> (width - 1 - i)) & 1 == 1 {
                        Ternary::One
                    } else {
                        Ternary::Zero
                    }
                })
                .collect();
            ret.push(Pattern(cells));
        }
        ret
    }
}

/// Memo table arity -> cover. Each arity is computed at most once, even under concurrent
/// requests; reads of a computed entry take no lock.
pub struct CoverCache {
    generator: Box<dyn CoverGenerator>,
    slots: Vec<OnceLock<Arc<Vec<Pattern>>>>,
}

static GLOBAL_COVER_CACHE: OnceLock<CoverCache> = OnceLock::new();

impl CoverCache {
    pub fn new(generator: Box<dyn CoverGenerator>) -> CoverCache {
        CoverCache {
            generator,
            slots: (0..=MAX_XOR_ARITY).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Process-wide cache backed by `ParityCoverGenerator`.
    pub fn global() -> &'static CoverCache {
        GLOBAL_COVER_CACHE.get_or_init(|| CoverCache::new(Box::new(ParityCoverGenerator)))
    }

    pub fn get_or_compute(&self, arity: usize) -> Result<Arc<Vec<Pattern>>> {
        let slot = self
            .slots
            .get(arity)
            .ok_or(EncodeError::UnsupportedArity {
                arity,
                max: MAX_XOR_ARITY,
            })?;
        let cover = slot.get_or_init(|| {
            let cover = self.generator.generate(arity);
            debug!(arity, inequalities = cover.len(), "computed xor cover");
            Arc::new(cover)
        });
        Ok(Arc::clone(cover))
    }

    /// The cover for `arity` if it has been computed already.
    pub fn get(&self, arity: usize) -> Option<Arc<Vec<Pattern>>> {
        self.slots.get(arity)?.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator {
        calls: Arc<AtomicUsize>,
    }

    impl CoverGenerator for CountingGenerator {
        fn generate(&self, arity: usize) -> Vec<Pattern> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ParityCoverGenerator.generate(arity)
        }
    }

    fn parity(bits: &[bool]) -> bool {
        bits.iter().filter(|&&b| b).count() % 2 == 1
    }

    #[test]
    fn test_pattern_admits() {
        let pattern = Pattern::from("1-0");
        assert_eq!(pattern.to_string(), "1-0");
        assert!(pattern.admits(&[false, false, false]));
        assert!(pattern.admits(&[true, true, true]));
        assert!(!pattern.admits(&[true, false, false]));
        assert!(!pattern.admits(&[true, true, false]));
    }

    #[test]
    fn test_parity_cover_xor2() {
        let cover = ParityCoverGenerator.generate(2);
        let cover = cover.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        assert_eq!(cover, vec!["001", "010", "100", "111"]);
    }

    #[test]
    fn test_parity_cover_exact() {
        for arity in 0..=5 {
            let cover = ParityCoverGenerator.generate(arity);
            assert_eq!(cover.len(), 1 << arity);
            for point in 0u32..(1 << (arity + 1)) {
                let bits = (0..=arity)
                    .map(|i| (point >> i) & 1 == 1)
                    .collect::<Vec<_>>();
                let admitted = cover.iter().all(|p| p.admits(&bits));
                // output (last bit) must equal the xor of the inputs
                assert_eq!(admitted, !parity(&bits), "arity {} point {:?}", arity, bits);
            }
        }
    }

    #[test]
    fn test_cache_idempotence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = CoverCache::new(Box::new(CountingGenerator {
            calls: Arc::clone(&calls),
        }));

        assert!(cache.get(3).is_none());
        let first = cache.get_or_compute(3).unwrap();
        let second = cache.get_or_compute(3).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.get_or_compute(4).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.get(3).is_some());
    }

    #[test]
    fn test_cache_concurrent_first_use() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = CoverCache::new(Box::new(CountingGenerator {
            calls: Arc::clone(&calls),
        }));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let cover = cache.get_or_compute(6).unwrap();
                    assert_eq!(cover.len(), 64);
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_unsupported_arity() {
        let cache = CoverCache::new(Box::new(ParityCoverGenerator));
        assert_eq!(
            cache.get_or_compute(MAX_XOR_ARITY + 1),
            Err(EncodeError::UnsupportedArity {
                arity: MAX_XOR_ARITY + 1,
                max: MAX_XOR_ARITY
            })
        );
    }

    #[test]
    fn test_global_cache() {
        let a = CoverCache::global().get_or_compute(2).unwrap();
        let b = CoverCache::global().get_or_compute(2).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
