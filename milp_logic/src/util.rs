/// Returns a `width`-bit integer where every bit is set, or `None` if `width` does not fit
/// in 32 bits. `bitmask(0)` is `Some(0)`.
///
/// Not used by the encoders; it is the checked form of the word mask helper of the
/// solver tooling and is exported for callers building word-level models.
pub fn bitmask(width: u32) -> Option<u32> {
    match width {
        0 => Some(0),
        1..=31 => Some((1u32 << width) - 1),
        32 => Some(u32::MAX),
        _ => None,
    }
}

/// Returns the `width`-bit binary form of `x` in little-endian bit order.
/// Bits of `x` above `width` are dropped.
pub fn to_binary(x: u64, width: usize) -> Vec<bool> {
    (0..width)
        .map(|i| i < u64::BITS as usize && (x >> i) & 1 == 1)
        .collect()
}

/// Inverse of `to_binary`.
pub fn from_binary(bits: &[bool]) -> u64 {
    let mut ret = 0u64;
    for (i, &b) in bits.iter().enumerate() {
        if b {
            ret |= 1u64 << i;
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmask() {
        assert_eq!(bitmask(0), Some(0));
        assert_eq!(bitmask(4), Some(0b1111));
        assert_eq!(bitmask(8), Some(0xff));
        assert_eq!(bitmask(32), Some(0xffffffff));
        assert_eq!(bitmask(33), None);
    }

    #[test]
    fn test_to_binary() {
        assert_eq!(
            to_binary(0x67452301, 32),
            vec![
                true, false, false, false, false, false, false, false, true, true, false, false,
                false, true, false, false, true, false, true, false, false, false, true, false,
                true, true, true, false, false, true, true, false
            ]
        );
        assert_eq!(to_binary(6, 2), vec![false, true]);
        assert_eq!(to_binary(1, 0), Vec::<bool>::new());
    }

    #[test]
    fn test_from_binary() {
        assert_eq!(from_binary(&to_binary(0x5a, 8)), 0x5a);
        assert_eq!(from_binary(&[]), 0);
    }
}
