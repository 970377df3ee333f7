//! 256-bit first-byte index over a node's static children.
//!
//! A clear bit proves no static child starts with that byte, so the search
//! can skip the linear scan. A set bit only says "maybe"; the scan still
//! confirms the exact literal.

/// Static child count above which a node carries an index.
/// At or below it a linear scan is cheaper than maintaining the bitmap.
pub const STATIC_INDEX_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticChildIndex {
    bits: [u64; 4],
}

impl StaticChildIndex {
    pub const fn new() -> Self {
        Self { bits: [0; 4] }
    }

    #[inline(always)]
    pub fn insert(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] |= 1u64 << (byte & 63);
    }

    #[inline(always)]
    pub fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 6) as usize] & (1u64 << (byte & 63)) != 0
    }

    /// Whether a segment could match any indexed child.
    /// Empty segments never match a static child.
    #[inline]
    pub fn may_contain(&self, segment: &str) -> bool {
        segment
            .as_bytes()
            .first()
            .map_or(false, |&b| self.contains(b))
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Number of distinct first bytes recorded
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl FromIterator<u8> for StaticChildIndex {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut index = Self::new();
        for byte in iter {
            index.insert(byte);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains_across_words() {
        let index: StaticChildIndex = [b'a', b'Z', 0u8, 63, 64, 127, 128, 255].into_iter().collect();
        for b in [b'a', b'Z', 0u8, 63, 64, 127, 128, 255] {
            assert!(index.contains(b), "byte {b}");
        }
        assert!(!index.contains(b'b'));
        assert!(!index.contains(1));
        assert_eq!(index.len(), 8);
    }

    #[test]
    fn test_may_contain_uses_first_byte() {
        let index: StaticChildIndex = "users".bytes().take(1).collect();
        assert!(index.may_contain("users"));
        assert!(index.may_contain("u"));
        assert!(!index.may_contain("posts"));
        assert!(!index.may_contain(""));
    }

    #[test]
    fn test_utf8_first_byte() {
        let mut index = StaticChildIndex::new();
        index.insert("éclair".as_bytes()[0]);
        assert!(index.may_contain("été"));
        assert!(!index.may_contain("eclair"));
    }

    #[test]
    fn test_empty() {
        let index = StaticChildIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }
}
