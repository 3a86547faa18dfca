//! The 16-byte index at the front of every trait store.
//!
//! Each key owns one bit position in two parallel words. The pair of bits
//! at that position is the key's 2-bit length code: the high bit lives in
//! `high`, the low bit in `low`. Because values are packed in ascending key
//! order, the offset of any key is the decoded length of every code below
//! it, which is three population counts over the masked words.

/// Size in bytes of the fixed header.
pub const HEADER_SIZE: usize = 16;

/// Number of distinct keys a store can index.
pub const MAX_KEYS: u64 = 64;

/// Bit-packed presence and length index.
///
/// Stored in host byte order: `high` at bytes `[0, 8)`, `low` at `[8, 16)`.
/// Methods taking a key expect it below [`MAX_KEYS`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Header {
    pub high: u64,
    pub low: u64,
}

static_assertions::assert_eq_size!(Header, [u8; HEADER_SIZE]);

/// Supported value sizes and their 2-bit codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LenCode {
    Two = 0b01,
    Four = 0b10,
    Eight = 0b11,
}

impl LenCode {
    /// Maps a value length to its code. `None` for anything but 2, 4 or 8.
    #[inline(always)]
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            _ => None,
        }
    }

    /// Rebuilds a code from its split bits. `None` means absent.
    #[inline(always)]
    pub fn from_bits(high: bool, low: bool) -> Option<Self> {
        match (high, low) {
            (false, false) => None,
            (false, true) => Some(Self::Two),
            (true, false) => Some(Self::Four),
            (true, true) => Some(Self::Eight),
        }
    }

    /// Decoded value length: `1 << code`.
    #[inline(always)]
    pub fn value_len(self) -> usize {
        1 << (self as u8)
    }

    /// The (high, low) bit pair written into the header.
    #[inline(always)]
    pub fn bits(self) -> (bool, bool) {
        let code = self as u8;
        (code & 0b10 != 0, code & 0b01 != 0)
    }
}

/// Mask selecting every key strictly below `key`.
#[inline(always)]
fn below(key: u64) -> u64 {
    debug_assert!(key < MAX_KEYS);
    (1u64 << key) - 1
}

impl Header {
    pub const EMPTY: Header = Header { high: 0, low: 0 };

    /// Reads the header from the front of `region`.
    ///
    /// # Panics
    /// If `region` is shorter than [`HEADER_SIZE`]. Callers check first.
    #[inline(always)]
    pub fn read(region: &[u8]) -> Self {
        let mut high = [0u8; 8];
        let mut low = [0u8; 8];
        high.copy_from_slice(&region[0..8]);
        low.copy_from_slice(&region[8..HEADER_SIZE]);
        Self {
            high: u64::from_ne_bytes(high),
            low: u64::from_ne_bytes(low),
        }
    }

    /// Writes the header to the front of `region`.
    #[inline(always)]
    pub fn write(self, region: &mut [u8]) {
        region[0..8].copy_from_slice(&self.high.to_ne_bytes());
        region[8..HEADER_SIZE].copy_from_slice(&self.low.to_ne_bytes());
    }

    /// Keeps only the bits selected by `mask` in both words.
    #[inline(always)]
    pub fn masked(self, mask: u64) -> Self {
        Self {
            high: self.high & mask,
            low: self.low & mask,
        }
    }

    /// Bitmap of every present key.
    #[inline(always)]
    pub fn present(self) -> u64 {
        self.high | self.low
    }

    /// Number of present keys.
    #[inline(always)]
    pub fn count(self) -> usize {
        self.present().count_ones() as usize
    }

    #[inline(always)]
    pub fn contains(self, key: u64) -> bool {
        self.present() & (1u64 << key) != 0
    }

    /// Length code of `key`, or `None` if the key is absent.
    #[inline(always)]
    pub fn code(self, key: u64) -> Option<LenCode> {
        let bit = 1u64 << key;
        LenCode::from_bits(self.high & bit != 0, self.low & bit != 0)
    }

    /// Sum of the decoded lengths of every present key.
    #[inline(always)]
    pub fn total_length(self) -> usize {
        let two = (self.low & !self.high).count_ones() as usize;
        let four = (self.high & !self.low).count_ones() as usize;
        let eight = (self.high & self.low).count_ones() as usize;
        (two << 1) + (four << 2) + (eight << 3)
    }

    /// Byte offset of `key`'s value from the start of the region.
    #[inline(always)]
    pub fn offset(self, key: u64) -> usize {
        HEADER_SIZE + self.masked(below(key)).total_length()
    }

    /// Marks `key` present with `code`, replacing any previous code.
    #[inline(always)]
    pub fn insert(&mut self, key: u64, code: LenCode) {
        self.remove(key);
        let (high, low) = code.bits();
        self.high |= (high as u64) << key;
        self.low |= (low as u64) << key;
    }

    /// Clears both bits of `key`.
    #[inline(always)]
    pub fn remove(&mut self, key: u64) {
        let bit = 1u64 << key;
        self.high &= !bit;
        self.low &= !bit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_code_decodes_all_sizes() {
        for len in [2usize, 4, 8] {
            let code = LenCode::from_len(len).unwrap();
            assert_eq!(code.value_len(), len);
            let (high, low) = code.bits();
            assert_eq!(LenCode::from_bits(high, low), Some(code));
        }
        assert_eq!(LenCode::from_len(6), None);
        assert_eq!(LenCode::from_bits(false, false), None);
    }

    #[test]
    fn test_total_length_counts_eight_byte_codes() {
        let mut h = Header::EMPTY;
        h.insert(0, LenCode::Two);
        h.insert(1, LenCode::Four);
        h.insert(2, LenCode::Eight);
        assert_eq!(h.total_length(), 2 + 4 + 8);
        assert_eq!(h.offset(0), HEADER_SIZE);
        assert_eq!(h.offset(1), HEADER_SIZE + 2);
        assert_eq!(h.offset(2), HEADER_SIZE + 6);
        assert_eq!(h.offset(3), HEADER_SIZE + 14);
    }

    #[test]
    fn test_offset_of_key_63_covers_all_lower_keys() {
        let mut h = Header::EMPTY;
        for key in 0..MAX_KEYS {
            h.insert(key, LenCode::Two);
        }
        assert_eq!(h.offset(63), HEADER_SIZE + 63 * 2);
        assert_eq!(h.total_length(), 128);
        assert_eq!(h.count(), 64);
    }

    #[test]
    fn test_insert_replaces_previous_code() {
        let mut h = Header::EMPTY;
        h.insert(9, LenCode::Eight);
        h.insert(9, LenCode::Two);
        assert_eq!(h.code(9), Some(LenCode::Two));
        assert_eq!(h.total_length(), 2);

        h.remove(9);
        assert_eq!(h, Header::EMPTY);
    }

    #[test]
    fn test_read_write_uses_host_order_layout() {
        let h = Header { high: 0x8000_0000_0000_0001, low: 0x0000_0000_0000_0003 };
        let mut buf = [0u8; HEADER_SIZE];
        h.write(&mut buf);
        assert_eq!(&buf[0..8], &h.high.to_ne_bytes());
        assert_eq!(&buf[8..16], &h.low.to_ne_bytes());
        assert_eq!(Header::read(&buf), h);
    }
}
