//! Set, get and delete over a caller-owned region.
//!
//! The free functions are the call interface handed to packet hooks: the
//! region is borrowed for the duration of one call and the ceiling travels
//! with every mutating call, clamped to the slice so nothing outside the
//! borrow is ever touched. [`TraitStore`] wraps the same functions for Rust
//! callers that hold the region for a while.

use core::fmt;

use crate::error::TraitError;
use crate::header::{Header, LenCode, HEADER_SIZE, MAX_KEYS};

pub type Result<T> = core::result::Result<T, TraitError>;

#[inline(always)]
fn check_key(key: u64) -> Result<()> {
    if key < MAX_KEYS {
        Ok(())
    } else {
        Err(TraitError::InvalidArgument)
    }
}

/// Reads the header and proves the measured store fits below `limit`.
///
/// Every slice index taken afterwards is bounded by the measured size, so
/// an externally corrupted header surfaces as `OutOfSpace` instead of a
/// panic.
#[inline(always)]
fn load(region: &[u8], limit: usize) -> Result<Header> {
    if limit < HEADER_SIZE {
        return Err(TraitError::OutOfSpace);
    }
    let hdr = Header::read(region);
    if HEADER_SIZE + hdr.total_length() > limit {
        return Err(TraitError::OutOfSpace);
    }
    Ok(hdr)
}

/// Writes an empty header at the front of `region`.
///
/// `ceiling` is the number of bytes the store may use, clamped to
/// `region.len()`. It can change between calls as long as it never drops
/// below [`measure`].
pub fn init(region: &mut [u8], ceiling: usize) -> Result<()> {
    if HEADER_SIZE > ceiling.min(region.len()) {
        return Err(TraitError::OutOfSpace);
    }
    Header::EMPTY.write(region);
    Ok(())
}

/// Total bytes in use: header plus every stored value.
///
/// # Panics
/// If `region` is shorter than the header. The region must have been
/// initialized with [`init`].
pub fn measure(region: &[u8]) -> usize {
    HEADER_SIZE + Header::read(region).total_length()
}

/// Stores `value` under `key`.
///
/// The value length picks the length code and must be 2, 4 or 8. `flags` is
/// reserved and must be zero. Setting a present key replaces its value; if
/// the length changes the slot is resized and every later value moves with
/// it.
pub fn set(region: &mut [u8], ceiling: usize, key: u64, value: &[u8], flags: u64) -> Result<()> {
    check_key(key)?;
    if flags != 0 {
        return Err(TraitError::InvalidArgument);
    }
    let code = LenCode::from_len(value.len()).ok_or(TraitError::InvalidArgument)?;

    let limit = ceiling.min(region.len());
    let mut hdr = load(region, limit)?;
    let total = HEADER_SIZE + hdr.total_length();
    let old_len = hdr.code(key).map_or(0, LenCode::value_len);
    let new_len = value.len();

    if total - old_len + new_len > limit {
        return Err(TraitError::OutOfSpace);
    }

    let off = hdr.offset(key);
    if old_len != new_len {
        region.copy_within(off + old_len..total, off + new_len);
        tracing::trace!("TraitStore: key {} resized {} -> {} bytes at offset {}", key, old_len, new_len, off);
    }
    region[off..off + new_len].copy_from_slice(value);

    hdr.insert(key, code);
    hdr.write(region);
    Ok(())
}

/// Borrows the stored bytes of `key`.
pub fn value(region: &[u8], key: u64) -> Result<&[u8]> {
    check_key(key)?;
    let hdr = load(region, region.len())?;
    let len = hdr.code(key).ok_or(TraitError::NotFound)?.value_len();
    let off = hdr.offset(key);
    Ok(&region[off..off + len])
}

/// Copies the value of `key` into `out` and returns its length.
///
/// `out` may be longer than the value; only the first `len` bytes are
/// written.
pub fn get(region: &[u8], key: u64, out: &mut [u8]) -> Result<usize> {
    let stored = value(region, key)?;
    let len = stored.len();
    if len > out.len() {
        return Err(TraitError::BufferTooSmall);
    }
    out[..len].copy_from_slice(stored);
    Ok(len)
}

/// Removes `key` and closes the gap it leaves.
pub fn delete(region: &mut [u8], key: u64) -> Result<()> {
    check_key(key)?;
    let mut hdr = load(region, region.len())?;
    let len = hdr.code(key).ok_or(TraitError::NotFound)?.value_len();
    let total = HEADER_SIZE + hdr.total_length();
    let off = hdr.offset(key);

    region.copy_within(off + len..total, off);
    tracing::trace!("TraitStore: key {} removed, {} bytes reclaimed at offset {}", key, len, off);

    hdr.remove(key);
    hdr.write(region);
    Ok(())
}

/// A trait store borrowed for a stretch of work.
///
/// The slice length is the ceiling. To raise the ceiling, attach again over
/// a longer slice of the same memory.
pub struct TraitStore<'a> {
    region: &'a mut [u8],
}

macro_rules! typed_accessors {
    ($($set:ident, $get:ident => $ty:ty;)*) => {
        $(
            /// Stores a host-order integer under `key`.
            pub fn $set(&mut self, key: u64, value: $ty) -> Result<()> {
                self.set(key, &value.to_ne_bytes())
            }

            /// Reads a host-order integer stored under `key`.
            ///
            /// Fails with `BufferTooSmall` if the stored value is wider and
            /// `InvalidArgument` if it is narrower.
            pub fn $get(&self, key: u64) -> Result<$ty> {
                let mut buf = [0u8; core::mem::size_of::<$ty>()];
                let len = self.get(key, &mut buf)?;
                if len != buf.len() {
                    return Err(TraitError::InvalidArgument);
                }
                Ok(<$ty>::from_ne_bytes(buf))
            }
        )*
    };
}

impl<'a> TraitStore<'a> {
    /// Initializes an empty store over `region`.
    pub fn init(region: &'a mut [u8]) -> Result<Self> {
        let ceiling = region.len();
        init(region, ceiling)?;
        Ok(Self { region })
    }

    /// Wraps a region that already holds a store.
    pub fn attach(region: &'a mut [u8]) -> Result<Self> {
        load(region, region.len())?;
        Ok(Self { region })
    }

    pub fn ceiling(&self) -> usize {
        self.region.len()
    }

    pub fn header(&self) -> Header {
        Header::read(self.region)
    }

    pub fn measure(&self) -> usize {
        measure(self.region)
    }

    /// Bytes still free below the ceiling.
    pub fn remaining(&self) -> usize {
        self.ceiling() - self.measure()
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.header().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: u64) -> bool {
        key < MAX_KEYS && self.header().contains(key)
    }

    pub fn set(&mut self, key: u64, value: &[u8]) -> Result<()> {
        let ceiling = self.ceiling();
        set(self.region, ceiling, key, value, 0)
    }

    pub fn get(&self, key: u64, out: &mut [u8]) -> Result<usize> {
        get(self.region, key, out)
    }

    pub fn value(&self, key: u64) -> Result<&[u8]> {
        value(self.region, key)
    }

    pub fn delete(&mut self, key: u64) -> Result<()> {
        delete(self.region, key)
    }

    typed_accessors! {
        set_u16, get_u16 => u16;
        set_u32, get_u32 => u32;
        set_u64, get_u64 => u64;
    }

    /// Present traits in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let hdr = self.header();
        Iter {
            region: self.region,
            hdr,
            pending: hdr.present(),
            off: HEADER_SIZE,
        }
    }

    /// The used prefix of the region: header plus values.
    pub fn as_bytes(&self) -> &[u8] {
        &self.region[..self.measure()]
    }

    pub fn into_inner(self) -> &'a mut [u8] {
        self.region
    }
}

impl fmt::Debug for TraitStore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraitStore")
            .field("ceiling", &self.ceiling())
            .field("measure", &self.measure())
            .field("keys", &self.len())
            .finish()
    }
}

impl<'s> IntoIterator for &'s TraitStore<'_> {
    type Item = (u64, &'s [u8]);
    type IntoIter = Iter<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(key, value)` pairs, walking the value area once.
pub struct Iter<'a> {
    region: &'a [u8],
    hdr: Header,
    pending: u64,
    off: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (u64, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending == 0 {
            return None;
        }
        let key = self.pending.trailing_zeros() as u64;
        self.pending &= self.pending - 1;

        let len = self.hdr.code(key)?.value_len();
        let start = self.off;
        self.off += len;
        self.region.get(start..self.off).map(|v| (key, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.pending.count_ones() as usize;
        (n, Some(n))
    }
}

#[cfg(kani)]
mod proofs {
    use super::*;

    #[kani::proof]
    #[kani::unwind(40)]
    fn prove_set_get_roundtrip() {
        let mut region = [0u8; 32];
        let key: u64 = kani::any();
        let value: [u8; 4] = kani::any();
        kani::assume(key < MAX_KEYS);

        init(&mut region, 32).unwrap();
        set(&mut region, 32, key, &value, 0).unwrap();

        let mut out = [0u8; 4];
        assert_eq!(get(&region, key, &mut out), Ok(4));
        assert_eq!(out, value);
    }

    #[kani::proof]
    #[kani::unwind(40)]
    fn prove_corrupt_header_never_panics() {
        let mut region: [u8; 24] = kani::any();
        let key: u64 = kani::any();
        let mut out = [0u8; 8];

        let _ = get(&region, key, &mut out);
        let _ = set(&mut region, 24, key, &[1, 2], 0);
        let _ = delete(&mut region, key);
    }
}
