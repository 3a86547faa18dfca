use core::fmt;

/// Failure kinds of the trait store.
///
/// Every check runs before the region is touched, so an `Err` always leaves
/// the store exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitError {
    /// Key outside `[0, 64)`, value length not 2, 4 or 8, or non-zero flags.
    InvalidArgument,
    /// The key has no value in the store.
    NotFound,
    /// The store would grow past its ceiling.
    OutOfSpace,
    /// The output buffer is shorter than the stored value.
    BufferTooSmall,
}

/// Kernel errno values the helpers report.
pub mod errno {
    pub const ENOENT: i32 = 2;
    pub const ENOMEM: i32 = 12;
    pub const EINVAL: i32 = 22;
    pub const EFBIG: i32 = 27;
}

impl TraitError {
    /// Negative errno, as returned by the in-kernel helpers.
    pub fn errno(self) -> i32 {
        match self {
            TraitError::InvalidArgument => -errno::EINVAL,
            TraitError::NotFound => -errno::ENOENT,
            TraitError::OutOfSpace => -errno::ENOMEM,
            TraitError::BufferTooSmall => -errno::EFBIG,
        }
    }

    /// Inverse of [`TraitError::errno`].
    pub fn from_errno(code: i32) -> Option<Self> {
        match -code {
            errno::EINVAL => Some(TraitError::InvalidArgument),
            errno::ENOENT => Some(TraitError::NotFound),
            errno::ENOMEM => Some(TraitError::OutOfSpace),
            errno::EFBIG => Some(TraitError::BufferTooSmall),
            _ => None,
        }
    }
}

impl fmt::Display for TraitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraitError::InvalidArgument => f.write_str("invalid trait key, length or flags"),
            TraitError::NotFound => f.write_str("trait key not set"),
            TraitError::OutOfSpace => f.write_str("not enough room left in trait store"),
            TraitError::BufferTooSmall => f.write_str("buffer too small for stored trait"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TraitError {}
