//! # traits-core: Packet Trait Store
//!
//! Fixed-capacity key/value metadata packed into a caller-owned byte region,
//! with no allocation. Up to 64 keys, values of 2, 4 or 8 bytes.
//!
//! ```text
//! [ high: u64 ][ low: u64 ][ value k0 ][ value k1 ] ... ceiling
//! ```
//!
//! Values are kept sorted by key and gapless: inserts and deletes shift the
//! tail of the value area in place.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod header;
pub mod store;

pub use error::TraitError;
pub use header::{Header, LenCode, HEADER_SIZE, MAX_KEYS};
pub use store::{Iter, TraitStore};
