//! # traits-frame: Trait Stores in Packet Headroom
//!
//! Binds a [`traits_core`] store to the headroom of a packet buffer, the
//! way an XDP hook sees it: the store sits behind the frame descriptor and
//! may grow up to the start of the packet data.

pub mod config;
pub mod error;
pub mod frame;

pub use config::FrameConfig;
pub use error::FrameError;
pub use frame::MetaFrame;
