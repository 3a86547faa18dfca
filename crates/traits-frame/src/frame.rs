use bytes::{Bytes, BytesMut};
use zeroize::Zeroize;

use crate::config::FrameConfig;
use crate::error::FrameError;
use traits_core::store::{self, Result as TraitResult};
use traits_core::TraitStore;

/// A packet buffer carrying a trait store in its headroom.
///
/// ```text
/// 0          reserved                         data              len
/// [descriptor][ header | values | free ... ][ packet bytes ... ]
/// ```
///
/// The packet data start is the store's ceiling. Pushing headers into the
/// headroom lowers it, popping headers raises it; the ceiling never drops
/// below the bytes the store currently uses.
pub struct MetaFrame {
    buf: BytesMut,
    reserved: usize,
    data: usize,
    max_payload: usize,
}

impl MetaFrame {
    pub fn new(config: &FrameConfig, payload: &[u8]) -> Result<Self, FrameError> {
        config.validate()?;
        if payload.len() > config.max_payload {
            return Err(FrameError::PayloadTooLarge(payload.len()));
        }

        let mut buf = BytesMut::zeroed(config.headroom + payload.len());
        buf[config.headroom..].copy_from_slice(payload);

        let mut frame = Self {
            buf,
            reserved: config.reserved,
            data: config.headroom,
            max_payload: config.max_payload,
        };
        let ceiling = frame.ceiling();
        store::init(frame.region(), ceiling)?;

        tracing::debug!(
            "MetaFrame: {} byte payload, {} bytes of headroom for traits",
            payload.len(),
            ceiling
        );
        Ok(frame)
    }

    /// Bytes available to the trait store, header included.
    pub fn ceiling(&self) -> usize {
        self.data - self.reserved
    }

    fn region(&mut self) -> &mut [u8] {
        &mut self.buf[self.reserved..self.data]
    }

    pub fn traits_size(&self) -> usize {
        store::measure(&self.buf[self.reserved..self.data])
    }

    pub fn trait_set(&mut self, key: u64, value: &[u8], flags: u64) -> TraitResult<()> {
        let ceiling = self.ceiling();
        store::set(self.region(), ceiling, key, value, flags)
    }

    pub fn trait_get(&self, key: u64, out: &mut [u8]) -> TraitResult<usize> {
        store::get(&self.buf[self.reserved..self.data], key, out)
    }

    pub fn trait_del(&mut self, key: u64) -> TraitResult<()> {
        store::delete(self.region(), key)
    }

    /// Typed view over the store, valid until the frame is touched again.
    pub fn traits(&mut self) -> TraitResult<TraitStore<'_>> {
        TraitStore::attach(self.region())
    }

    /// Moves the packet start by `delta` bytes.
    ///
    /// A negative delta prepends room for new headers and lowers the store
    /// ceiling; a positive one strips leading bytes and raises it. New head
    /// bytes are zeroed so stale trait bytes never reach the wire.
    pub fn adjust_head(&mut self, delta: isize) -> Result<(), FrameError> {
        let n = delta.unsigned_abs();
        if delta < 0 {
            let floor = self.reserved + self.traits_size();
            if self.data < floor + n {
                tracing::warn!(
                    "MetaFrame: pushing {} bytes would overwrite traits ending at {}",
                    n,
                    floor
                );
                return Err(FrameError::HeadroomExhausted);
            }
            let start = self.data - n;
            self.buf[start..self.data].zeroize();
            self.data = start;
        } else {
            if n > self.payload().len() {
                return Err(FrameError::InvalidAdjust(delta));
            }
            self.data += n;
        }

        tracing::trace!("MetaFrame: head moved by {}, trait ceiling now {}", delta, self.ceiling());
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.buf[self.data..]
    }

    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.data..]
    }

    /// Reuses the buffer for another packet. Everything from the previous
    /// packet, traits included, is scrubbed first.
    pub fn recycle(&mut self, config: &FrameConfig, payload: &[u8]) -> Result<(), FrameError> {
        config.validate()?;
        if payload.len() > config.max_payload {
            return Err(FrameError::PayloadTooLarge(payload.len()));
        }

        self.buf[..].zeroize();
        self.buf.resize(config.headroom + payload.len(), 0);
        self.buf[config.headroom..].copy_from_slice(payload);
        self.reserved = config.reserved;
        self.data = config.headroom;
        self.max_payload = config.max_payload;

        let ceiling = self.ceiling();
        store::init(self.region(), ceiling)?;

        tracing::debug!("MetaFrame: recycled for {} byte payload", payload.len());
        Ok(())
    }

    /// Detaches the packet bytes, dropping the headroom.
    pub fn into_payload(mut self) -> Bytes {
        self.buf.split_off(self.data).freeze()
    }

    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl std::fmt::Debug for MetaFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaFrame")
            .field("reserved", &self.reserved)
            .field("data", &self.data)
            .field("payload_len", &self.payload().len())
            .field("traits_size", &self.traits_size())
            .finish()
    }
}
