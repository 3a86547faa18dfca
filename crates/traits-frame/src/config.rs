use serde::Deserialize;
use std::path::Path;

use crate::error::FrameError;
use traits_core::HEADER_SIZE;

/// Headroom the kernel leaves in front of XDP packet data.
pub const XDP_PACKET_HEADROOM: usize = 256;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FrameConfig {
    /// Bytes in front of the packet data.
    pub headroom: usize,
    /// Bytes at the start of the headroom held by the frame descriptor. The
    /// trait store begins right after them.
    pub reserved: usize,
    /// Largest payload a frame accepts.
    pub max_payload: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            headroom: XDP_PACKET_HEADROOM,
            reserved: 32,
            max_payload: 1500,
        }
    }
}

impl FrameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, FrameError> {
        let config: Self = toml::from_str(s).map_err(|e| FrameError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// The headroom must at least hold the descriptor and an empty store.
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.reserved + HEADER_SIZE > self.headroom {
            return Err(FrameError::Config(format!(
                "headroom {} cannot hold {} reserved bytes and a {}-byte trait header",
                self.headroom, self.reserved, HEADER_SIZE
            )));
        }
        Ok(())
    }

    /// Room for trait values once the header is in place.
    pub fn trait_capacity(&self) -> usize {
        self.headroom.saturating_sub(self.reserved + HEADER_SIZE)
    }
}
