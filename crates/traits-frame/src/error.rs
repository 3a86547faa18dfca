use std::fmt;

use traits_core::TraitError;

#[derive(Debug)]
pub enum FrameError {
    Trait(TraitError),
    Config(String),
    Io(std::io::Error),
    /// Growing the packet head would cut into the trait store.
    HeadroomExhausted,
    /// Stripping more bytes than the packet holds.
    InvalidAdjust(isize),
    PayloadTooLarge(usize),
}

impl From<TraitError> for FrameError {
    fn from(e: TraitError) -> Self {
        FrameError::Trait(e)
    }
}

impl From<std::io::Error> for FrameError {
    fn from(e: std::io::Error) -> Self {
        FrameError::Io(e)
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Trait(e) => write!(f, "trait store: {}", e),
            FrameError::Config(msg) => write!(f, "invalid frame config: {}", msg),
            FrameError::Io(e) => write!(f, "io: {}", e),
            FrameError::HeadroomExhausted => f.write_str("not enough headroom left"),
            FrameError::InvalidAdjust(delta) => write!(f, "cannot move packet head by {}", delta),
            FrameError::PayloadTooLarge(len) => write!(f, "payload of {} bytes too large", len),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Trait(e) => Some(e),
            FrameError::Io(e) => Some(e),
            _ => None,
        }
    }
}
