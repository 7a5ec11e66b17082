use std::fmt::{Debug, Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    InvalidInput,
    CapacityExceeded,
    InvalidVersion,
    InvalidMaskPattern,
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            Self::InvalidInput => "Text is empty",
            Self::CapacityExceeded => "Input too long for any QR version",
            Self::InvalidVersion => "Invalid version",
            Self::InvalidMaskPattern => "Invalid masking pattern",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRError {}

pub type QRResult<T> = Result<T, QRError>;
