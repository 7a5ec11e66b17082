//! Time-based one-time codes (RFC 6238) over HOTP (RFC 4226), plus the base32
//! secret encoding used to store two-factor keys.

use data_encoding::{Encoding, BASE32, BASE32_NOPAD};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

pub const DEFAULT_DIGITS: u32 = 6;

pub const DEFAULT_TIME_STEP: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TotpError {
    #[error("invalid base32 secret: {0}")]
    Format(String),
    #[error("number of digits must be between 4 and 9, got {0}")]
    Digits(u32),
    #[error("invalid HMAC key")]
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TotpAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

// Base32
//------------------------------------------------------------------------------

/// Output options for [`to_base32`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Base32Format {
    /// Groups of 4 characters separated by a space
    pub spacing: bool,
    pub padding: bool,
    pub uppercase: bool,
}

/// Decodes a base32 secret. Whitespace is ignored, letters are case
/// insensitive and `=` padding may only be followed by whitespace. A
/// truncated tail holding 5 or more bits still yields a final, zero padded
/// byte.
pub fn from_base32(text: &str) -> Result<Vec<u8>, TotpError> {
    let mut normalized = Zeroizing::new(String::with_capacity(text.len()));
    let mut padded = false;
    for ch in text.chars().filter(|c| !c.is_whitespace()) {
        if ch == '=' {
            padded = true;
            continue;
        }
        if padded {
            return Err(TotpError::Format(format!("character '{ch}' found after padding")));
        }
        let ch = ch.to_ascii_uppercase();
        if !matches!(ch, 'A'..='Z' | '2'..='7') {
            return Err(TotpError::Format(format!("unknown character '{ch}'")));
        }
        normalized.push(ch);
    }
    // 1, 3 or 6 characters past a full group leave 5, 7 or 6 spare bits
    if matches!(normalized.len() % 8, 1 | 3 | 6) {
        normalized.push('A');
    }

    lenient_base32()?
        .decode(normalized.as_bytes())
        .map_err(|e| TotpError::Format(e.to_string()))
}

pub fn to_base32(bytes: &[u8], format: Base32Format) -> String {
    let encoding = if format.padding { &BASE32 } else { &BASE32_NOPAD };
    let mut text = encoding.encode(bytes);
    if !format.uppercase {
        text.make_ascii_lowercase();
    }
    if !format.spacing {
        return text;
    }
    text.as_bytes()
        .chunks(4)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

// Unused trailing bits of the last character are ignored
fn lenient_base32() -> Result<Encoding, TotpError> {
    let mut spec = BASE32_NOPAD.specification();
    spec.check_trailing_bits = false;
    spec.encoding().map_err(|e| TotpError::Format(e.to_string()))
}

#[cfg(test)]
mod base32_tests {
    use test_case::test_case;

    use super::{from_base32, to_base32, Base32Format, TotpError};

    #[test_case("MZXW6YTBOI", b"foobar")]
    #[test_case("mzxw6ytboi======", b"foobar")]
    #[test_case("mzxw 6ytb oi== ====", b"foobar")]
    #[test_case("MZxw6\tyTboI=", b"foobar")]
    #[test_case("", b"")]
    #[test_case("M", b"\x60")]
    #[test_case("MZX", b"\x66\x6e")]
    #[test_case("mzx===", b"\x66\x6e")]
    #[test_case("MZXW6Y", b"\x66\x6f\x6f\x60")]
    fn test_from_base32(text: &str, exp: &[u8]) {
        assert_eq!(from_base32(text).unwrap(), exp);
    }

    #[test_case("MZXW6YTBOI=A")]
    #[test_case("MZXW6YTBO1")]
    #[test_case("MZXW-6YTBOI")]
    fn test_from_base32_format_error(text: &str) {
        assert!(matches!(from_base32(text), Err(TotpError::Format(_))));
    }

    #[test]
    fn test_to_base32() {
        let bytes = b"foobar";
        assert_eq!(to_base32(bytes, Base32Format::default()), "mzxw6ytboi");
        let fmt = Base32Format { spacing: true, padding: false, uppercase: true };
        assert_eq!(to_base32(bytes, fmt), "MZXW 6YTB OI");
        let fmt = Base32Format { spacing: true, padding: true, uppercase: false };
        assert_eq!(to_base32(bytes, fmt), "mzxw 6ytb oi== ====");
    }
}

// One-time password
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totp {
    secret: Vec<u8>,
    digits: u32,
    step: u64,
    algorithm: TotpAlgorithm,
}

impl Totp {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret, digits: DEFAULT_DIGITS, step: DEFAULT_TIME_STEP, algorithm: TotpAlgorithm::Sha1 }
    }

    pub fn from_base32(secret: &str) -> Result<Self, TotpError> {
        Ok(Self::new(from_base32(secret)?))
    }

    pub fn with_digits(mut self, digits: u32) -> Result<Self, TotpError> {
        if !(4..=9).contains(&digits) {
            return Err(TotpError::Digits(digits));
        }
        self.digits = digits;
        Ok(self)
    }

    pub fn with_algorithm(mut self, algorithm: TotpAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Counter based code, left padded with zeros to the configured digits.
    pub fn hotp(&self, counter: u64) -> Result<String, TotpError> {
        let msg = counter.to_be_bytes();
        let hash = match self.algorithm {
            TotpAlgorithm::Sha1 => mac_bytes::<Hmac<Sha1>>(&self.secret, &msg)?,
            TotpAlgorithm::Sha256 => mac_bytes::<Hmac<Sha256>>(&self.secret, &msg)?,
            TotpAlgorithm::Sha512 => mac_bytes::<Hmac<Sha512>>(&self.secret, &msg)?,
        };
        let code = dynamic_truncate(&hash) % 10u32.pow(self.digits);
        Ok(format!("{code:0width$}", width = self.digits as usize))
    }

    pub fn code_at(&self, unix_seconds: u64) -> Result<String, TotpError> {
        self.hotp(unix_seconds / self.step)
    }

    /// Code for the current time step. Time dependent, never cache the result.
    pub fn code_now(&self) -> Result<String, TotpError> {
        let now = OffsetDateTime::now_utc().unix_timestamp().max(0) as u64;
        self.code_at(now)
    }
}

impl Drop for Totp {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

fn mac_bytes<M: Mac + KeyInit>(key: &[u8], msg: &[u8]) -> Result<Vec<u8>, TotpError> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| TotpError::Key)?;
    mac.update(msg);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn dynamic_truncate(hash: &[u8]) -> u32 {
    let offset = (hash[hash.len() - 1] & 0x0F) as usize;
    u32::from_be_bytes([hash[offset] & 0x7F, hash[offset + 1], hash[offset + 2], hash[offset + 3]])
}

/// Current code for a stored base32 key, or an empty string if the key does
/// not decode.
pub fn two_factor_code(key: &str) -> String {
    match Totp::from_base32(key).and_then(|t| t.code_now()) {
        Ok(code) => code,
        Err(e) => {
            warn!("Cannot generate two-factor code: {e}");
            String::new()
        }
    }
}
