//! ULID parsing and generation.
//!
//! Every id the API hands out (servers, channels, users, roles, files) is a
//! ULID: 26 Crockford base32 characters packing a 48-bit millisecond
//! timestamp above 80 random bits. The timestamp is recovered here to give
//! entities a creation date, and fresh ULIDs double as request nonces.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use thiserror::Error;

const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 5;
const RANDOM_BITS: u32 = 80;
const RANDOM_MASK: u128 = (1 << RANDOM_BITS) - 1;
const TIMESTAMP_MASK: u64 = (1 << 48) - 1;

/// Decoding table. Lower-case letters are accepted, Crockford's
/// I/L/O/U aliases are not.
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 32 {
        let c = ALPHABET[i as usize];
        lut[c as usize] = i;
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i;
        }
        i += 1;
    }
    lut
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid id length {len}, expected {}", Ulid::LEN)]
    InvalidLength { len: usize },

    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },

    /// The leading character encodes more than 128 bits.
    #[error("id overflows 128 bits")]
    Overflow,

    #[error("timestamp {millis}ms is out of range")]
    TimestampOutOfRange { millis: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ulid(u128);

impl Ulid {
    pub const LEN: usize = 26;

    /// Builds an id from a millisecond timestamp and random bits. Both are
    /// truncated to their field widths.
    pub const fn from_parts(timestamp_ms: u64, random: u128) -> Self {
        Self((((timestamp_ms & TIMESTAMP_MASK) as u128) << RANDOM_BITS) | (random & RANDOM_MASK))
    }

    /// Generates an id for the current instant.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_datetime(Utc::now())
    }

    #[allow(clippy::cast_sign_loss)]
    pub fn with_datetime(datetime: DateTime<Utc>) -> Self {
        let millis = datetime.timestamp_millis().max(0) as u64;
        Self::from_parts(millis, rand::random::<u128>())
    }

    pub const fn timestamp_ms(self) -> u64 {
        (self.0 >> RANDOM_BITS) as u64
    }

    pub const fn random(self) -> u128 {
        self.0 & RANDOM_MASK
    }

    /// Creation instant: the Unix epoch plus the embedded milliseconds.
    #[allow(clippy::cast_possible_wrap)]
    pub fn datetime(self) -> Result<DateTime<Utc>, DecodeError> {
        let millis = self.timestamp_ms();
        DateTime::from_timestamp_millis(millis as i64)
            .ok_or(DecodeError::TimestampOutOfRange { millis })
    }
}

impl FromStr for Ulid {
    type Err = DecodeError;

    fn from_str(encoded: &str) -> Result<Self, Self::Err> {
        if encoded.len() != Self::LEN {
            return Err(DecodeError::InvalidLength { len: encoded.len() });
        }

        let mut acc = 0_u128;
        for (index, byte) in encoded.bytes().enumerate() {
            let value = LOOKUP[byte as usize];
            if value == NO_VALUE {
                let character = encoded[index..].chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(DecodeError::InvalidCharacter { character, index });
            }
            // 26 * 5 = 130 bits, so the first character may only carry 3.
            if index == 0 && value > 7 {
                return Err(DecodeError::Overflow);
            }
            acc = (acc << BITS_PER_CHAR) | u128::from(value);
        }

        Ok(Self(acc))
    }
}

impl fmt::Display for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0_u8; Self::LEN];
        for (i, slot) in buf.iter_mut().enumerate() {
            let shift = BITS_PER_CHAR * (Self::LEN - 1 - i) as u32;
            *slot = ALPHABET[((self.0 >> shift) & 0x1F) as usize];
        }
        // The alphabet is ASCII.
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

/// Decodes the creation instant embedded in `id`.
pub fn creation_time(id: &str) -> crate::Result<DateTime<Utc>> {
    Ok(id.parse::<Ulid>()?.datetime()?)
}

/// A fresh id for create requests, letting the server drop duplicates.
pub fn nonce() -> String {
    Ulid::new().to_string()
}

/// Entities keyed by a ULID, whose creation date can be derived locally.
pub trait Created {
    fn ulid(&self) -> &str;

    fn created_at_mut(&mut self) -> &mut Option<DateTime<Utc>>;

    /// Sets the creation date from the id. On failure the error is returned
    /// and the field is left unset.
    fn calculate_creation_date(&mut self) -> Result<(), DecodeError> {
        let created_at = self.ulid().parse::<Ulid>()?.datetime()?;
        *self.created_at_mut() = Some(created_at);
        Ok(())
    }
}
