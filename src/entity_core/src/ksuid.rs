//! K-sortable unique identifiers.
//!
//! The id itself is `svix_ksuid::Ksuid`: a big-endian `u32` of seconds
//! since [`EPOCH`] followed by 16 random bytes, written as 27 base62
//! characters whose order matches the byte order. This module adds the
//! process-wide monotonic generator on top.

use crate::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, str::FromStr, sync::LazyLock};
use svix_ksuid::{Ksuid as WrappedKsuid, KsuidLike};

/// KSUID epoch, in Unix seconds.
pub const EPOCH: i64 = 1_400_000_000;

const BYTE_LEN: usize = 20;
const STRING_LEN: usize = 27;

///
/// Ksuid
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Ksuid(WrappedKsuid);

impl Ksuid {
    #[must_use]
    pub fn from_parts(timestamp: u32, payload: [u8; 16]) -> Self {
        let mut bytes = [0u8; BYTE_LEN];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..].copy_from_slice(&payload);

        Self(WrappedKsuid::from_bytes(bytes))
    }

    fn to_bytes(self) -> [u8; BYTE_LEN] {
        let mut bytes = [0u8; BYTE_LEN];
        bytes.copy_from_slice(&self.0.bytes()[..]);
        bytes
    }

    /// Seconds since [`EPOCH`].
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        let bytes = self.to_bytes();
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Next id in byte order; `None` once every byte is `0xFF`.
    #[must_use]
    pub fn increment(&self) -> Option<Self> {
        let mut bytes = self.to_bytes();
        for byte in bytes.iter_mut().rev() {
            let (next, carry) = byte.overflowing_add(1);
            *byte = next;
            if !carry {
                return Some(Self(WrappedKsuid::from_bytes(bytes)));
            }
        }

        None
    }

    /// Generate from the process-wide monotonic generator.
    pub fn generate() -> Result<Self> {
        GENERATOR.lock().generate(now())
    }
}

impl fmt::Display for Ksuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_base62())
    }
}

impl FromStr for Ksuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != STRING_LEN {
            return Err(Error::key(format!("ksuid must be {STRING_LEN} characters")));
        }
        let decoded =
            WrappedKsuid::from_base62(s).map_err(|err| Error::key(format!("invalid ksuid: {err}")))?;

        // values past the 20-byte range wrap on decode
        if decoded.to_base62() != s {
            return Err(Error::key("ksuid out of range"));
        }

        Ok(Self(decoded))
    }
}

impl Serialize for Ksuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_base62())
    }
}

impl<'de> Deserialize<'de> for Ksuid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

///
/// GENERATOR keeps the last id so that ids from this process never go
/// backwards, even within one second or when the clock steps back.
///

static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::default()));

fn now() -> u32 {
    let seconds = chrono::Utc::now().timestamp() - EPOCH;
    u32::try_from(seconds).unwrap_or(0)
}

#[derive(Default)]
struct Generator {
    previous: Option<Ksuid>,
}

impl Generator {
    fn generate(&mut self, timestamp: u32) -> Result<Ksuid> {
        let next = match self.previous {
            Some(previous) if timestamp <= previous.timestamp() => {
                previous.increment().ok_or(Error::KsuidOverflow)?
            }
            _ => Ksuid::from_parts(timestamp, rand::random::<u128>().to_be_bytes()),
        };
        self.previous = Some(next);

        Ok(next)
    }
}
