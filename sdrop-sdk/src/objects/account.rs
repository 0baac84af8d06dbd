use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a fixed-width hex identifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixedHexError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Strip an optional `0x` / `0X` prefix.
pub fn trim_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], FixedHexError> {
    let raw = hex::decode(trim_hex_prefix(s))?;
    let actual = raw.len();
    raw.try_into()
        .map_err(|_| FixedHexError::InvalidLength {
            expected: N,
            actual,
        })
}

macro_rules! fixed_hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; 32]);

        impl From<[u8; 32]> for $name {
            fn from(value: [u8; 32]) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = FixedHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_fixed::<32>(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_hex_id! {
    /// A 32-byte on-chain account identifier (public key).
    AccountId
}

fixed_hex_id! {
    /// A 32-byte hash identifying a single bond operation.
    BondId
}
