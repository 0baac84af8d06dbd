//! Chain-facing data objects shared between the core and the server.

mod account;
mod raw_event;
mod symbol;

pub use account::{AccountId, BondId, FixedHexError, trim_hex_prefix};
pub use raw_event::{EventParam, RawEvent};
pub use symbol::RSymbol;

/// Number of base units in one whole native token.
pub const BASE_UNITS_PER_TOKEN: u128 = 1_000_000_000_000;
