//! The `RTokenSeries::ExecuteBondAndSwap` event.
//!
//! Emitted when a user bonds native tokens and swaps the resulting rToken to
//! another chain. Parameters arrive in this order:
//!
//! | index | name           | wire shape                         |
//! |-------|----------------|------------------------------------|
//! | 0     | account id     | hex string, 32 bytes               |
//! | 1     | symbol         | string                             |
//! | 2     | bond id        | hex string, 32 bytes               |
//! | 3     | amount         | decimal (or `0x` hex) u128 string  |
//! | 4     | dest recipient | hex string, or plain text          |
//! | 5     | dest id        | JSON number fitting in u8          |

use bytes::Bytes;
use sdrop_sdk::objects::{AccountId, BondId, FixedHexError, RSymbol, RawEvent, trim_hex_prefix};
use serde_json::Value;
use thiserror::Error;

pub const RTOKEN_SERIES_MODULE: &str = "RTokenSeries";
pub const EXECUTE_BOND_AND_SWAP_EVENT: &str = "ExecuteBondAndSwap";

const PARAM_COUNT: usize = 6;

/// Why a single parameter failed to decode.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("value is not a string")]
    NotString,

    #[error("value is not a number")]
    NotNumber,

    #[error(transparent)]
    FixedHex(#[from] FixedHexError),

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid unsigned integer {0:?}")]
    InvalidInteger(String),

    #[error("{value} does not fit in {target}")]
    OutOfRange { value: String, target: &'static str },
}

/// Errors that can occur while decoding a [`BondSwapEvent`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected event {module}::{event}")]
    WrongEvent { module: String, event: String },

    #[error("expected {expected} params, got {actual}")]
    ParamCount { expected: usize, actual: usize },

    #[error("param[{index}] ({name}): {source}")]
    Param {
        index: usize,
        name: &'static str,
        #[source]
        source: ParamError,
    },
}

/// A decoded `ExecuteBondAndSwap` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondSwapEvent {
    pub account_id: AccountId,
    pub symbol: RSymbol,
    pub bond_id: BondId,
    pub amount: u128,
    pub dest_recipient: Bytes,
    pub dest_id: u8,
}

impl BondSwapEvent {
    /// Whether `event` carries the `RTokenSeries::ExecuteBondAndSwap` tag.
    pub fn matches(event: &RawEvent) -> bool {
        event.is(RTOKEN_SERIES_MODULE, EXECUTE_BOND_AND_SWAP_EVENT)
    }

    /// Decode a tagged raw event. Every parameter must decode; there is no
    /// partial result.
    pub fn decode(event: &RawEvent) -> Result<Self, DecodeError> {
        if !Self::matches(event) {
            return Err(DecodeError::WrongEvent {
                module: event.module_id.to_string(),
                event: event.event_id.to_string(),
            });
        }

        let params = &event.params;
        if params.len() != PARAM_COUNT {
            return Err(DecodeError::ParamCount {
                expected: PARAM_COUNT,
                actual: params.len(),
            });
        }

        Ok(Self {
            account_id: field(0, "account_id", &params[0].value, parse_fixed)?,
            symbol: field(1, "symbol", &params[1].value, parse_symbol)?,
            bond_id: field(2, "bond_id", &params[2].value, parse_fixed)?,
            amount: field(3, "amount", &params[3].value, parse_u128)?,
            dest_recipient: field(4, "dest_recipient", &params[4].value, parse_bytes)?,
            dest_id: field(5, "dest_id", &params[5].value, parse_u8)?,
        })
    }
}

fn field<T>(
    index: usize,
    name: &'static str,
    value: &Value,
    parse: impl FnOnce(&Value) -> Result<T, ParamError>,
) -> Result<T, DecodeError> {
    parse(value).map_err(|source| DecodeError::Param {
        index,
        name,
        source,
    })
}

fn as_str(value: &Value) -> Result<&str, ParamError> {
    value.as_str().ok_or(ParamError::NotString)
}

fn parse_fixed<T>(value: &Value) -> Result<T, ParamError>
where
    T: std::str::FromStr<Err = FixedHexError>,
{
    Ok(as_str(value)?.parse()?)
}

fn parse_symbol(value: &Value) -> Result<RSymbol, ParamError> {
    as_str(value).map(RSymbol::from)
}

fn parse_u128(value: &Value) -> Result<u128, ParamError> {
    if let Some(n) = value.as_u64() {
        return Ok(n.into());
    }

    let s = as_str(value)?;
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) => u128::from_str_radix(hex_digits, 16),
        None => s.parse::<u128>(),
    };
    parsed.map_err(|_| ParamError::InvalidInteger(s.to_string()))
}

/// Hex-decodes the value; a string that is not hex at all is taken as the
/// raw bytes of its text.
fn parse_bytes(value: &Value) -> Result<Bytes, ParamError> {
    let s = as_str(value)?;
    let digits = trim_hex_prefix(s);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Ok(Bytes::copy_from_slice(s.as_bytes()));
    }
    Ok(Bytes::from(hex::decode(digits)?))
}

fn parse_u8(value: &Value) -> Result<u8, ParamError> {
    let n = value.as_u64().ok_or(ParamError::NotNumber)?;
    u8::try_from(n).map_err(|_| ParamError::OutOfRange {
        value: n.to_string(),
        target: "u8",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::bond_swap_raw;
    use sdrop_sdk::objects::EventParam;
    use serde_json::json;

    #[test]
    fn test_decode_valid_event() {
        let raw = bond_swap_raw([1u8; 32], "RATOM", 1_500_000);
        let event = BondSwapEvent::decode(&raw).unwrap();

        assert_eq!(event.account_id, AccountId([1u8; 32]));
        assert_eq!(event.symbol, RSymbol::from("RATOM"));
        assert_eq!(event.bond_id, BondId([0xabu8; 32]));
        assert_eq!(event.amount, 1_500_000);
        assert_eq!(event.dest_recipient.as_ref(), &[0x12, 0x34]);
        assert_eq!(event.dest_id, 1);
    }

    #[test]
    fn test_amount_beyond_u64() {
        let mut raw = bond_swap_raw([1u8; 32], "RDOT", 0);
        let big = u128::from(u64::MAX) * 10;
        raw.params[3].value = json!(big.to_string());
        assert_eq!(BondSwapEvent::decode(&raw).unwrap().amount, big);

        raw.params[3].value = json!("0xff");
        assert_eq!(BondSwapEvent::decode(&raw).unwrap().amount, 255);
    }

    #[test]
    fn test_non_hex_recipient_kept_as_text() {
        let mut raw = bond_swap_raw([1u8; 32], "RATOM", 1);
        raw.params[4].value = json!("cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu");
        let event = BondSwapEvent::decode(&raw).unwrap();
        assert_eq!(
            event.dest_recipient.as_ref(),
            b"cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu"
        );
    }

    #[test]
    fn test_odd_length_text_recipient_kept_as_text() {
        let mut raw = bond_swap_raw([1u8; 32], "RATOM", 1);
        raw.params[4].value = json!("cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7");
        let event = BondSwapEvent::decode(&raw).unwrap();
        assert_eq!(
            event.dest_recipient.as_ref(),
            b"cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7"
        );
    }

    #[test]
    fn test_odd_length_recipient_rejected() {
        let mut raw = bond_swap_raw([1u8; 32], "RATOM", 1);
        raw.params[4].value = json!("0x123");
        let err = BondSwapEvent::decode(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::Param { index: 4, .. }));
    }

    #[test]
    fn test_wrong_param_count() {
        let mut raw = bond_swap_raw([1u8; 32], "RATOM", 1);
        raw.params.truncate(3);
        assert_eq!(
            BondSwapEvent::decode(&raw).unwrap_err(),
            DecodeError::ParamCount {
                expected: 6,
                actual: 3
            }
        );
    }

    #[test]
    fn test_field_type_mismatch_names_the_field() {
        let mut raw = bond_swap_raw([1u8; 32], "RATOM", 1);
        raw.params[0].value = json!(42);
        let err = BondSwapEvent::decode(&raw).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Param {
                index: 0,
                name: "account_id",
                source: ParamError::NotString,
            }
        );

        let mut raw = bond_swap_raw([1u8; 32], "RATOM", 1);
        raw.params[5] = EventParam::new("u8", json!(256));
        assert!(matches!(
            BondSwapEvent::decode(&raw).unwrap_err(),
            DecodeError::Param {
                index: 5,
                source: ParamError::OutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_other_events_do_not_match() {
        let mut raw = bond_swap_raw([1u8; 32], "RATOM", 1);
        raw.event_id = "LiquidityBond".into();
        assert!(!BondSwapEvent::matches(&raw));
        assert!(matches!(
            BondSwapEvent::decode(&raw),
            Err(DecodeError::WrongEvent { .. })
        ));
    }
}
