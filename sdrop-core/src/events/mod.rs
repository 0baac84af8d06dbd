//! Typed decoding of chain events.
//!
//! Only the events the drop service reacts to are decoded; everything else
//! stays a [`RawEvent`](sdrop_sdk::objects::RawEvent) and is ignored.

pub mod bond_swap;

pub use bond_swap::{
    BondSwapEvent, DecodeError, EXECUTE_BOND_AND_SWAP_EVENT, ParamError, RTOKEN_SERIES_MODULE,
};
