//! Configuration value types.
//!
//! These types carry already-parsed configuration. Loading and validation
//! live in `sdrop-core` and `sdrop-server`.

mod drop;
mod listener;

pub use drop::DropInfo;
pub use listener::ListenerConfig;
