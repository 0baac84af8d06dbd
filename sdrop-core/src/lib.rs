#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod config;
pub mod events;
pub mod processors;
pub mod progress;
pub mod service;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
