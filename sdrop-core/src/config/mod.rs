//! Validated runtime configuration.
//!
//! Raw values come from [`sdrop_sdk::config`]; this module checks them once
//! at startup and turns them into the forms the processors use.

mod drop_table;

pub use drop_table::{DROP_AMOUNT_CEILING, DropRule, DropTable};

use rust_decimal::Decimal;
use sdrop_sdk::config::ListenerConfig;
use sdrop_sdk::objects::RSymbol;
use thiserror::Error;

/// Errors that can occur while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("drop amount {amount} for {symbol} exceeds the ceiling of {ceiling}")]
    DropAmountTooLarge {
        symbol: RSymbol,
        amount: Decimal,
        ceiling: u128,
    },

    #[error("{field} for {symbol} must not be negative, got {amount}")]
    NegativeAmount {
        symbol: RSymbol,
        field: &'static str,
        amount: Decimal,
    },

    #[error("drop amount {amount} for {symbol} must be a whole number of base units")]
    FractionalDropAmount { symbol: RSymbol, amount: Decimal },

    #[error("retry limit must be at least 1")]
    ZeroRetryLimit,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// Check the polling parameters.
pub fn validate_listener(config: &ListenerConfig) -> Result<(), ConfigError> {
    if config.retry_limit == 0 {
        return Err(ConfigError::ZeroRetryLimit);
    }
    if config.poll_interval.is_zero() {
        return Err(ConfigError::ZeroPollInterval);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_listener_validation() {
        assert_eq!(validate_listener(&ListenerConfig::default()), Ok(()));

        let config = ListenerConfig {
            retry_limit: 0,
            ..ListenerConfig::default()
        };
        assert_eq!(validate_listener(&config), Err(ConfigError::ZeroRetryLimit));

        let config = ListenerConfig {
            poll_interval: Duration::ZERO,
            ..ListenerConfig::default()
        };
        assert_eq!(
            validate_listener(&config),
            Err(ConfigError::ZeroPollInterval)
        );
    }
}
