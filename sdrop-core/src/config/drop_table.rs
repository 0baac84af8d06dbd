use super::ConfigError;
use crate::chain::Balance;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sdrop_sdk::config::DropInfo;
use sdrop_sdk::objects::RSymbol;
use std::collections::HashMap;

/// Largest drop amount accepted, in base units (10 whole tokens).
pub const DROP_AMOUNT_CEILING: u128 = 10_000_000_000_000;

/// A validated [`DropInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRule {
    pub min_bond_amount: Decimal,
    pub drop_amount: Balance,
}

impl DropRule {
    /// Whether a bond of `amount` reaches the threshold.
    ///
    /// Amounts too large for a [`Decimal`] are above any configurable
    /// threshold.
    pub fn qualifies(&self, amount: u128) -> bool {
        i128::try_from(amount)
            .ok()
            .and_then(|n| Decimal::try_from_i128_with_scale(n, 0).ok())
            .is_none_or(|amount| amount >= self.min_bond_amount)
    }

    fn validate(symbol: &RSymbol, info: &DropInfo) -> Result<Self, ConfigError> {
        if info.min_bond_amount.is_sign_negative() {
            return Err(ConfigError::NegativeAmount {
                symbol: symbol.clone(),
                field: "min_bond_amount",
                amount: info.min_bond_amount,
            });
        }
        if info.drop_amount.is_sign_negative() {
            return Err(ConfigError::NegativeAmount {
                symbol: symbol.clone(),
                field: "drop_amount",
                amount: info.drop_amount,
            });
        }
        if !info.drop_amount.fract().is_zero() {
            return Err(ConfigError::FractionalDropAmount {
                symbol: symbol.clone(),
                amount: info.drop_amount,
            });
        }

        let too_large = || ConfigError::DropAmountTooLarge {
            symbol: symbol.clone(),
            amount: info.drop_amount,
            ceiling: DROP_AMOUNT_CEILING,
        };
        let drop_amount = info.drop_amount.to_u128().ok_or_else(too_large)?;
        if drop_amount > DROP_AMOUNT_CEILING {
            return Err(too_large());
        }

        Ok(Self {
            min_bond_amount: info.min_bond_amount,
            drop_amount,
        })
    }
}

/// Per-symbol drop rules, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropTable {
    rules: HashMap<RSymbol, DropRule>,
}

impl DropTable {
    /// Validate every entry; the first invalid entry rejects the whole table.
    pub fn from_infos<I>(infos: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (RSymbol, DropInfo)>,
    {
        let rules = infos
            .into_iter()
            .map(|(symbol, info)| {
                let rule = DropRule::validate(&symbol, &info)?;
                Ok((symbol, rule))
            })
            .collect::<Result<HashMap<_, _>, ConfigError>>()?;
        Ok(Self { rules })
    }

    pub fn get(&self, symbol: &RSymbol) -> Option<&DropRule> {
        self.rules.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &RSymbol> {
        self.rules.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(min: i64, drop: i64) -> DropInfo {
        DropInfo {
            min_bond_amount: Decimal::from(min),
            drop_amount: Decimal::from(drop),
        }
    }

    #[test]
    fn test_valid_table() {
        let table = DropTable::from_infos([
            (RSymbol::from("RATOM"), info(1_000_000, 500_000_000_000)),
            (RSymbol::from("RDOT"), info(10_000_000_000, 10_000_000_000_000)),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(&RSymbol::from("RDOT")).unwrap().drop_amount,
            DROP_AMOUNT_CEILING
        );
        assert!(table.get(&RSymbol::from("RETH")).is_none());
    }

    #[test]
    fn test_drop_amount_above_ceiling_rejected() {
        let err = DropTable::from_infos([
            (RSymbol::from("RATOM"), info(1, 500)),
            (RSymbol::from("RFIS"), info(1, 10_000_000_000_001)),
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::DropAmountTooLarge { ref symbol, .. } if symbol.as_str() == "RFIS"
        ));
    }

    #[test]
    fn test_negative_and_fractional_amounts_rejected() {
        assert!(matches!(
            DropTable::from_infos([(RSymbol::from("RATOM"), info(-1, 5))]),
            Err(ConfigError::NegativeAmount {
                field: "min_bond_amount",
                ..
            })
        ));

        let fractional = DropInfo {
            min_bond_amount: Decimal::from(1),
            drop_amount: Decimal::new(15, 1),
        };
        assert!(matches!(
            DropTable::from_infos([(RSymbol::from("RATOM"), fractional)]),
            Err(ConfigError::FractionalDropAmount { .. })
        ));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let rule = DropRule {
            min_bond_amount: Decimal::from(1000),
            drop_amount: 1,
        };
        assert!(!rule.qualifies(999));
        assert!(rule.qualifies(1000));
        assert!(rule.qualifies(u128::MAX));
    }
}
