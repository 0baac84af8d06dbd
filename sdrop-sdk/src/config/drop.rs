use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Drop parameters for one symbol.
///
/// Both amounts are expressed in base units of the respective chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropInfo {
    /// Smallest bonded amount that qualifies for a drop.
    pub min_bond_amount: Decimal,
    /// Amount transferred to a qualifying account.
    pub drop_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amounts_accept_strings_and_numbers() {
        let info: DropInfo = serde_json::from_str(
            r#"{ "min_bond_amount": "1000000", "drop_amount": 500000000000 }"#,
        )
        .unwrap();
        assert_eq!(info.min_bond_amount, Decimal::from_str("1000000").unwrap());
        assert_eq!(info.drop_amount, Decimal::from(500_000_000_000u64));
    }
}
