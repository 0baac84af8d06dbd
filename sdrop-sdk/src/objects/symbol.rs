use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a liquid-staking asset (e.g. `RATOM`, `RDOT`).
///
/// Used as the key of the per-symbol drop table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RSymbol(CompactString);

impl RSymbol {
    pub fn new(symbol: impl Into<CompactString>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for RSymbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for RSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
