//! Drop decision for a single bond event.
//!
//! The decision runs in three stages: a symbol lookup and a threshold check
//! that need no I/O, then a balance lookup on the recipient. An account that
//! already holds funds is not dropped again. The check and the later
//! transfer are not atomic, so a concurrent transfer into the account can
//! slip between them.

use crate::chain::{Balance, ChainClient, ChainError};
use crate::config::{DropRule, DropTable};
use crate::events::BondSwapEvent;
use std::fmt;

/// Why an event does not lead to a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedSymbol,
    BelowThreshold,
    AlreadyFunded { balance: Balance },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedSymbol => write!(f, "unsupported symbol"),
            SkipReason::BelowThreshold => write!(f, "below threshold"),
            SkipReason::AlreadyFunded { balance } => write!(f, "already funded ({balance})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropDecision {
    Skip(SkipReason),
    Drop { amount: Balance },
}

/// Maps bond events to drop decisions using the configured [`DropTable`].
#[derive(Debug, Clone)]
pub struct DropPolicy {
    table: DropTable,
}

impl DropPolicy {
    pub fn new(table: DropTable) -> Self {
        Self { table }
    }

    /// The rule that applies to `event`, if the event passes the symbol and
    /// threshold checks.
    pub fn applicable_rule(&self, event: &BondSwapEvent) -> Result<&DropRule, SkipReason> {
        let rule = self
            .table
            .get(&event.symbol)
            .ok_or(SkipReason::UnsupportedSymbol)?;
        if !rule.qualifies(event.amount) {
            return Err(SkipReason::BelowThreshold);
        }
        Ok(rule)
    }

    /// Final decision once the recipient's balance is known.
    pub fn decide(rule: &DropRule, balance: Balance) -> DropDecision {
        if balance > 0 {
            DropDecision::Skip(SkipReason::AlreadyFunded { balance })
        } else {
            DropDecision::Drop {
                amount: rule.drop_amount,
            }
        }
    }

    /// Evaluate `event`, querying the recipient's balance when needed.
    ///
    /// An account unknown to the chain counts as a zero balance. Any other
    /// lookup failure is returned to the caller.
    pub async fn evaluate<C>(
        &self,
        client: &C,
        event: &BondSwapEvent,
    ) -> Result<DropDecision, ChainError>
    where
        C: ChainClient + ?Sized,
    {
        let rule = match self.applicable_rule(event) {
            Ok(rule) => rule,
            Err(reason) => return Ok(DropDecision::Skip(reason)),
        };

        let balance = match client.free_balance(&event.account_id).await {
            Ok(balance) => balance,
            Err(e) if e.is_account_not_found() => 0,
            Err(e) => return Err(e),
        };

        Ok(Self::decide(rule, balance))
    }
}
