/// Consecutive-failure allowance of the polling loop.
///
/// Every failure consumes one retry; any success restores the full limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    limit: u32,
    remaining: u32,
}

impl RetryBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Record a failure. Returns `true` once the budget is used up.
    pub fn consume(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.is_exhausted()
    }

    pub fn reset(&mut self) {
        self.remaining = self.limit;
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}
