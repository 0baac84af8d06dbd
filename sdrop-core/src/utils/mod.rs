pub mod retry_budget;
pub mod units;
