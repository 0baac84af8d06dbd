#![allow(clippy::unwrap_used)]

use crate::chain::{Balance, BlockHeight, ChainClient, ChainError};
use crate::events::{EXECUTE_BOND_AND_SWAP_EVENT, RTOKEN_SERIES_MODULE};
use crate::progress::{ProgressError, ProgressStore};
use async_trait::async_trait;
use sdrop_sdk::objects::{AccountId, EventParam, RawEvent};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Build a well-formed `ExecuteBondAndSwap` raw event.
pub fn bond_swap_raw(account: [u8; 32], symbol: &str, amount: u128) -> RawEvent {
    RawEvent {
        module_id: RTOKEN_SERIES_MODULE.into(),
        event_id: EXECUTE_BOND_AND_SWAP_EVENT.into(),
        params: [
            EventParam::new("AccountId", json!(hex::encode(account))),
            EventParam::new("RSymbol", json!(symbol)),
            EventParam::new("Hash", json!(format!("0x{}", "ab".repeat(32)))),
            EventParam::new("u128", json!(amount.to_string())),
            EventParam::new("Vec<u8>", json!("0x1234")),
            EventParam::new("u8", json!(1)),
        ]
        .into_iter()
        .collect(),
    }
}

pub fn other_raw(module: &str, event: &str) -> RawEvent {
    RawEvent {
        module_id: module.into(),
        event_id: event.into(),
        params: Default::default(),
    }
}

#[derive(Default)]
struct MockState {
    events: HashMap<BlockHeight, Vec<RawEvent>>,
    balances: HashMap<AccountId, Balance>,
    latest_failures: u32,
    event_failures: HashMap<BlockHeight, u32>,
    balance_failures: u32,
    transfer_failures: u32,
    transfer_failures_to: HashMap<AccountId, u32>,
    uncredited_transfers: bool,
    event_queries: Vec<BlockHeight>,
    latest_queries: u32,
    transfers: Vec<(AccountId, Balance)>,
}

/// In-memory chain whose failures can be scripted.
///
/// Accounts without a balance entry report `AccountNotFound`.
#[derive(Default)]
pub struct MockChainClient {
    latest: AtomicU64,
    state: Mutex<MockState>,
}

impl MockChainClient {
    pub fn new(latest: BlockHeight) -> Self {
        let client = Self::default();
        client.set_latest(latest);
        client
    }

    pub fn set_latest(&self, latest: BlockHeight) {
        self.latest.store(latest, Ordering::SeqCst);
    }

    pub fn add_events(&self, height: BlockHeight, events: Vec<RawEvent>) {
        self.state.lock().unwrap().events.insert(height, events);
    }

    pub fn set_balance(&self, account: [u8; 32], balance: Balance) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(AccountId(account), balance);
    }

    pub fn fail_latest(&self, times: u32) {
        self.state.lock().unwrap().latest_failures = times;
    }

    pub fn fail_events_at(&self, height: BlockHeight, times: u32) {
        self.state
            .lock()
            .unwrap()
            .event_failures
            .insert(height, times);
    }

    pub fn fail_balances(&self, times: u32) {
        self.state.lock().unwrap().balance_failures = times;
    }

    pub fn fail_transfers(&self, times: u32) {
        self.state.lock().unwrap().transfer_failures = times;
    }

    pub fn fail_transfers_to(&self, account: [u8; 32], times: u32) {
        self.state
            .lock()
            .unwrap()
            .transfer_failures_to
            .insert(AccountId(account), times);
    }

    /// Accepted transfers no longer show up in the recipient's balance,
    /// as if the node had not applied them yet.
    pub fn leave_transfers_uncredited(&self) {
        self.state.lock().unwrap().uncredited_transfers = true;
    }

    pub fn transfers(&self) -> Vec<(AccountId, Balance)> {
        self.state.lock().unwrap().transfers.clone()
    }

    pub fn event_queries(&self) -> Vec<BlockHeight> {
        self.state.lock().unwrap().event_queries.clone()
    }

    pub fn latest_queries(&self) -> u32 {
        self.state.lock().unwrap().latest_queries
    }
}

fn take_failure(counter: &mut u32) -> bool {
    if *counter > 0 {
        *counter -= 1;
        true
    } else {
        false
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn latest_finalized_height(&self) -> Result<BlockHeight, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.latest_queries += 1;
        if take_failure(&mut state.latest_failures) {
            return Err(ChainError::Transport("connection reset".into()));
        }
        Ok(self.latest.load(Ordering::SeqCst))
    }

    async fn block_events(&self, height: BlockHeight) -> Result<Vec<RawEvent>, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.event_queries.push(height);
        if let Some(remaining) = state.event_failures.get_mut(&height) {
            if take_failure(remaining) {
                return Err(ChainError::Rpc {
                    message: format!("block {height} unavailable"),
                });
            }
        }
        Ok(state.events.get(&height).cloned().unwrap_or_default())
    }

    async fn free_balance(&self, account: &AccountId) -> Result<Balance, ChainError> {
        let mut state = self.state.lock().unwrap();
        if take_failure(&mut state.balance_failures) {
            return Err(ChainError::Transport("timeout".into()));
        }
        state
            .balances
            .get(account)
            .copied()
            .ok_or(ChainError::AccountNotFound(*account))
    }

    async fn transfer(&self, dest: &AccountId, amount: Balance) -> Result<(), ChainError> {
        let mut state = self.state.lock().unwrap();
        let targeted = state
            .transfer_failures_to
            .get_mut(dest)
            .is_some_and(take_failure);
        if targeted || take_failure(&mut state.transfer_failures) {
            return Err(ChainError::TransferRejected("priority too low".into()));
        }
        state.transfers.push((*dest, amount));
        if !state.uncredited_transfers {
            // A funded account is no longer eligible.
            *state.balances.entry(*dest).or_default() += amount;
        }
        Ok(())
    }
}

/// Progress store kept in memory, with scriptable write failures.
#[derive(Default)]
pub struct MemoryProgressStore {
    height: Mutex<Option<BlockHeight>>,
    store_failures: Mutex<u32>,
    history: Mutex<Vec<BlockHeight>>,
}

impl MemoryProgressStore {
    pub fn with_height(height: BlockHeight) -> Self {
        let store = Self::default();
        *store.height.lock().unwrap() = Some(height);
        store
    }

    pub fn fail_stores(&self, times: u32) {
        *self.store_failures.lock().unwrap() = times;
    }

    pub fn height(&self) -> Option<BlockHeight> {
        *self.height.lock().unwrap()
    }

    pub fn history(&self) -> Vec<BlockHeight> {
        self.history.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressStore for MemoryProgressStore {
    async fn load(&self) -> Result<Option<BlockHeight>, ProgressError> {
        Ok(self.height())
    }

    async fn store(&self, height: BlockHeight) -> Result<(), ProgressError> {
        if take_failure(&mut self.store_failures.lock().unwrap()) {
            return Err(ProgressError::Io(std::io::Error::other("disk full")));
        }
        *self.height.lock().unwrap() = Some(height);
        self.history.lock().unwrap().push(height);
        Ok(())
    }
}
