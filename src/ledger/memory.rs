//! In-memory ledger host
//!
//! This module provides `MemoryLedger`, a single-node stand-in for the
//! replicated ledger the contract runs on, and `TxContext`, the per-transaction
//! view handed to the contract through [`LedgerStub`].
//!
//! # Transactions
//!
//! - reads observe committed state only, never the transaction's own writes
//! - writes and the single event are buffered in the `TxContext`
//! - an error response discards the buffer
//! - commit re-validates every point read and range scan under the commit
//!   lock; a stale read fails the transaction and nothing is applied
//!
//! # Thread Safety
//!
//! World state, history and the peer table live in `DashMap`s, so one
//! `MemoryLedger` can be shared across threads behind an `Arc`. Transactions
//! may be prepared concurrently; commits are serialized.
//!
//! # Determinism
//!
//! Transaction ids are `tx000001`, `tx000002`, ... and a transaction's
//! timestamp is the genesis time plus its sequence number, so two replays of
//! the same invocations produce identical ids, timestamps and histories.

use crate::core::traits::{Chaincode, LedgerStub, PeerContract};
use crate::types::{ChaincodeEvent, ContractError, Identity, KeyModification, Response, StateEntry};
use dashmap::DashMap;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

/// Genesis time used when none is configured (2020-09-13T12:26:40Z)
pub const DEFAULT_GENESIS_TIME: i64 = 1_600_000_000;

/// A committed value and the sequence number of the transaction that wrote it
#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionedValue {
    value: Vec<u8>,
    version: u64,
}

/// Keys and versions a range scan observed
#[derive(Debug, Clone)]
struct RangeRead {
    start: String,
    end: String,
    observed: Vec<(String, u64)>,
}

/// Outcome of one invocation as seen by the submitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tx_id: String,
    pub response: Response,

    /// Event published by the transaction; only set if it committed
    pub event: Option<ChaincodeEvent>,
}

/// In-memory ledger with MVCC commit validation
pub struct MemoryLedger {
    state: DashMap<String, VersionedValue>,

    /// Modification history per key, oldest first
    history: DashMap<String, Vec<KeyModification>>,

    /// Peer contracts keyed by `<name>/<channel>`
    peers: DashMap<String, Arc<dyn PeerContract>>,

    sequence: AtomicU64,
    genesis_time: i64,
    commit_lock: Mutex<()>,
}

impl MemoryLedger {
    /// Create an empty ledger starting at [`DEFAULT_GENESIS_TIME`]
    pub fn new() -> Self {
        Self::with_genesis_time(DEFAULT_GENESIS_TIME)
    }

    /// Create an empty ledger whose first transaction is stamped `genesis_time + 1`
    pub fn with_genesis_time(genesis_time: i64) -> Self {
        MemoryLedger {
            state: DashMap::new(),
            history: DashMap::new(),
            peers: DashMap::new(),
            sequence: AtomicU64::new(0),
            genesis_time,
            commit_lock: Mutex::new(()),
        }
    }

    /// Make `peer` reachable as contract `name` on `channel`
    pub fn register_peer(&self, name: &str, channel: &str, peer: Arc<dyn PeerContract>) {
        debug!(name, channel, "registering peer contract");
        self.peers.insert(peer_address(name, channel), peer);
    }

    /// Committed value of `key`
    pub fn state(&self, key: &str) -> Option<Vec<u8>> {
        self.state.get(key).map(|entry| entry.value.clone())
    }

    /// Number of committed keys
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Start a transaction submitted by `creator`
    ///
    /// Every call consumes a sequence number, whether or not the transaction
    /// ends up committed.
    pub fn begin(&self, creator: &str, function: &str, args: &[String]) -> TxContext<'_> {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        TxContext {
            ledger: self,
            sequence,
            tx_id: format!("tx{:06}", sequence),
            timestamp: self.genesis_time + sequence as i64,
            creator: Identity::new(creator),
            function: function.to_string(),
            args: args.to_vec(),
            reads: RefCell::new(BTreeMap::new()),
            ranges: RefCell::new(Vec::new()),
            writes: BTreeMap::new(),
            event: None,
        }
    }

    /// Validate a transaction's reads and apply its writes
    ///
    /// # Returns
    ///
    /// The event the transaction published, if any
    ///
    /// # Errors
    ///
    /// - `ReadConflict` if a key read by the transaction has changed
    /// - `PhantomRead` if a range scanned by the transaction has changed
    pub fn commit(&self, tx: TxContext<'_>) -> Result<Option<ChaincodeEvent>, ContractError> {
        let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

        for (key, observed) in tx.reads.borrow().iter() {
            let current = self.state.get(key).map(|entry| entry.version);
            if current != *observed {
                return Err(ContractError::ReadConflict { key: key.clone() });
            }
        }

        for range in tx.ranges.borrow().iter() {
            let current: Vec<(String, u64)> = self
                .scan(&range.start, &range.end)
                .into_iter()
                .map(|(key, value)| (key, value.version))
                .collect();
            if current != range.observed {
                return Err(ContractError::PhantomRead {
                    start: range.start.clone(),
                });
            }
        }

        for (key, value) in tx.writes {
            self.history
                .entry(key.clone())
                .or_default()
                .push(KeyModification {
                    tx_id: tx.tx_id.clone(),
                    payload: value.clone(),
                    time: tx.timestamp,
                    is_delete: false,
                });
            self.state.insert(
                key,
                VersionedValue {
                    value,
                    version: tx.sequence,
                },
            );
        }

        debug!(tx_id = %tx.tx_id, "transaction committed");
        Ok(tx.event)
    }

    /// Instantiate `chaincode` in one transaction
    pub fn init(&self, chaincode: &dyn Chaincode, creator: &str, args: &[String]) -> Invocation {
        let mut tx = self.begin(creator, "init", args);
        let response = chaincode.init(&mut tx);
        self.finish(tx, response)
    }

    /// Run one invocation of `chaincode` in its own transaction
    pub fn invoke(
        &self,
        chaincode: &dyn Chaincode,
        creator: &str,
        function: &str,
        args: &[String],
    ) -> Invocation {
        let mut tx = self.begin(creator, function, args);
        let response = chaincode.invoke(&mut tx);
        self.finish(tx, response)
    }

    /// Commit on success, discard on failure
    fn finish(&self, tx: TxContext<'_>, response: Response) -> Invocation {
        let tx_id = tx.tx_id.clone();
        if !response.is_ok() {
            return Invocation {
                tx_id,
                response,
                event: None,
            };
        }

        match self.commit(tx) {
            Ok(event) => Invocation {
                tx_id,
                response,
                event,
            },
            Err(e) => {
                warn!(tx_id = %tx_id, error = %e, "transaction invalidated at commit");
                Invocation {
                    tx_id,
                    response: Response::error(e.to_string()),
                    event: None,
                }
            }
        }
    }

    /// Committed entries in `[start, end)`, in key order
    fn scan(&self, start: &str, end: &str) -> Vec<(String, VersionedValue)> {
        let mut entries: Vec<(String, VersionedValue)> = self
            .state
            .iter()
            .filter(|entry| entry.key().as_str() >= start && entry.key().as_str() < end)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn peer_address(name: &str, channel: &str) -> String {
    format!("{}/{}", name, channel)
}

/// One transaction's view of a [`MemoryLedger`]
pub struct TxContext<'l> {
    ledger: &'l MemoryLedger,
    sequence: u64,
    tx_id: String,
    timestamp: i64,
    creator: Identity,
    function: String,
    args: Vec<String>,

    /// Version observed per key read; `None` if the key was absent
    reads: RefCell<BTreeMap<String, Option<u64>>>,
    ranges: RefCell<Vec<RangeRead>>,
    writes: BTreeMap<String, Vec<u8>>,
    event: Option<ChaincodeEvent>,
}

impl LedgerStub for TxContext<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn function(&self) -> &str {
        &self.function
    }

    fn args(&self) -> &[String] {
        &self.args
    }

    fn creator(&self) -> Result<Identity, ContractError> {
        Ok(self.creator.clone())
    }

    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, ContractError> {
        let committed = self.ledger.state.get(key).map(|entry| entry.value().clone());
        self.reads
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| committed.as_ref().map(|value| value.version));
        Ok(committed.map(|value| value.value))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), ContractError> {
        if key.is_empty() {
            return Err(ContractError::ledger("key must not be empty"));
        }
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<StateEntry>, ContractError> {
        let entries = self.ledger.scan(start, end);
        self.ranges.borrow_mut().push(RangeRead {
            start: start.to_string(),
            end: end.to_string(),
            observed: entries
                .iter()
                .map(|(key, value)| (key.clone(), value.version))
                .collect(),
        });
        Ok(entries
            .into_iter()
            .map(|(key, value)| StateEntry {
                key,
                value: value.value,
            })
            .collect())
    }

    fn get_history_for_key(&self, key: &str) -> Result<Vec<KeyModification>, ContractError> {
        Ok(self
            .ledger
            .history
            .get(key)
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    fn invoke_contract(&self, name: &str, args: &[String], channel: &str) -> Response {
        let peer = self
            .ledger
            .peers
            .get(&peer_address(name, channel))
            .map(|entry| Arc::clone(entry.value()));
        match peer {
            Some(peer) => peer.query(args),
            None => Response::error(format!(
                "chaincode {} not found on channel {}",
                name, channel
            )),
        }
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), ContractError> {
        if name.is_empty() {
            return Err(ContractError::ledger("event name must not be empty"));
        }
        self.event = Some(ChaincodeEvent {
            name: name.to_string(),
            payload,
        });
        Ok(())
    }
}
