//! Funding allocation over the wallet's unspent-output set
//!
//! Builders never pick their own inputs; they ask this module for funding in
//! one of three ways:
//!
//! - [`select_exact`]: the first unreserved output worth exactly the target,
//!   for recipes spending a previously fanned-out denomination.
//! - [`select_at_least`]: the first unreserved output worth at least the
//!   target, for recipes where change absorbs the excess.
//! - [`compose`]: repeated fractional threshold picks until the accumulated
//!   total covers the target, for payouts too large for one output.
//!
//! Candidates are scanned in the order the wallet reports them; the first
//! qualifying, unreserved candidate wins. No minimal-waste search is
//! attempted.
//!
//! Every selected output is reserved in the shared [`PendingSet`] in the same
//! atomic step that claims it, so two concurrent builds can never spend the
//! same outpoint. There is no unreservation path: a failed build leaves its
//! reservations in place for the remainder of the process lifetime, and a
//! caller that wants those funds back must re-derive state from a fresh
//! wallet query in a new process.

use bitcoin::{OutPoint, TxOut};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::builders::BuilderParams;
use crate::error::{BuilderError, BuilderResult};
use crate::wallet::KeyHandle;

/// Divisor applied to a composed target when picking fractional inputs
pub const COMPOSE_FAN_FACTOR: u64 = 20;

/// Attempt ceiling for a composed allocation
pub const MAX_COMPOSE_INPUTS: usize = 50;

/// Process-wide set of outpoints reserved by in-flight builds
///
/// Cloning the handle shares the underlying set; every builder created from
/// one parameter set sees the same reservations.
#[derive(Clone, Default)]
pub struct PendingSet {
    inner: Arc<Mutex<HashSet<OutPoint>>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically reserve `outpoint` if it is not already reserved
    ///
    /// Returns false when another build holds the reservation.
    pub fn try_reserve(&self, outpoint: OutPoint) -> bool {
        let mut set = self.inner.lock().expect("pending set lock poisoned");
        set.insert(outpoint)
    }

    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        let set = self.inner.lock().expect("pending set lock poisoned");
        set.contains(outpoint)
    }

    pub fn len(&self) -> usize {
        let set = self.inner.lock().expect("pending set lock poisoned");
        set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything needed to spend one selected unspent output
///
/// The prior output supplies the locking script the signature must satisfy;
/// the key handle is the credential revealed by the wallet for that output's
/// address.
#[derive(Debug, Clone)]
pub struct FundingSlot {
    /// Reference to the prior output being spent
    pub outpoint: OutPoint,
    /// The prior output itself (value + locking script)
    pub prev_out: TxOut,
    /// Private key controlling the prior output
    pub key: KeyHandle,
}

impl FundingSlot {
    /// Value this slot contributes, in satoshis
    pub fn value(&self) -> u64 {
        self.prev_out.value
    }
}

/// How a single-output selection matches candidates against the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Candidate value must equal the target exactly
    Exact,
    /// Candidate value must meet or exceed the target
    AtLeast,
}

fn pick(mode: SelectionMode, target: u64, params: &BuilderParams) -> BuilderResult<FundingSlot> {
    let list = params.wallet.list_unspent().map_err(|err| {
        log::warn!(target: "txforge::allocator", "listunspent failed: {}", err);
        err
    })?;
    if list.is_empty() {
        return Err(BuilderError::InsufficientFunds {
            requested: target,
            available: 0,
        });
    }

    let mut available = 0u64;
    for entry in &list {
        if params.pending.contains(&entry.outpoint) {
            continue;
        }
        let value = entry.amount.to_sat();
        available += value;

        let qualifies = match mode {
            SelectionMode::Exact => value == target,
            SelectionMode::AtLeast => value >= target,
        };
        if !qualifies {
            continue;
        }
        // Claim it. Losing the race means another build took this outpoint
        // between our scan and now; move on to the next candidate.
        if !params.pending.try_reserve(entry.outpoint) {
            continue;
        }

        // Reservation stays even if the reveal fails; see module docs.
        let key = params.wallet.dump_priv_key(&entry.address)?;
        return Ok(FundingSlot {
            outpoint: entry.outpoint,
            prev_out: entry.tx_out(),
            key,
        });
    }

    Err(BuilderError::InsufficientFunds {
        requested: target,
        available,
    })
}

/// Select an unreserved unspent output worth exactly `target` satoshis
pub fn select_exact(target: u64, params: &BuilderParams) -> BuilderResult<FundingSlot> {
    pick(SelectionMode::Exact, target, params)
}

/// Select an unreserved unspent output worth at least `min` satoshis
pub fn select_at_least(min: u64, params: &BuilderParams) -> BuilderResult<FundingSlot> {
    pick(SelectionMode::AtLeast, min, params)
}

/// Gather funding slots until their total covers `min` satoshis
///
/// Each pick targets `min / COMPOSE_FAN_FACTOR`, so large requests are
/// assembled from mid-sized outputs. Fails after [`MAX_COMPOSE_INPUTS`]
/// attempts with the totals gathered so far; slots reserved by a failed
/// composition remain reserved.
pub fn compose(min: u64, params: &BuilderParams) -> BuilderResult<(Vec<FundingSlot>, u64)> {
    let fraction = min / COMPOSE_FAN_FACTOR;
    let mut slots = Vec::new();
    let mut total = 0u64;

    for _ in 0..MAX_COMPOSE_INPUTS {
        let slot = select_at_least(fraction, params)?;
        total += slot.value();
        slots.push(slot);
        if total >= min {
            return Ok((slots, total));
        }
    }

    Err(BuilderError::InsufficientFunds {
        requested: min,
        available: total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use bitcoin::Txid;

    fn outpoint(n: u8) -> OutPoint {
        OutPoint::new(Txid::from_byte_array([n; 32]), 0)
    }

    #[test]
    fn reserve_is_idempotent_exclusion() {
        let pending = PendingSet::new();
        assert!(pending.try_reserve(outpoint(1)));
        assert!(!pending.try_reserve(outpoint(1)));
        assert!(pending.contains(&outpoint(1)));
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn clones_share_reservations() {
        let pending = PendingSet::new();
        let other = pending.clone();
        assert!(pending.try_reserve(outpoint(7)));
        assert!(!other.try_reserve(outpoint(7)));
    }

    #[test]
    fn concurrent_reservation_admits_exactly_one() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::thread;

        let pending = PendingSet::new();
        let wins = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pending = pending.clone();
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    if pending.try_reserve(outpoint(42)) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(wins.load(Ordering::SeqCst), 1);
    }
}
