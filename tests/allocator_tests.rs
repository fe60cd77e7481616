//! Funding allocator behavior against the mock wallet

use std::sync::Arc;

use bitcoin::Network;
use txforge::allocator::{compose, select_at_least, select_exact};
use txforge::builders::BuilderParams;
use txforge::error::BuilderError;
use txforge::wallet::mock::MockWallet;

fn setup() -> (Arc<MockWallet>, BuilderParams) {
    let wallet = Arc::new(MockWallet::new(Network::Regtest));
    let params = BuilderParams::new(wallet.clone(), Network::Regtest);
    (wallet, params)
}

#[test]
fn exact_selection_skips_larger_outputs() {
    let (wallet, params) = setup();
    wallet.fund(50_000);
    wallet.fund(100_000);

    let slot = select_exact(100_000, &params).unwrap();
    assert_eq!(slot.value(), 100_000);
    // Only the matching output was reserved
    assert_eq!(params.pending.len(), 1);
    assert!(params.pending.contains(&slot.outpoint));
}

#[test]
fn exact_selection_misses_report_availability() {
    let (wallet, params) = setup();
    wallet.fund(50_000);
    wallet.fund(100_000);

    match select_exact(75_000, &params).unwrap_err() {
        BuilderError::InsufficientFunds { requested, available } => {
            assert_eq!(requested, 75_000);
            assert_eq!(available, 150_000);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }
    assert!(params.pending.is_empty());
}

#[test]
fn threshold_selection_takes_first_qualifying_in_wallet_order() {
    let (wallet, params) = setup();
    let small = wallet.fund(50_000);
    wallet.fund(100_000);

    // No best-fit search: the 50k comes first and qualifies
    let slot = select_at_least(30_000, &params).unwrap();
    assert_eq!(slot.outpoint, small);
    assert_eq!(slot.value(), 50_000);
}

#[test]
fn empty_wallet_is_insufficient_funds() {
    let (_wallet, params) = setup();
    match select_at_least(1, &params).unwrap_err() {
        BuilderError::InsufficientFunds { requested, available } => {
            assert_eq!(requested, 1);
            assert_eq!(available, 0);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }
}

#[test]
fn compose_gathers_fractional_inputs() {
    let (wallet, params) = setup();
    for _ in 0..5 {
        wallet.fund(40_000);
    }

    let (slots, total) = compose(100_000, &params).unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(total, 120_000);
    assert_eq!(params.pending.len(), 3);
}

#[test]
fn failed_composition_keeps_partial_reservations() {
    let (wallet, params) = setup();
    // Each qualifies for the fractional target but the pool can never
    // reach the full amount
    for _ in 0..3 {
        wallet.fund(10_000);
    }

    let err = compose(100_000, &params).unwrap_err();
    assert!(matches!(err, BuilderError::InsufficientFunds { .. }));
    // The three gathered outputs stay reserved with no release path
    assert_eq!(params.pending.len(), 3);
}

#[test]
fn parallel_selections_never_share_an_output() {
    use std::collections::HashSet;
    use std::thread;

    let (wallet, params) = setup();
    for _ in 0..4 {
        wallet.fund(60_000);
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let params = params.clone();
            thread::spawn(move || select_at_least(50_000, &params).map(|slot| slot.outpoint))
        })
        .collect();

    let mut picked = HashSet::new();
    let mut successes = 0;
    for handle in handles {
        if let Ok(outpoint) = handle.join().unwrap() {
            successes += 1;
            assert!(picked.insert(outpoint), "outpoint selected twice");
        }
    }
    assert_eq!(successes, 4);
}
