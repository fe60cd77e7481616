//! Wallet collaborator conditions the builders rely on

use std::sync::Arc;

use bitcoin::{Amount, Network};
use txforge::error::BuilderError;
use txforge::wallet::mock::MockWallet;
use txforge::wallet::WalletRpc;

#[test]
fn wallet_reports_adequate_balance() {
    let wallet = Arc::new(MockWallet::new(Network::Regtest));
    wallet.fund(150_000);
    wallet.fund(50_000);

    let balance = wallet.get_balance().unwrap();
    assert_eq!(balance, Amount::from_sat(200_000));

    // One full builder round must be affordable
    let target = Amount::from_sat(100_000);
    assert!(balance >= target, "not enough funds, {} short", target - balance);
}

#[test]
fn connection_check_follows_node_state() {
    let wallet = MockWallet::new(Network::Regtest);
    assert!(wallet.check_connection().is_ok());

    wallet.set_connected(false);
    let err = wallet.check_connection().unwrap_err();
    assert!(matches!(err, BuilderError::Wallet { .. }));
}

#[test]
fn unknown_address_cannot_be_revealed() {
    let wallet = MockWallet::new(Network::Regtest);
    let other = MockWallet::new(Network::Regtest);
    let foreign = other.get_new_address().unwrap();

    let err = wallet.dump_priv_key(&foreign).unwrap_err();
    assert!(matches!(err, BuilderError::Wallet { .. }));
}

#[test]
fn revealed_key_controls_its_listed_output() {
    let wallet = MockWallet::new(Network::Regtest);
    wallet.fund(42_000);

    let listed = wallet.list_unspent().unwrap();
    assert_eq!(listed.len(), 1);

    let secp = bitcoin::secp256k1::Secp256k1::new();
    let key = wallet.dump_priv_key(&listed[0].address).unwrap();
    let derived = key.address(&secp, Network::Regtest);
    assert_eq!(derived, listed[0].address);
}
