//! Wallet/node collaborator interface
//!
//! The construction core never talks to a node directly; everything it needs
//! from the funding wallet is expressed through the [`WalletRpc`] trait:
//! listing unspent outputs, revealing the private key behind an owned
//! address, minting fresh receiving addresses, broadcasting, and basic
//! liveness/balance reporting. Implementations wrap an actual RPC client;
//! [`mock::MockWallet`] provides an in-memory stand-in for tests.
//!
//! # Security Considerations
//!
//! Revealed private keys travel through the core only as [`KeyHandle`]
//! values, which never display or serialize their contents. Key material is
//! handed to the signer and dropped; it is never persisted or logged.

use bitcoin::secp256k1::{All, Secp256k1, SecretKey};
use bitcoin::{Address, Amount, Network, OutPoint, PrivateKey, PublicKey, ScriptBuf, Transaction, TxOut, Txid};
use std::fmt;
use std::sync::Arc;

use crate::error::BuilderResult;

pub mod mock;

/// A single unspent transaction output as reported by the wallet
///
/// Immutable once read; the allocator treats the wallet's listing order as
/// the scan order and never reorders candidates.
#[derive(Debug, Clone)]
pub struct UnspentOutput {
    /// Reference to the prior transaction output (txid and vout)
    pub outpoint: OutPoint,
    /// Value held by this output
    pub amount: Amount,
    /// The locking script a spender must satisfy
    pub script_pubkey: ScriptBuf,
    /// The wallet address that controls this output
    pub address: Address,
}

impl UnspentOutput {
    pub fn new(outpoint: OutPoint, amount: Amount, script_pubkey: ScriptBuf, address: Address) -> Self {
        Self {
            outpoint,
            amount,
            script_pubkey,
            address,
        }
    }

    /// Unique identifier for this output, `txid:vout`
    pub fn id(&self) -> String {
        format!("{}:{}", self.outpoint.txid, self.outpoint.vout)
    }

    /// The prior output as a `TxOut`, the form the signer needs
    pub fn tx_out(&self) -> TxOut {
        TxOut {
            value: self.amount.to_sat(),
            script_pubkey: self.script_pubkey.clone(),
        }
    }
}

/// Opaque handle over a revealed private key
///
/// The wrapped key is reachable only by the signer; `Debug` and `Display`
/// are redacted so a handle can appear in diagnostics without leaking
/// material.
#[derive(Clone)]
pub struct KeyHandle {
    inner: PrivateKey,
}

impl KeyHandle {
    pub fn new(key: PrivateKey) -> Self {
        Self { inner: key }
    }

    /// The raw signing key. Only the signer should call this.
    pub fn secret_key(&self) -> SecretKey {
        self.inner.inner
    }

    /// Public key corresponding to this handle
    pub fn public_key(&self, secp: &Secp256k1<All>) -> PublicKey {
        self.inner.public_key(secp)
    }

    /// The pay-to-pubkey-hash address this key controls
    pub fn address(&self, secp: &Secp256k1<All>, network: Network) -> Address {
        Address::p2pkh(&self.inner.public_key(secp), network)
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyHandle([REDACTED])")
    }
}

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Capability set the construction core consumes from the funding wallet
///
/// Implementations must be shareable across builds; all methods may block on
/// network I/O and every failure propagates as
/// [`BuilderError::Wallet`](crate::error::BuilderError::Wallet).
pub trait WalletRpc: Send + Sync {
    /// List the currently unspent outputs for the configured network
    fn list_unspent(&self) -> BuilderResult<Vec<UnspentOutput>>;

    /// Reveal the private key controlling `address`
    fn dump_priv_key(&self, address: &Address) -> BuilderResult<KeyHandle>;

    /// Produce a fresh receiving address
    fn get_new_address(&self) -> BuilderResult<Address>;

    /// Broadcast a fully signed transaction, returning its id
    fn send_raw_transaction(&self, tx: &Transaction) -> BuilderResult<Txid>;

    /// Report the wallet's spendable balance
    fn get_balance(&self) -> BuilderResult<Amount>;

    /// Cheap liveness probe against the node
    fn check_connection(&self) -> BuilderResult<()>;
}

/// Shared handle to a wallet collaborator
pub type WalletHandle = Arc<dyn WalletRpc>;

/// Generate a throwaway key pair for the given network
///
/// Used for multisig slots that should be real, spendable keys rather than
/// payload data.
pub fn new_key_pair(network: Network) -> KeyHandle {
    use rand::RngCore;

    let mut rng = rand::rng();
    let mut buf = [0u8; 32];
    // from_slice rejects the (vanishingly rare) out-of-range scalar
    let secret = loop {
        rng.fill_bytes(&mut buf);
        if let Ok(secret) = SecretKey::from_slice(&buf) {
            break secret;
        }
    };
    KeyHandle::new(PrivateKey::new(secret, network))
}

/// Parse and validate a Bitcoin address against an expected network
pub fn parse_address(address: &str, network: Network) -> BuilderResult<Address> {
    use bitcoin::address::NetworkUnchecked;
    use std::str::FromStr;

    let unchecked = Address::<NetworkUnchecked>::from_str(address).map_err(|e| {
        crate::error::BuilderError::ScriptConstruction(format!("invalid address format: {}", e))
    })?;

    if unchecked.network != network {
        return Err(crate::error::BuilderError::ScriptConstruction(format!(
            "address belongs to {} network, but expected {}",
            unchecked.network, network
        )));
    }

    Ok(unchecked.assume_checked())
}
