//! Transaction builders
//!
//! Each builder variant is one recipe: it knows the outputs it wants to
//! create and delegates funding to the allocator, script construction to the
//! output strategies, and unlocking-script production to the signer. All
//! variants satisfy the same four-operation [`TxBuilder`] contract, so
//! callers (and the fan-out builder, which funds other builders) can treat
//! them uniformly.

use bitcoin::absolute::LockTime;
use bitcoin::{Address, Network, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use std::sync::Arc;

use crate::allocator::PendingSet;
use crate::error::BuilderResult;
use crate::outputs;
use crate::wallet::{WalletHandle, WalletRpc};

pub mod bulletin;
pub mod dust;
pub mod fanout;
pub mod multisig;
pub mod nulldata;
pub mod pubkeyhash;
pub mod send_to_addr;
pub mod sighash_single;

pub use bulletin::BulletinBuilder;
pub use dust::DustBuilder;
pub use fanout::FanOutBuilder;
pub use multisig::MultiSigBuilder;
pub use nulldata::NullDataBuilder;
pub use pubkeyhash::PubKeyHashBuilder;
pub use send_to_addr::SendToAddrBuilder;
pub use sighash_single::SigHashSingleBuilder;

/// Default flat fee in satoshis
pub const DEFAULT_FEE: u64 = 20_000;

/// Default dust threshold in satoshis
pub const DEFAULT_DUST: u64 = 546;

/// Default target input amount in satoshis
pub const DEFAULT_IN_TARGET: u64 = 100_000;

/// Shared parameters every builder carries
///
/// Fee, dust threshold, and input target are process-wide configuration and
/// read-only during a build. The pending set is the one piece of shared
/// mutable state; cloning the params shares it, which is what keeps
/// concurrent builds from double-spending each other's inputs.
#[derive(Clone)]
pub struct BuilderParams {
    /// Flat fee paid by every transaction, in satoshis
    pub fee: u64,
    /// Minimum economically meaningful output value, in satoshis
    pub dust_amnt: u64,
    /// The target input amount a transaction must be created with
    pub in_target: u64,
    /// Network the builders operate on
    pub network: Network,
    /// Funding wallet collaborator
    pub wallet: WalletHandle,
    /// Outpoints reserved by in-flight builds
    pub pending: PendingSet,
}

impl BuilderParams {
    /// Create parameters with the default fee, dust, and input target
    pub fn new(wallet: Arc<dyn WalletRpc>, network: Network) -> Self {
        Self {
            fee: DEFAULT_FEE,
            dust_amnt: DEFAULT_DUST,
            in_target: DEFAULT_IN_TARGET,
            network,
            wallet,
            pending: PendingSet::new(),
        }
    }

    /// Create parameters from a validated configuration
    pub fn from_config(
        config: &crate::config::Config,
        wallet: Arc<dyn WalletRpc>,
    ) -> BuilderResult<Self> {
        config.validate()?;
        Ok(Self {
            fee: config.funding.fee,
            dust_amnt: config.funding.dust_threshold,
            in_target: config.funding.in_target,
            network: config.network()?,
            wallet,
            pending: PendingSet::new(),
        })
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_dust(mut self, dust_amnt: u64) -> Self {
        self.dust_amnt = dust_amnt;
        self
    }

    pub fn with_in_target(mut self, in_target: u64) -> Self {
        self.in_target = in_target;
        self
    }
}

/// The contract every transaction builder satisfies
pub trait TxBuilder {
    /// Total satoshi cost of the transaction this builder will create,
    /// including the flat fee. Deterministic and side-effect-free.
    fn sat_needed(&self) -> u64;

    /// Allocate funding, construct outputs, handle change, and sign.
    /// On success the returned transaction is broadcast-ready.
    fn build(&self) -> BuilderResult<Transaction>;

    /// Human-readable report of this builder's cost and shape
    fn summarize(&self) -> String;

    /// Forward a message to the shared logger
    fn log(&self, msg: &str) {
        log::info!(target: "txforge::builders", "{}", msg);
    }
}

/// A fresh draft transaction: version 1, no lock time, empty lists
pub fn empty_tx() -> Transaction {
    Transaction {
        version: 1,
        lock_time: LockTime::ZERO,
        input: Vec::new(),
        output: Vec::new(),
    }
}

/// An unsigned input spending `outpoint`
pub fn blank_input(outpoint: OutPoint) -> TxIn {
    TxIn {
        previous_output: outpoint,
        script_sig: ScriptBuf::new(),
        sequence: Sequence::MAX,
        witness: Witness::default(),
    }
}

/// Apply the change policy with a freshly generated wallet address
///
/// Asks the wallet for an address only when the change is actually worth
/// keeping, so sub-dust donations don't burn an address.
pub fn make_change(change: u64, params: &BuilderParams) -> BuilderResult<Option<TxOut>> {
    if change < params.dust_amnt {
        return Ok(None);
    }
    let addr: Address = params.wallet.get_new_address()?;
    Ok(outputs::change_output(change, params.dust_amnt, &addr))
}

/// Sum of a transaction's output values, in satoshis
pub fn sum_outputs(tx: &Transaction) -> u64 {
    tx.output.iter().map(|txout| txout.value).sum()
}

/// Hex encoding of the consensus-serialized transaction
pub fn tx_hex(tx: &Transaction) -> String {
    hex::encode(bitcoin::consensus::encode::serialize(tx))
}

/// Build and broadcast in one step
///
/// Logs the raw transaction before handing it to the wallet; every failure
/// propagates to the caller rather than terminating the process.
pub fn send(builder: &dyn TxBuilder, params: &BuilderParams) -> BuilderResult<Txid> {
    let tx = builder.build()?;
    builder.log(&format!("raw transaction: {}", tx_hex(&tx)));
    params.wallet.send_raw_transaction(&tx)
}
