//! TxForge
//!
//! Recipe-driven Bitcoin transaction construction: a polymorphic builder
//! family turns a funding target and an output recipe into a fully signed,
//! broadcast-ready transaction, funded from a wallet's unspent-output set
//! without double-allocating outputs across concurrent builds.
//!
//! # Modules
//!
//! - `allocator`: unspent-output selection and the shared pending set
//! - `builders`: the `TxBuilder` contract and its eight recipe variants
//! - `classifier`: output script shape detection and transaction labeling
//! - `config`: TOML-backed funding parameters
//! - `error`: the `BuilderError` hierarchy
//! - `logging`: `log`-facade setup
//! - `outputs`: locking-script strategies, including multisig data chunking
//! - `signer`: per-input signature-script production
//! - `wallet`: the wallet/node collaborator trait and key handles
//!
//! # Security Considerations
//!
//! Private keys enter the core only as opaque [`wallet::KeyHandle`] values,
//! flow to the signer, and are never persisted or logged. The pending set
//! deliberately never releases a reservation: a failed build sacrifices its
//! inputs for the process lifetime rather than risking a double spend.

/// UTXO selection and reservation
pub mod allocator;

/// Transaction builder variants and their shared contract
pub mod builders;

/// Output script classification
pub mod classifier;

/// Configuration management
pub mod config;

/// Standardized error handling
pub mod error;

/// Logging setup
pub mod logging;

/// Output script strategies
pub mod outputs;

/// Signature-script production
pub mod signer;

/// Wallet/node collaborator interface
pub mod wallet;

/// Re-export allocator types
pub use allocator::{FundingSlot, PendingSet, SelectionMode};

/// Re-export the builder family
pub use builders::{
    send, tx_hex, BuilderParams, BulletinBuilder, DustBuilder, FanOutBuilder, MultiSigBuilder,
    NullDataBuilder, PubKeyHashBuilder, SendToAddrBuilder, SigHashSingleBuilder, TxBuilder,
};

/// Re-export classification types
pub use classifier::{classify, transaction_kind, ScriptShape};

/// Re-export error types
pub use error::{BuilderError, BuilderResult};

/// Re-export output strategy types
pub use outputs::{slot_matrix, SlotMatrix};

/// Re-export signing types
pub use signer::SigHashFlavor;

/// Re-export wallet collaborator types
pub use wallet::{KeyHandle, UnspentOutput, WalletRpc};

// Re-export important Bitcoin types for convenience
pub use bitcoin::{Address, Amount, Network, OutPoint, Transaction, Txid};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
