//! Standardized error handling for txforge
//!
//! Every failure a builder can produce is represented here. Errors are
//! returned to the immediate caller of `build()`; nothing in the core retries
//! internally and no partially constructed transaction survives a failure.
//!
//! # Security Considerations
//!
//! - Error messages never contain key material; wallet failures carry a
//!   human-readable context string and the wrapped collaborator error only.

use std::error::Error as StdError;
use thiserror::Error;

/// The main error type for transaction construction
///
/// Allocation, script construction, change handling, and signing each map to
/// a dedicated variant so callers can react to the failure class without
/// string matching.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// No unspent output (or combination of outputs) could fund the request
    #[error("insufficient funds: requested {requested} sat, available {available} sat")]
    InsufficientFunds {
        /// Amount the builder asked the allocator for
        requested: u64,
        /// Total the allocator could see or gather before giving up
        available: u64,
    },

    /// A data payload exceeds the byte capacity of the chosen output scheme
    #[error("payload of {len} bytes exceeds the {max} byte capacity")]
    PayloadTooLarge { len: usize, max: usize },

    /// Change would be non-zero but unspendable
    ///
    /// Only surfaced by builders that treat missing change as fatal; the
    /// default change policy silently donates sub-dust change to the fee.
    #[error("change of {change} sat is below the dust threshold of {dust} sat")]
    ChangeBelowDust { change: u64, dust: u64 },

    /// A recipe's parameters cannot be encoded as output scripts
    #[error("script construction failed: {0}")]
    ScriptConstruction(String),

    /// A signature script could not be produced for a selected input
    #[error("signing failed: {0}")]
    Signing(String),

    /// Wallet/node RPC failure, wrapped with context
    #[error("wallet error: {context}")]
    Wallet {
        context: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Configuration errors
    #[error("configuration error: {context}")]
    Config {
        context: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

/// Create a new wallet error with context
pub fn wallet_error<S: Into<String>>(context: S) -> BuilderError {
    BuilderError::Wallet {
        context: context.into(),
        source: None,
    }
}

/// Create a new wallet error with context and source
pub fn wallet_error_with_source<S: Into<String>, E: StdError + Send + Sync + 'static>(
    context: S,
    source: E,
) -> BuilderError {
    BuilderError::Wallet {
        context: context.into(),
        source: Some(Box::new(source)),
    }
}

/// Create a new configuration error with context
pub fn config_error<S: Into<String>>(context: S) -> BuilderError {
    BuilderError::Config {
        context: context.into(),
        source: None,
    }
}

/// Create a new configuration error with context and source
pub fn config_error_with_source<S: Into<String>, E: StdError + Send + Sync + 'static>(
    context: S,
    source: E,
) -> BuilderError {
    BuilderError::Config {
        context: context.into(),
        source: Some(Box::new(source)),
    }
}

impl From<toml::de::Error> for BuilderError {
    fn from(err: toml::de::Error) -> Self {
        config_error_with_source("TOML deserialization error", err)
    }
}

impl From<std::io::Error> for BuilderError {
    fn from(err: std::io::Error) -> Self {
        BuilderError::Config {
            context: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Type alias for a Result with BuilderError
pub type BuilderResult<T> = Result<T, BuilderError>;
