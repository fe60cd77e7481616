//! Signature-script production for draft transactions
//!
//! Each input is signed independently against its own prior locking script
//! once every output exists. Two sighash flavors are supported: the default
//! all-inputs/all-outputs commitment, and the single-output commitment used
//! by the sighash-single recipe to leave sibling outputs mutable after
//! signing.

use bitcoin::blockdata::script::Builder;
use bitcoin::hashes::Hash;
use bitcoin::script::PushBytesBuf;
use bitcoin::secp256k1::{All, Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{Script, ScriptBuf, Transaction};
use once_cell::sync::Lazy;

use crate::allocator::FundingSlot;
use crate::error::{BuilderError, BuilderResult};
use crate::wallet::KeyHandle;

/// Shared signing context; construction is expensive, reuse is free
pub(crate) static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Which parts of the transaction a signature commits to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigHashFlavor {
    /// Commit to every input and output as currently populated
    All,
    /// Commit to this input and the output at the same index only
    Single,
}

impl SigHashFlavor {
    fn sighash_type(self) -> EcdsaSighashType {
        match self {
            SigHashFlavor::All => EcdsaSighashType::All,
            SigHashFlavor::Single => EcdsaSighashType::Single,
        }
    }
}

/// Compute the unlocking script for one input
///
/// `prev_script` is the locking script of the output being spent; the draft
/// transaction must already carry every output the chosen flavor commits to.
pub fn signature_script(
    tx: &Transaction,
    index: usize,
    prev_script: &Script,
    flavor: SigHashFlavor,
    key: &KeyHandle,
) -> BuilderResult<ScriptBuf> {
    let hash_ty = flavor.sighash_type();
    let sighash = SighashCache::new(tx)
        .legacy_signature_hash(index, prev_script, hash_ty.to_u32())
        .map_err(|e| BuilderError::Signing(format!("sighash for input {}: {}", index, e)))?;

    let message = Message::from_slice(&sighash.to_byte_array())
        .map_err(|e| BuilderError::Signing(format!("sighash message: {}", e)))?;
    let signature = SECP.sign_ecdsa(&message, &key.secret_key());

    let mut sig_bytes = signature.serialize_der().to_vec();
    sig_bytes.push(hash_ty.to_u32() as u8);
    let sig_push = PushBytesBuf::try_from(sig_bytes)
        .map_err(|e| BuilderError::Signing(format!("signature push: {}", e)))?;

    Ok(Builder::new()
        .push_slice(sig_push)
        .push_key(&key.public_key(&SECP))
        .into_script())
}

/// Sign every input with SIGHASH_ALL, in ascending index order
///
/// `slots` must parallel `tx.input`; each input is signed against its own
/// slot's prior locking script.
pub fn sign_inputs(tx: &mut Transaction, slots: &[FundingSlot]) -> BuilderResult<()> {
    if tx.input.len() != slots.len() {
        return Err(BuilderError::Signing(format!(
            "{} inputs but {} funding slots",
            tx.input.len(),
            slots.len()
        )));
    }
    for (index, slot) in slots.iter().enumerate() {
        let script_sig = signature_script(
            tx,
            index,
            &slot.prev_out.script_pubkey,
            SigHashFlavor::All,
            &slot.key,
        )?;
        tx.input[index].script_sig = script_sig;
    }
    Ok(())
}
