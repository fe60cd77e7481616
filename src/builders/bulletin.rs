//! Bulletin transactions: a byte payload hidden in plain sight
//!
//! The payload is chunked into pseudo-public-key slots and spread across
//! 1-of-3 bare multisig outputs, each carrying a small burn amount. To a
//! casual observer the result is an ordinary multisig transaction; the data
//! never touches a null-data output.

use bitcoin::{Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, make_change, BuilderParams, TxBuilder};
use crate::error::{BuilderError, BuilderResult};
use crate::outputs::{self, SlotMatrix};
use crate::signer::{signature_script, SigHashFlavor};

/// Spending threshold for bulletin outputs; the slots are data, not keys
const BULLETIN_M: u64 = 1;

/// Data-embedding builder over pure payload slot matrices
pub struct BulletinBuilder {
    params: BuilderParams,
    matrix: SlotMatrix,
    /// Satoshi put behind each data-carrying output
    burn_amnt: u64,
}

impl BulletinBuilder {
    /// Chunk `payload` for embedding; `burn_amnt` funds each data output
    pub fn new(params: BuilderParams, payload: &[u8], burn_amnt: u64) -> Self {
        Self {
            params,
            matrix: outputs::slot_matrix(payload, &[]),
            burn_amnt,
        }
    }

    /// Number of data-carrying outputs this bulletin needs
    pub fn num_outs(&self) -> usize {
        self.matrix.len()
    }
}

impl TxBuilder for BulletinBuilder {
    fn sat_needed(&self) -> u64 {
        self.matrix.len() as u64 * self.burn_amnt + self.params.fee
    }

    fn build(&self) -> BuilderResult<Transaction> {
        if self.matrix.is_empty() {
            return Err(BuilderError::ScriptConstruction("empty payload".into()));
        }

        let slot = allocator::select_at_least(self.sat_needed(), &self.params)?;

        let mut tx = empty_tx();

        for row in self.matrix.rows() {
            let script = outputs::multisig_script(BULLETIN_M, row)?;
            tx.output.push(TxOut {
                value: self.burn_amnt,
                script_pubkey: script,
            });
        }

        tx.input.push(blank_input(slot.outpoint));

        let change = slot.value() - self.sat_needed();
        if let Some(change_out) = make_change(change, &self.params)? {
            tx.output.push(change_out);
        }

        let script_sig = signature_script(
            &tx,
            0,
            &slot.prev_out.script_pubkey,
            SigHashFlavor::All,
            &slot.key,
        )?;
        tx.input[0].script_sig = script_sig;

        Ok(tx)
    }

    fn summarize(&self) -> String {
        format!(
            "==== Bulletin ====\nSatNeeded:\t{}\nTxIns:\t1\nTxOuts:\t{}\nLenData:\t{}\n",
            self.sat_needed(),
            self.num_outs(),
            self.matrix.consumed()
        )
    }
}
