//! Standard bare multisig outputs from a prepared slot matrix
//!
//! `OP_<m> <slot> <slot> <slot> OP_3 OP_CHECKMULTISIG` per matrix row. The
//! matrix decides which slots are real keys and which are payload chunks;
//! this builder only turns rows into funded, signed outputs.

use bitcoin::{Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, BuilderParams, TxBuilder};
use crate::error::{BuilderError, BuilderResult};
use crate::outputs::{self, SlotMatrix};
use crate::signer::{signature_script, SigHashFlavor};

/// M-of-3 multisig outputs, one per slot-matrix row
///
/// The spending threshold `m` is fixed for the whole builder regardless of
/// how many slots in a given row are real keys.
pub struct MultiSigBuilder {
    params: BuilderParams,
    m: u64,
    matrix: SlotMatrix,
}

impl MultiSigBuilder {
    pub fn new(params: BuilderParams, m: u64, matrix: SlotMatrix) -> Self {
        Self { params, m, matrix }
    }

    fn each_out_val(&self) -> u64 {
        let rows = self.matrix.len() as u64;
        if rows == 0 {
            return 0;
        }
        (self.params.in_target - self.params.fee) / rows
    }
}

impl TxBuilder for MultiSigBuilder {
    fn sat_needed(&self) -> u64 {
        self.params.in_target
    }

    fn build(&self) -> BuilderResult<Transaction> {
        if self.matrix.is_empty() {
            return Err(BuilderError::ScriptConstruction(
                "empty slot matrix".into(),
            ));
        }

        let slot = allocator::select_exact(self.sat_needed(), &self.params)?;

        let mut tx = empty_tx();
        tx.input.push(blank_input(slot.outpoint));

        let each = self.each_out_val();
        for row in self.matrix.rows() {
            let script = outputs::multisig_script(self.m, row)?;
            tx.output.push(TxOut {
                value: each,
                script_pubkey: script,
            });
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
            "==== MultiSig ====\nSatNeeded:\t{}\nTxIns:\t1\nTxOuts:\t{}\nLenData:\t{}\n",
            self.sat_needed(),
            self.matrix.len(),
            self.matrix.consumed()
        )
    }
}
