//! Dust-only noise transactions

use bitcoin::{Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, BuilderParams, TxBuilder};
use crate::error::{BuilderError, BuilderResult};
use crate::outputs;
use crate::signer::{signature_script, SigHashFlavor};

/// N outputs at exactly the dust threshold, all to one placeholder hash
///
/// No change strategy runs for this recipe; anything the funding output
/// holds above `n * dust + fee` is donated to the fee.
pub struct DustBuilder {
    params: BuilderParams,
    num_outs: u64,
}

impl DustBuilder {
    pub fn new(params: BuilderParams, num_outs: u64) -> Self {
        Self { params, num_outs }
    }
}

impl TxBuilder for DustBuilder {
    fn sat_needed(&self) -> u64 {
        self.num_outs * self.params.dust_amnt + self.params.fee
    }

    fn build(&self) -> BuilderResult<Transaction> {
        if self.num_outs == 0 {
            return Err(BuilderError::ScriptConstruction(
                "zero outputs requested".into(),
            ));
        }

        let slot = allocator::select_at_least(self.sat_needed(), &self.params)?;

        let mut tx = empty_tx();
        tx.input.push(blank_input(slot.outpoint));

        for _ in 0..self.num_outs {
            tx.output.push(TxOut {
                value: self.params.dust_amnt,
                script_pubkey: outputs::dust_marker(),
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
            "==== Dust Transaction ====\nSatNeeded:\t{}\nTxIns:\t1\nTxOuts:\t{}\n",
            self.sat_needed(),
            self.num_outs
        )
    }
}
