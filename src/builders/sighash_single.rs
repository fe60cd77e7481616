//! Single-output sighash demonstration
//!
//! The input signature commits only to the output sharing its index, so the
//! second "blank" output stays mutable after signing. The build mutates it
//! on purpose to exercise exactly that protocol property; the change output
//! at index 0 is what the signature actually protects.

use bitcoin::{Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, BuilderParams, TxBuilder};
use crate::error::{BuilderError, BuilderResult};
use crate::outputs;
use crate::signer::{signature_script, SigHashFlavor, SECP};

/// Two outputs, one signed commitment, one deliberately permutable
pub struct SigHashSingleBuilder {
    params: BuilderParams,
}

impl SigHashSingleBuilder {
    pub fn new(params: BuilderParams) -> Self {
        Self { params }
    }
}

impl TxBuilder for SigHashSingleBuilder {
    fn sat_needed(&self) -> u64 {
        self.params.in_target
    }

    fn build(&self) -> BuilderResult<Transaction> {
        // Over-fund so the committed change output clears the dust bar
        let slot =
            allocator::select_at_least(self.sat_needed() + self.params.dust_amnt, &self.params)?;

        let change_val = slot.value() - self.sat_needed();
        // Change goes back to the funding key's own address
        let change_addr = slot.key.address(&SECP, self.params.network);
        let change_out = outputs::change_output(change_val, self.params.dust_amnt, &change_addr)
            .ok_or(BuilderError::ChangeBelowDust {
                change: change_val,
                dust: self.params.dust_amnt,
            })?;

        // Blank permutable txout for users to play with
        let blank_val = self.params.in_target - self.params.fee;
        let blank = TxOut {
            value: blank_val,
            script_pubkey: change_out.script_pubkey.clone(),
        };

        let mut tx = empty_tx();
        tx.input.push(blank_input(slot.outpoint));
        tx.output.push(change_out);
        tx.output.push(blank);

        let script_sig = signature_script(
            &tx,
            0,
            &slot.prev_out.script_pubkey,
            SigHashFlavor::Single,
            &slot.key,
        )?;
        tx.input[0].script_sig = script_sig;

        // Permute the uncommitted output after signing; the signature on
        // input 0 only covers output 0 and stays valid.
        tx.output[1].value = blank_val + 1;

        Ok(tx)
    }

    fn summarize(&self) -> String {
        format!(
            "==== SigHashSingle ====\nSatNeeded:\t{}\nTxIns:\t1\nTxOuts:\t2\n",
            self.sat_needed()
        )
    }
}
