//! Null-data transactions: one OP_RETURN payload carrier

use bitcoin::{Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, BuilderParams, TxBuilder};
use crate::error::{BuilderError, BuilderResult};
use crate::outputs;
use crate::signer::{signature_script, SigHashFlavor};

/// Embeds a small payload behind OP_RETURN, optionally keeping change
///
/// Without change the transaction burns `dust + fee`; with change it spends
/// a full `in_target` input and returns `in_target - fee` to a fresh
/// address. For this recipe missing change is fatal rather than donated.
pub struct NullDataBuilder {
    params: BuilderParams,
    data: Vec<u8>,
    change: bool,
}

impl NullDataBuilder {
    pub fn new(params: BuilderParams, data: Vec<u8>, change: bool) -> Self {
        Self {
            params,
            data,
            change,
        }
    }
}

impl TxBuilder for NullDataBuilder {
    fn sat_needed(&self) -> u64 {
        if self.change {
            self.params.in_target
        } else {
            self.params.dust_amnt + self.params.fee
        }
    }

    fn build(&self) -> BuilderResult<Transaction> {
        let slot = allocator::select_exact(self.sat_needed(), &self.params)?;

        let mut tx = empty_tx();

        tx.output.push(TxOut {
            value: 0,
            script_pubkey: outputs::null_data(&self.data)?,
        });

        if self.change {
            let change_val = self.sat_needed() - self.params.fee;
            let addr = self.params.wallet.get_new_address()?;
            match outputs::change_output(change_val, self.params.dust_amnt, &addr) {
                Some(change_out) => tx.output.push(change_out),
                None => {
                    return Err(BuilderError::ChangeBelowDust {
                        change: change_val,
                        dust: self.params.dust_amnt,
                    })
                }
            }
        }

        tx.input.push(blank_input(slot.outpoint));

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
        let num_outs = if self.change { 2 } else { 1 };
        format!(
            "==== NullData ====\nSatNeeded:\t{}\nTxIns:\t1\nTxOuts:\t{}\nLenData:\t{}\n",
            self.sat_needed(),
            num_outs,
            self.data.len()
        )
    }
}
