//! Multi-output payment to fresh wallet addresses

use bitcoin::{Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, BuilderParams, TxBuilder};
use crate::error::{BuilderError, BuilderResult};
use crate::outputs;
use crate::signer::{signature_script, SigHashFlavor};

/// Splits `in_target - fee` evenly across N fresh pay-to-pubkey-hash outputs
///
/// Strict about its input target: if N does not divide the spendable amount
/// evenly, the per-output value rounds down and the remainder is donated to
/// the fee, so no change output is created.
pub struct PubKeyHashBuilder {
    params: BuilderParams,
    num_outs: u64,
}

impl PubKeyHashBuilder {
    pub fn new(params: BuilderParams, num_outs: u64) -> Self {
        Self { params, num_outs }
    }

    /// The amount sent to each output
    fn each_out_val(&self) -> u64 {
        if self.num_outs == 0 {
            return 0;
        }
        (self.params.in_target - self.params.fee) / self.num_outs
    }
}

impl TxBuilder for PubKeyHashBuilder {
    fn sat_needed(&self) -> u64 {
        self.each_out_val() * self.num_outs + self.params.fee
    }

    fn build(&self) -> BuilderResult<Transaction> {
        if self.num_outs == 0 {
            return Err(BuilderError::ScriptConstruction(
                "zero outputs requested".into(),
            ));
        }
        let each = self.each_out_val();
        if each < self.params.dust_amnt {
            return Err(BuilderError::ScriptConstruction(format!(
                "per-output value {} is under the dust limit {}",
                each, self.params.dust_amnt
            )));
        }

        let slot = allocator::select_exact(self.sat_needed(), &self.params)?;

        let mut tx = empty_tx();
        tx.input.push(blank_input(slot.outpoint));

        for _ in 0..self.num_outs {
            let addr = self.params.wallet.get_new_address()?;
            tx.output.push(TxOut {
                value: each,
                script_pubkey: outputs::pay_to_addr(&addr),
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
            "==== Pay2PubKeyHash ====\nSatNeeded:\t{}\nTxIns:\t1\nTxOuts:\t{}\n",
            self.sat_needed(),
            self.num_outs
        )
    }
}
