//! Plain payment to a single destination address

use bitcoin::{Address, Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, make_change, BuilderParams, TxBuilder};
use crate::error::BuilderResult;
use crate::outputs;
use crate::signer::{signature_script, SigHashFlavor};

/// Sends `in_target - fee` to one address; change absorbs the excess
pub struct SendToAddrBuilder {
    params: BuilderParams,
    addr: Address,
}

impl SendToAddrBuilder {
    pub fn new(params: BuilderParams, addr: Address) -> Self {
        Self { params, addr }
    }
}

impl TxBuilder for SendToAddrBuilder {
    fn sat_needed(&self) -> u64 {
        self.params.in_target
    }

    fn build(&self) -> BuilderResult<Transaction> {
        let slot = allocator::select_at_least(self.sat_needed(), &self.params)?;

        let mut tx = empty_tx();
        tx.input.push(blank_input(slot.outpoint));

        tx.output.push(TxOut {
            value: self.params.in_target - self.params.fee,
            script_pubkey: outputs::pay_to_addr(&self.addr),
        });

        // Whatever the funding output holds above the target goes back to us
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
            "==== Send To Addr ====\nSatNeeded:\t{}\nTxIns:\t1\nTxOuts:\t2\n",
            self.sat_needed()
        )
    }
}
