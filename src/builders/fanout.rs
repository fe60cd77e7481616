//! Fan-out funding: pre-create the exact inputs other builders need

use bitcoin::{Transaction, TxOut};

use crate::allocator;
use crate::builders::{blank_input, empty_tx, make_change, sum_outputs, BuilderParams, TxBuilder};
use crate::error::BuilderResult;
use crate::outputs;
use crate::signer::sign_inputs;

/// Creates one output per (sub-builder, copy) at that builder's needed value
///
/// Downstream builders then fund themselves with exact selection against
/// these denominations. Funding is composed from multiple inputs since the
/// total routinely exceeds any single unspent output.
pub struct FanOutBuilder {
    params: BuilderParams,
    builders: Vec<Box<dyn TxBuilder>>,
    copies: u64,
}

impl FanOutBuilder {
    pub fn new(params: BuilderParams, builders: Vec<Box<dyn TxBuilder>>, copies: u64) -> Self {
        Self {
            params,
            builders,
            copies,
        }
    }
}

impl TxBuilder for FanOutBuilder {
    fn sat_needed(&self) -> u64 {
        let sum: u64 = self
            .builders
            .iter()
            .map(|builder| builder.sat_needed() * self.copies)
            .sum();
        sum + self.params.fee
    }

    fn build(&self) -> BuilderResult<Transaction> {
        let total_spent = self.sat_needed();
        let (slots, total_in) = allocator::compose(total_spent, &self.params)?;

        let mut tx = empty_tx();
        for slot in &slots {
            tx.input.push(blank_input(slot.outpoint));
        }

        for builder in &self.builders {
            let amnt = builder.sat_needed();
            for _ in 0..self.copies {
                let addr = self.params.wallet.get_new_address()?;
                tx.output.push(TxOut {
                    value: amnt,
                    script_pubkey: outputs::pay_to_addr(&addr),
                });
            }
        }

        // change to solve unevenness in the composed total
        if let Some(change_out) = make_change(total_in - total_spent, &self.params)? {
            tx.output.push(change_out);
        }

        sign_inputs(&mut tx, &slots)?;

        self.log(&format!("InVal: {}", total_in));
        self.log(&format!("OutVal: {}", sum_outputs(&tx)));

        Ok(tx)
    }

    fn summarize(&self) -> String {
        let mut s = format!(
            "==== Fanout Tx ====\nSatNeeded:\t{}\nTxIns:\t?\nTxOuts:\t{}\n",
            self.sat_needed(),
            self.copies as usize * self.builders.len()
        );
        for builder in &self.builders {
            s.push_str(&builder.summarize());
        }
        s
    }
}
