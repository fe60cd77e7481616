//! Coarse transaction kind labeling
//!
//! Inspects a finished transaction's output scripts and assigns one label
//! for bookkeeping and telemetry. Classification never influences
//! construction.

use bitcoin::blockdata::opcodes::all as opcodes;
use bitcoin::blockdata::script::Instruction;
use bitcoin::{Script, Transaction};
use std::collections::HashMap;

/// The standard locking-script shapes this crate distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptShape {
    Pubkey,
    PubkeyHash,
    ScriptHash,
    WitnessPubkeyHash,
    WitnessScriptHash,
    Multisig,
    NullData,
    NonStandard,
}

impl ScriptShape {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptShape::Pubkey => "pubkey",
            ScriptShape::PubkeyHash => "pubkeyhash",
            ScriptShape::ScriptHash => "scripthash",
            ScriptShape::WitnessPubkeyHash => "witness_keyhash",
            ScriptShape::WitnessScriptHash => "witness_scripthash",
            ScriptShape::Multisig => "multisig",
            ScriptShape::NullData => "nulldata",
            ScriptShape::NonStandard => "nonstandard",
        }
    }
}

impl std::fmt::Display for ScriptShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a single locking script
pub fn classify(script: &Script) -> ScriptShape {
    if script.is_p2pkh() {
        ScriptShape::PubkeyHash
    } else if script.is_p2sh() {
        ScriptShape::ScriptHash
    } else if script.is_v0_p2wpkh() {
        ScriptShape::WitnessPubkeyHash
    } else if script.is_v0_p2wsh() {
        ScriptShape::WitnessScriptHash
    } else if script.is_op_return() {
        ScriptShape::NullData
    } else if script.is_p2pk() {
        ScriptShape::Pubkey
    } else if is_multisig(script) {
        ScriptShape::Multisig
    } else {
        ScriptShape::NonStandard
    }
}

/// Bare multisig: `OP_<m> <key>... OP_<n> OP_CHECKMULTISIG` with key-sized pushes
fn is_multisig(script: &Script) -> bool {
    let instructions: Vec<Instruction> = match script.instructions().collect() {
        Ok(instructions) => instructions,
        Err(_) => return false,
    };
    if instructions.len() < 4 {
        return false;
    }

    let m = match small_int(&instructions[0]) {
        Some(m) => m,
        None => return false,
    };
    let n = match small_int(&instructions[instructions.len() - 2]) {
        Some(n) => n,
        None => return false,
    };
    match &instructions[instructions.len() - 1] {
        Instruction::Op(op) if *op == opcodes::OP_CHECKMULTISIG => {}
        _ => return false,
    }

    let keys = &instructions[1..instructions.len() - 2];
    if keys.len() as i64 != n || m < 1 || m > n {
        return false;
    }
    keys.iter().all(|instruction| match instruction {
        Instruction::PushBytes(push) => matches!(push.as_bytes().len(), 33 | 65),
        _ => false,
    })
}

/// Decode an `OP_1`..`OP_16` small-integer opcode
fn small_int(instruction: &Instruction) -> Option<i64> {
    match instruction {
        Instruction::Op(op) => {
            let byte = op.to_u8();
            let one = opcodes::OP_PUSHNUM_1.to_u8();
            let sixteen = opcodes::OP_PUSHNUM_16.to_u8();
            if (one..=sixteen).contains(&byte) {
                Some((byte - one) as i64 + 1)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Tally the shapes of every output script in a transaction
pub fn output_shape_counts(tx: &Transaction) -> HashMap<ScriptShape, usize> {
    let mut counts = HashMap::new();
    for txout in &tx.output {
        *counts.entry(classify(&txout.script_pubkey)).or_insert(0) += 1;
    }
    counts
}

/// Assign a transaction its coarse kind label
///
/// Any nonstandard output labels the whole transaction "nonstandard"; a
/// data-carrying output wins next, then multisig. Otherwise the most common
/// shape wins. Ties on count are broken by shape name order so the label is
/// deterministic.
pub fn transaction_kind(tx: &Transaction) -> &'static str {
    let counts = output_shape_counts(tx);
    if counts.is_empty() {
        return ScriptShape::NonStandard.name();
    }
    if counts.contains_key(&ScriptShape::NonStandard) {
        return ScriptShape::NonStandard.name();
    }
    if counts.contains_key(&ScriptShape::NullData) {
        return ScriptShape::NullData.name();
    }
    if counts.contains_key(&ScriptShape::Multisig) {
        return ScriptShape::Multisig.name();
    }

    let mut tally: Vec<(ScriptShape, usize)> = counts.into_iter().collect();
    tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name().cmp(b.0.name())));
    tally[0].0.name()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::absolute::LockTime;
    use bitcoin::{ScriptBuf, TxOut};

    use crate::outputs;

    fn tx_with_scripts(scripts: Vec<ScriptBuf>) -> Transaction {
        Transaction {
            version: 1,
            lock_time: LockTime::ZERO,
            input: Vec::new(),
            output: scripts
                .into_iter()
                .map(|script_pubkey| TxOut {
                    value: 546,
                    script_pubkey,
                })
                .collect(),
        }
    }

    #[test]
    fn classifies_constructed_scripts() {
        assert_eq!(classify(&outputs::dust_marker()), ScriptShape::PubkeyHash);
        assert_eq!(
            classify(&outputs::null_data(b"hi").unwrap()),
            ScriptShape::NullData
        );
        let slots = vec![vec![0u8; 65]; 3];
        assert_eq!(
            classify(&outputs::multisig_script(1, &slots).unwrap()),
            ScriptShape::Multisig
        );
        assert_eq!(classify(&ScriptBuf::new()), ScriptShape::NonStandard);
    }

    #[test]
    fn empty_transaction_is_nonstandard() {
        assert_eq!(transaction_kind(&tx_with_scripts(vec![])), "nonstandard");
    }

    #[test]
    fn data_shapes_take_precedence_over_counts() {
        let slots = vec![vec![0u8; 65]; 3];
        let tx = tx_with_scripts(vec![
            outputs::dust_marker(),
            outputs::dust_marker(),
            outputs::multisig_script(1, &slots).unwrap(),
        ]);
        assert_eq!(transaction_kind(&tx), "multisig");

        let tx = tx_with_scripts(vec![
            outputs::dust_marker(),
            outputs::null_data(b"x").unwrap(),
        ]);
        assert_eq!(transaction_kind(&tx), "nulldata");

        let tx = tx_with_scripts(vec![outputs::dust_marker(), ScriptBuf::new()]);
        assert_eq!(transaction_kind(&tx), "nonstandard");
    }

    #[test]
    fn plain_shapes_count_with_stable_tie_break() {
        let tx = tx_with_scripts(vec![outputs::dust_marker(), outputs::dust_marker()]);
        assert_eq!(transaction_kind(&tx), "pubkeyhash");
    }
}
