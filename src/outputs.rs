//! Output script strategies
//!
//! Pure construction of locking scripts for the builder recipes: plain
//! pay-to-address, null-data payload carriers, fixed-destination dust
//! markers, and the multisig slot matrix used to smuggle byte payloads
//! inside standard-looking `OP_CHECKMULTISIG` outputs. The change policy
//! lives here too since it is just another (value, script) decision.
//!
//! None of these functions touch the wallet or the network.

use bitcoin::blockdata::opcodes::all as opcodes;
use bitcoin::blockdata::script::Builder;
use bitcoin::hashes::Hash;
use bitcoin::script::PushBytesBuf;
use bitcoin::{Address, PubkeyHash, PublicKey, ScriptBuf, TxOut};

use crate::error::{BuilderError, BuilderResult};

/// Byte capacity of a null-data payload
pub const NULL_DATA_CAPACITY: usize = 40;

/// Width of one multisig slot; payload chunks are padded to this
pub const SLOT_WIDTH: usize = 65;

/// Every multisig output holds exactly this many slots
pub const SLOTS_PER_OUTPUT: usize = 3;

/// Destination hash shared by all dust-marker outputs
const DUST_MARKER_HASH: [u8; 20] = [0x42; 20];

/// Locking script paying the given address
pub fn pay_to_addr(addr: &Address) -> ScriptBuf {
    addr.script_pubkey()
}

/// Zero-value data-carrier script: `OP_RETURN <data>`
///
/// Payloads over [`NULL_DATA_CAPACITY`] bytes would make the transaction
/// nonstandard and are rejected.
pub fn null_data(data: &[u8]) -> BuilderResult<ScriptBuf> {
    if data.len() > NULL_DATA_CAPACITY {
        return Err(BuilderError::PayloadTooLarge {
            len: data.len(),
            max: NULL_DATA_CAPACITY,
        });
    }
    let push = PushBytesBuf::try_from(data.to_vec())
        .map_err(|e| BuilderError::ScriptConstruction(format!("null-data push: {}", e)))?;
    Ok(Builder::new()
        .push_opcode(opcodes::OP_RETURN)
        .push_slice(push)
        .into_script())
}

/// Pay-to-pubkey-hash script for the fixed dust placeholder destination
///
/// Dust transactions are noise; nobody is expected to ever spend these, so
/// every output points at the same made-up hash.
pub fn dust_marker() -> ScriptBuf {
    ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(DUST_MARKER_HASH))
}

/// Bare multisig locking script: `OP_<m> <slot>... OP_<n> OP_CHECKMULTISIG`
///
/// Slots are pushed verbatim; callers decide which are real keys and which
/// are payload chunks.
pub fn multisig_script(m: u64, slots: &[Vec<u8>]) -> BuilderResult<ScriptBuf> {
    let n = slots.len() as u64;
    if n == 0 {
        return Err(BuilderError::ScriptConstruction(
            "multisig output with zero slots".into(),
        ));
    }
    if m == 0 || m > n {
        return Err(BuilderError::ScriptConstruction(format!(
            "invalid multisig threshold {} of {}",
            m, n
        )));
    }

    let mut builder = Builder::new().push_int(m as i64);
    for slot in slots {
        let push = PushBytesBuf::try_from(slot.clone())
            .map_err(|e| BuilderError::ScriptConstruction(format!("multisig slot push: {}", e)))?;
        builder = builder.push_slice(push);
    }
    Ok(builder
        .push_int(n as i64)
        .push_opcode(opcodes::OP_CHECKMULTISIG)
        .into_script())
}

/// Result of chunking a payload (plus real keys) into multisig slots
///
/// Rows always hold exactly [`SLOTS_PER_OUTPUT`] slots. `consumed` records
/// how many payload bytes were folded in.
#[derive(Debug, Clone)]
pub struct SlotMatrix {
    rows: Vec<[Vec<u8>; SLOTS_PER_OUTPUT]>,
    consumed: usize,
}

impl SlotMatrix {
    pub fn rows(&self) -> &[[Vec<u8>; SLOTS_PER_OUTPUT]] {
        &self.rows
    }

    /// Number of multisig outputs this matrix produces
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Payload bytes consumed while building the matrix
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

/// Interleave real keys and payload chunks into three-slot multisig rows
///
/// The flat slot sequence is: each key's serialized bytes once, in order,
/// followed by the payload in [`SLOT_WIDTH`]-byte chunks (the final chunk
/// zero-padded). Slots pack three per row and the last row is padded with
/// zeroed slots, so the row count obeys
/// `ceil((ceil(payload_len / SLOT_WIDTH) + key_count) / SLOTS_PER_OUTPUT)`.
///
/// Payload slots look like uncompressed public keys but are never usable as
/// signing material; the spending threshold of the resulting outputs depends
/// only on the real keys.
pub fn slot_matrix(payload: &[u8], keys: &[PublicKey]) -> SlotMatrix {
    let mut slots: Vec<Vec<u8>> = keys.iter().map(|k| k.to_bytes()).collect();
    for chunk in payload.chunks(SLOT_WIDTH) {
        let mut slot = vec![0u8; SLOT_WIDTH];
        slot[..chunk.len()].copy_from_slice(chunk);
        slots.push(slot);
    }
    while slots.len() % SLOTS_PER_OUTPUT != 0 {
        slots.push(vec![0u8; SLOT_WIDTH]);
    }

    let rows = slots
        .chunks_exact(SLOTS_PER_OUTPUT)
        .map(|group| [group[0].clone(), group[1].clone(), group[2].clone()])
        .collect();
    SlotMatrix {
        rows,
        consumed: payload.len(),
    }
}

/// Row count [`slot_matrix`] will produce for the given payload and key set
pub fn outputs_required(payload_len: usize, key_count: usize) -> usize {
    (payload_len.div_ceil(SLOT_WIDTH) + key_count).div_ceil(SLOTS_PER_OUTPUT)
}

/// Recover the embedded payload from a slot matrix
///
/// Concatenates the non-key slots in row order and trims the trailing zero
/// padding. Inverse of [`slot_matrix`] for payloads that do not themselves
/// end in zero bytes.
pub fn extract_payload(matrix: &SlotMatrix, key_count: usize) -> Vec<u8> {
    let mut data: Vec<u8> = matrix
        .rows
        .iter()
        .flatten()
        .skip(key_count)
        .flat_map(|slot| slot.iter().copied())
        .collect();
    while data.last() == Some(&0) {
        data.pop();
    }
    data
}

/// Apply the change policy: worthwhile change becomes a pay-to-address output
///
/// Returns `None` when `change` is below `dust`; the excess is silently
/// donated to the fee in that case.
pub fn change_output(change: u64, dust: u64, addr: &Address) -> Option<TxOut> {
    if change < dust {
        return None;
    }
    Some(TxOut {
        value: change,
        script_pubkey: pay_to_addr(addr),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::Network;

    use crate::wallet::new_key_pair;

    fn some_key() -> PublicKey {
        let secp = bitcoin::secp256k1::Secp256k1::new();
        new_key_pair(Network::Regtest).public_key(&secp)
    }

    #[test]
    fn null_data_capacity_boundary() {
        assert!(null_data(&[0xaa; NULL_DATA_CAPACITY]).is_ok());
        match null_data(&[0xaa; NULL_DATA_CAPACITY + 1]) {
            Err(BuilderError::PayloadTooLarge { len, max }) => {
                assert_eq!(len, 41);
                assert_eq!(max, 40);
            }
            other => panic!("expected PayloadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn null_data_script_is_op_return() {
        let script = null_data(b"hello").unwrap();
        assert!(script.is_op_return());
    }

    #[test]
    fn dust_marker_is_p2pkh() {
        assert!(dust_marker().is_p2pkh());
    }

    #[test]
    fn slot_matrix_row_count_law() {
        let key = some_key();
        for payload_len in [0usize, 1, 64, 65, 66, 130, 200, 400] {
            for key_count in 0..3usize {
                let keys = vec![key; key_count];
                let payload = vec![0xabu8; payload_len];
                let matrix = slot_matrix(&payload, &keys);
                assert_eq!(
                    matrix.len(),
                    outputs_required(payload_len, key_count),
                    "payload {} keys {}",
                    payload_len,
                    key_count
                );
                assert_eq!(matrix.consumed(), payload_len);
            }
        }
    }

    #[test]
    fn slot_matrix_round_trip() {
        let keys = vec![some_key()];
        let payload: Vec<u8> = (1..=200u8).collect();
        let matrix = slot_matrix(&payload, &keys);
        assert_eq!(extract_payload(&matrix, keys.len()), payload);
    }

    #[test]
    fn multisig_script_rejects_bad_threshold() {
        let slots = vec![vec![0u8; SLOT_WIDTH]; 3];
        assert!(multisig_script(0, &slots).is_err());
        assert!(multisig_script(4, &slots).is_err());
        assert!(multisig_script(1, &slots).is_ok());
    }

    #[test]
    fn change_policy_dust_boundary() {
        let secp = bitcoin::secp256k1::Secp256k1::new();
        let addr = new_key_pair(Network::Regtest).address(&secp, Network::Regtest);
        assert!(change_output(545, 546, &addr).is_none());
        let out = change_output(546, 546, &addr).expect("change at the threshold is kept");
        assert_eq!(out.value, 546);
        assert_eq!(out.script_pubkey, addr.script_pubkey());
    }
}
