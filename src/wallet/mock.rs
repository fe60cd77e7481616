//! In-memory mock wallet for tests
//!
//! Behaves like a tiny single-process node wallet: every funded output is
//! backed by a real key pair, so transactions built against it can be signed
//! end to end. Broadcasts are recorded instead of relayed.

use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::{Address, Amount, Network, OutPoint, PrivateKey, Transaction, Txid};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{wallet_error, BuilderResult};
use crate::wallet::{KeyHandle, UnspentOutput, WalletRpc};

struct MockState {
    unspent: Vec<UnspentOutput>,
    keys: HashMap<String, PrivateKey>,
    broadcasts: Vec<Transaction>,
    counter: u64,
    connected: bool,
}

/// Mock wallet collaborator backed by process memory
pub struct MockWallet {
    network: Network,
    state: Mutex<MockState>,
}

impl MockWallet {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            state: Mutex::new(MockState {
                unspent: Vec::new(),
                keys: HashMap::new(),
                broadcasts: Vec::new(),
                counter: 0,
                connected: true,
            }),
        }
    }

    /// Add an unspent output of `sats` controlled by a fresh key
    ///
    /// Returns the outpoint so tests can refer back to it.
    pub fn fund(&self, sats: u64) -> OutPoint {
        let mut state = self.state.lock().expect("mock wallet lock poisoned");
        state.counter += 1;
        let (address, key) = Self::make_key(self.network, state.counter);

        let mut txid_bytes = [0u8; 32];
        txid_bytes[..8].copy_from_slice(&state.counter.to_be_bytes());
        let outpoint = OutPoint::new(Txid::from_byte_array(txid_bytes), 0);

        let script = address.script_pubkey();
        state
            .unspent
            .push(UnspentOutput::new(outpoint, Amount::from_sat(sats), script, address.clone()));
        state.keys.insert(address.to_string(), key);
        outpoint
    }

    /// Simulate a lost node connection
    pub fn set_connected(&self, connected: bool) {
        self.state.lock().expect("mock wallet lock poisoned").connected = connected;
    }

    /// Transactions handed to `send_raw_transaction` so far
    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.state
            .lock()
            .expect("mock wallet lock poisoned")
            .broadcasts
            .clone()
    }

    fn make_key(network: Network, counter: u64) -> (Address, PrivateKey) {
        let secp = Secp256k1::new();
        let mut seed = [0u8; 32];
        seed[0] = 0x01;
        seed[24..].copy_from_slice(&counter.to_be_bytes());
        let secret = SecretKey::from_slice(&seed).expect("seed is a valid scalar");
        let key = PrivateKey::new(secret, network);
        let address = Address::p2pkh(&key.public_key(&secp), network);
        (address, key)
    }
}

impl WalletRpc for MockWallet {
    fn list_unspent(&self) -> BuilderResult<Vec<UnspentOutput>> {
        let state = self.state.lock().expect("mock wallet lock poisoned");
        if !state.connected {
            return Err(wallet_error("listunspent: node unreachable"));
        }
        Ok(state.unspent.clone())
    }

    fn dump_priv_key(&self, address: &Address) -> BuilderResult<KeyHandle> {
        let state = self.state.lock().expect("mock wallet lock poisoned");
        state
            .keys
            .get(&address.to_string())
            .map(|key| KeyHandle::new(*key))
            .ok_or_else(|| wallet_error(format!("dumpprivkey: address not owned: {}", address)))
    }

    fn get_new_address(&self) -> BuilderResult<Address> {
        let mut state = self.state.lock().expect("mock wallet lock poisoned");
        state.counter += 1;
        let (address, key) = Self::make_key(self.network, state.counter);
        state.keys.insert(address.to_string(), key);
        Ok(address)
    }

    fn send_raw_transaction(&self, tx: &Transaction) -> BuilderResult<Txid> {
        let mut state = self.state.lock().expect("mock wallet lock poisoned");
        if !state.connected {
            return Err(wallet_error("sendrawtransaction: node unreachable"));
        }
        state.broadcasts.push(tx.clone());
        Ok(tx.txid())
    }

    fn get_balance(&self) -> BuilderResult<Amount> {
        let state = self.state.lock().expect("mock wallet lock poisoned");
        Ok(state.unspent.iter().map(|u| u.amount).sum())
    }

    fn check_connection(&self) -> BuilderResult<()> {
        let state = self.state.lock().expect("mock wallet lock poisoned");
        if state.connected {
            Ok(())
        } else {
            Err(wallet_error("node unreachable"))
        }
    }
}
