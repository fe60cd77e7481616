//! Configuration loading and validation

use std::io::Write;

use bitcoin::Network;
use txforge::config::Config;

#[test]
fn loads_a_full_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [funding]
        network = "regtest"
        fee = 10000
        dust_threshold = 600
        in_target = 50000

        [rpc]
        host = "localhost:18443"
        user = "bitcoinrpc"
        password = "hunter2"
    "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.network().unwrap(), Network::Regtest);
    assert_eq!(config.funding.fee, 10_000);
    assert_eq!(config.funding.dust_threshold, 600);
    assert_eq!(config.funding.in_target, 50_000);
    assert_eq!(config.rpc.host, "localhost:18443");
    assert_eq!(config.rpc.user, "bitcoinrpc");
}

#[test]
fn empty_file_yields_defaults() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.network().unwrap(), Network::Testnet);
    assert_eq!(config.funding.fee, 20_000);
    assert_eq!(config.funding.in_target, 100_000);
}

#[test]
fn load_rejects_invalid_funding() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [funding]
        fee = 200000
        in_target = 100000
    "#
    )
    .unwrap();
    assert!(Config::load(file.path()).is_err());
}

#[test]
fn missing_file_is_an_error() {
    assert!(Config::load("/nonexistent/txforge.toml").is_err());
}

#[test]
fn params_inherit_config_values() {
    use std::sync::Arc;
    use txforge::builders::BuilderParams;
    use txforge::wallet::mock::MockWallet;

    let mut config = Config::default();
    config.funding.network = "regtest".to_string();
    config.funding.fee = 1_000;

    let wallet = Arc::new(MockWallet::new(Network::Regtest));
    let params = BuilderParams::from_config(&config, wallet).unwrap();
    assert_eq!(params.fee, 1_000);
    assert_eq!(params.dust_amnt, 546);
    assert_eq!(params.network, Network::Regtest);
}
