//! Helpers for tests, including a local Anvil devnet and a contract standing in
//! for the naming system

use std::str::FromStr;

use alloy::{
    network::EthereumWallet,
    node_bindings::{Anvil, AnvilInstance},
    primitives::Address,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};

use crate::{
    artifacts::{Artifact, ContractFactory},
    constants::DEFAULT_PKEY,
    utils::{setup_client, Deployer},
};

/// An RPC URL nothing listens on
const CLOSED_RPC_URL: &str = "http://127.0.0.1:1";

/// A hand-assembled contract answering every registry, registrar, wrapper,
/// reverse registrar and controller method the scripts call.
///
/// Owners are stored at their node, with `setSubnodeOwner` hashing the parent
/// node and label. Controllers are stored at their address, the default
/// resolver at the all-ones slot and commitments at their hash, which is the
/// keccak of the call arguments. `minCommitmentAge` is 60, `maxCommitmentAge`
/// is 86400, `valid` and `available` always hold and `rentPrice` is
/// `(1000, 7)`. `register` reverts unless its commitment is at least 60
/// seconds old and it pays 1007 wei. Unknown selectors revert.
pub const STANDIN_ARTIFACT: &str = r#"{
    "contractName": "NamingSystemStandIn",
    "abi": [],
    "bytecode": "0x61016a80600c6000396000f360003560e01c806302571be3146100b957806306ab5923146100c2578063da8c229e146100b9578063a7fc7a07146100d9578063e0dba60f146100e1578063828eab0e146100ea578063c66485b2146100f35780638d839ffe146100fc578063ce1e09c0146101035780639791c0971461010c578063aeb8ce9b1461010c57806383e7f6ff14610113578063d555254a14610124578063f14fcbc8146101365780637acaaf261461013d575b600080fd5b60005260206000f35b600435546100b0565b600435600052602435602052604435604060002055005b600160043555005b60243560043555005b600019546100b0565b60043560001955005b603c6100b0565b620151806100b0565b60016100b0565b6103e8600052600760205260406000f35b600436038060046000376000206100b0565b4260043555005b60043603806004600037600020805480156100ab57603c0142106100ab576103ef34106100ab576000905500"
}"#;

/// Spawn an Anvil devnet and connect its first dev account to it.
///
/// Returns `None` when no `anvil` binary is available.
pub async fn spawn_devnet() -> Option<(AnvilInstance, Deployer)> {
    let anvil = match Anvil::new().try_spawn() {
        Ok(anvil) => anvil,
        Err(e) => {
            eprintln!("skipping devnet test, could not spawn anvil: {e}");
            return None;
        }
    };

    let deployer = setup_client(DEFAULT_PKEY, &anvil.endpoint(), 1).await.unwrap();
    Some((anvil, deployer))
}

/// Deploy a fresh instance of the stand-in contract
pub async fn deploy_standin(deployer: &Deployer) -> Address {
    let artifact: Artifact = STANDIN_ARTIFACT.parse().unwrap();
    ContractFactory::new(artifact, deployer)
        .deploy(vec![])
        .await
        .unwrap()
        .address
}

/// A deployer whose RPC URL is never reachable
pub fn offline_deployer() -> Deployer {
    let signer = PrivateKeySigner::from_str(DEFAULT_PKEY).unwrap();
    let address = signer.address();
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(Url::parse(CLOSED_RPC_URL).unwrap());

    Deployer {
        client: DynProvider::new(provider),
        address,
        confirmations: 1,
    }
}
