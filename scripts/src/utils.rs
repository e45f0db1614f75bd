//! Utilities for the deploy scripts.

use std::{
    fs::{self, File},
    io::Read,
    path::PathBuf,
    str::FromStr,
};

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_contract::{CallBuilder, CallDecoder};
use json::JsonValue;
use tracing::{debug, info};

use crate::{constants::DEPLOYMENTS_KEY, errors::ScriptError};

/// The call builder type used by the scripts
pub type ScriptCallBuilder<'a, D> = CallBuilder<(), &'a DynProvider, D>;

/// A client bound to the deployer's signing key
#[derive(Clone)]
pub struct Deployer {
    /// The provider, with the deployer's wallet attached
    pub client: DynProvider,
    /// The address of the deployer
    pub address: Address,
    /// The number of confirmations to wait for on each transaction
    pub confirmations: u64,
}

/// Sets up the client with which to deploy and configure the contracts,
/// from the deployer's private key and the RPC url
pub async fn setup_client(
    priv_key: &str,
    rpc_url: &str,
    confirmations: u64,
) -> Result<Deployer, ScriptError> {
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let address = signer.address();

    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);
    let client = DynProvider::new(provider);

    let chain_id = client
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    info!("Connected to chain {chain_id} at {rpc_url} as {address:#x}");

    Ok(Deployer {
        client,
        address,
        confirmations,
    })
}

// ----------------
// | Transactions |
// ----------------

/// Send a transaction, wait for its receipt and ensure it succeeded.
///
/// `description` names the transaction in logs and errors.
pub async fn send_tx<D: CallDecoder>(
    tx: ScriptCallBuilder<'_, D>,
    confirmations: u64,
    description: &str,
) -> Result<TransactionReceipt, ScriptError> {
    let pending_tx = tx
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(format!("{description}: {e}")))?;
    debug!("Sent `{description}` in {:#x}", pending_tx.tx_hash());

    let receipt = pending_tx
        .with_required_confirmations(confirmations)
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(format!("{description}: {e}")))?;

    if !receipt.status() {
        return Err(ScriptError::TransactionReverted(format!(
            "{description} ({:#x})",
            receipt.transaction_hash
        )));
    }

    Ok(receipt)
}

/// Send a call and return the result
pub async fn call_helper<D: CallDecoder + Unpin>(
    call: ScriptCallBuilder<'_, D>,
    description: &str,
) -> Result<D::CallOutput, ScriptError> {
    call.call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(format!("{description}: {e}")))
}

/// Call a devnet-only RPC method, discarding its result
pub async fn devnet_rpc<P>(
    client: &DynProvider,
    method: &'static str,
    params: P,
) -> Result<(), ScriptError>
where
    P: serde::Serialize + Clone + std::fmt::Debug + Send + Sync + Unpin,
{
    client
        .raw_request::<P, serde_json::Value>(method.into(), params)
        .await
        .map_err(|e| ScriptError::DevnetRpc(format!("{method}: {e}")))?;

    Ok(())
}

// ---------------
// | Deployments |
// ---------------

/// Read the given file and parse it as JSON
pub fn get_json_from_file(file_path: &str) -> Result<JsonValue, ScriptError> {
    let mut file_contents = String::new();
    File::open(file_path)
        .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?
        .read_to_string(&mut file_contents)
        .map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;

    json::parse(&file_contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// List the contract keys recorded in the deployments file.
///
/// A missing file has no keys.
pub fn read_deployments_keys(file_path: &str) -> Result<Vec<String>, ScriptError> {
    if !PathBuf::from(file_path).exists() {
        return Ok(vec![]);
    }

    let parsed_json = get_json_from_file(file_path)?;
    Ok(parsed_json[DEPLOYMENTS_KEY]
        .entries()
        .map(|(key, _)| key.to_string())
        .collect())
}

/// Parse the address recorded under `contract_key` in the deployments file
pub fn parse_addr_from_deployments_file(
    file_path: &str,
    contract_key: &str,
) -> Result<Address, ScriptError> {
    let parsed_json = get_json_from_file(file_path)?;

    Address::from_str(
        parsed_json[DEPLOYMENTS_KEY][contract_key]
            .as_str()
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!(
                    "could not parse {contract_key} address from deployments file"
                ))
            })?,
    )
    .map_err(|e| ScriptError::ReadDeployments(e.to_string()))
}

/// Remove the given contract keys from the deployments file, keeping any
/// other entries. A missing file is left missing.
pub fn remove_deployed_addresses(
    file_path: &str,
    contract_keys: &[&str],
) -> Result<(), ScriptError> {
    if !PathBuf::from(file_path).exists() {
        return Ok(());
    }
    let mut parsed_json = get_json_from_file(file_path)?;

    for key in contract_keys {
        parsed_json[DEPLOYMENTS_KEY].remove(key);
    }

    fs::write(file_path, json::stringify_pretty(parsed_json, 4))
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))
}

/// Record the address of a deployed contract under `contract_key` in the
/// deployments file, creating the file if needed
pub fn write_deployed_address(
    file_path: &str,
    contract_key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    // If the file doesn't exist, create it
    if !PathBuf::from(file_path).exists() {
        fs::write(file_path, "{}").map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    }
    let mut parsed_json = get_json_from_file(file_path)?;

    parsed_json[DEPLOYMENTS_KEY][contract_key] = JsonValue::String(format!("{address:#x}"));

    fs::write(file_path, json::stringify_pretty(parsed_json, 4))
        .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;

    Ok(())
}
