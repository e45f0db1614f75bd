//! Loading of Hardhat compilation artifacts, and deployment of contracts from them

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::{Address, Bytes, TxHash, I256},
};
use alloy_contract::RawCallBuilder;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    constants::{ARTIFACT_EXTENSION, LINK_PLACEHOLDER_MARKER},
    errors::ScriptError,
    utils::{send_tx, Deployer},
};

/// The subset of a Hardhat artifact file needed to deploy a contract
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    /// The name of the contract
    contract_name: String,
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode, in hex
    bytecode: String,
    /// The libraries the bytecode must be linked against
    #[serde(default)]
    link_references: serde_json::Map<String, serde_json::Value>,
}

/// A compiled contract: its ABI and its creation bytecode
#[derive(Clone, Debug)]
pub struct Artifact {
    /// The name of the contract
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
}

impl FromStr for Artifact {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let HardhatArtifact {
            contract_name,
            abi,
            bytecode,
            link_references,
        } = serde_json::from_str(s).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        if !link_references.is_empty() || bytecode.contains(LINK_PLACEHOLDER_MARKER) {
            return Err(ScriptError::ArtifactParsing(format!(
                "{contract_name} has unlinked library references"
            )));
        }

        let bytecode = Bytes::from_str(&bytecode)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{contract_name}: {e}")))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactParsing(format!(
                "{contract_name} has no creation bytecode, is it abstract?"
            )));
        }

        Ok(Artifact {
            name: contract_name,
            abi,
            bytecode,
        })
    }
}

impl Artifact {
    /// Parse the artifact at the given path
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;
        contents.parse()
    }

    /// Find and parse the artifact of the named contract anywhere under `artifacts_dir`
    pub fn find(artifacts_dir: &Path, contract_name: &str) -> Result<Self, ScriptError> {
        let file_name = format!("{contract_name}.{ARTIFACT_EXTENSION}");

        let mut matches = Vec::new();
        collect_files_named(artifacts_dir, &file_name, &mut matches)?;

        match matches.as_slice() {
            [path] => {
                debug!("Loading {contract_name} from {}", path.display());
                Self::from_file(path)
            }
            [] => Err(ScriptError::ArtifactParsing(format!(
                "no artifact for {contract_name} under {}",
                artifacts_dir.display()
            ))),
            _ => Err(ScriptError::ArtifactParsing(format!(
                "found {} artifacts for {contract_name} under {}",
                matches.len(),
                artifacts_dir.display()
            ))),
        }
    }

    /// Build the creation code of the contract: its bytecode followed by the
    /// ABI-encoded constructor arguments
    pub fn deploy_code(&self, args: Vec<DynSolValue>) -> Result<Bytes, ScriptError> {
        let Some(constructor) = self.abi.constructor() else {
            if !args.is_empty() {
                return Err(ScriptError::CalldataConstruction(format!(
                    "{} takes no constructor arguments, got {}",
                    self.name,
                    args.len()
                )));
            }
            return Ok(self.bytecode.clone());
        };

        if constructor.inputs.len() != args.len() {
            return Err(ScriptError::CalldataConstruction(format!(
                "{} takes {} constructor arguments, got {}",
                self.name,
                constructor.inputs.len(),
                args.len()
            )));
        }

        let values = constructor
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty = param
                    .resolve()
                    .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
                coerce_arg(arg, &ty).map_err(|e| {
                    ScriptError::CalldataConstruction(format!(
                        "{} constructor argument `{}`: {e}",
                        self.name, param.name
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let encoded_args = constructor
            .abi_encode_input(&values)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;

        Ok([self.bytecode.as_ref(), encoded_args.as_slice()]
            .concat()
            .into())
    }
}

/// Recursively collect the paths of files named `file_name` under `dir`
fn collect_files_named(
    dir: &Path,
    file_name: &str,
    matches: &mut Vec<PathBuf>,
) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", dir.display())))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();

        if path.is_dir() {
            collect_files_named(&path, file_name, matches)?;
        } else if path.file_name().is_some_and(|name| name == file_name) {
            matches.push(path);
        }
    }

    Ok(())
}

/// Adapt an argument to the type the ABI declares for it.
///
/// Unsigned integers are resized, or converted to signed integers, when they fit.
/// Any other mismatch is an error.
fn coerce_arg(value: DynSolValue, ty: &DynSolType) -> Result<DynSolValue, String> {
    match (value, ty) {
        (DynSolValue::Uint(v, _), DynSolType::Uint(bits)) => {
            if v.bit_len() > *bits {
                return Err(format!("{v} does not fit in uint{bits}"));
            }
            Ok(DynSolValue::Uint(v, *bits))
        }
        (DynSolValue::Uint(v, _), DynSolType::Int(bits)) => {
            // Leave room for the sign bit
            if v.bit_len() >= *bits {
                return Err(format!("{v} does not fit in int{bits}"));
            }
            let v = I256::try_from(v).map_err(|e| e.to_string())?;
            Ok(DynSolValue::Int(v, *bits))
        }
        (DynSolValue::Array(values), DynSolType::Array(inner)) => values
            .into_iter()
            .map(|v| coerce_arg(v, inner))
            .collect::<Result<Vec<_>, _>>()
            .map(DynSolValue::Array),
        (value, ty) if ty.matches(&value) => Ok(value),
        (value, ty) => Err(format!("expected {ty}, got {value:?}")),
    }
}

/// A contract deployed by the [`ContractFactory`]
#[derive(Clone, Copy, Debug)]
pub struct DeployedContract {
    /// The address of the contract
    pub address: Address,
    /// The hash of the creation transaction
    pub tx_hash: TxHash,
}

/// Deploys instances of a compiled contract
pub struct ContractFactory<'a> {
    /// The compiled contract
    artifact: Artifact,
    /// The client sending the creation transactions
    deployer: &'a Deployer,
}

impl<'a> ContractFactory<'a> {
    /// Create a factory for the given artifact
    pub fn new(artifact: Artifact, deployer: &'a Deployer) -> Self {
        Self { artifact, deployer }
    }

    /// Deploy the contract with the given constructor arguments, waiting for
    /// the creation transaction to be confirmed
    pub async fn deploy(&self, args: Vec<DynSolValue>) -> Result<DeployedContract, ScriptError> {
        let code = self.artifact.deploy_code(args)?;
        let tx = RawCallBuilder::new_raw_deploy(&self.deployer.client, code);

        let description = format!("deploy {}", self.artifact.name);
        let receipt = send_tx(tx, self.deployer.confirmations, &description).await?;

        let address = receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "no contract address in receipt of {description}"
            ))
        })?;
        info!(
            "{} deployed to {address:#x} (tx {:#x}, gas used {})",
            self.artifact.name, receipt.transaction_hash, receipt.gas_used
        );

        Ok(DeployedContract {
            address,
            tx_hash: receipt.transaction_hash,
        })
    }
}
