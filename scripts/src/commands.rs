//! Implementations of the various deploy scripts

use std::path::Path;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
};
use tracing::{info, warn};

use crate::{
    artifacts::{Artifact, ContractFactory, DeployedContract},
    cli::{DeployAllArgs, DeployArgs, RegisterArgs, SetupArgs},
    config::DeployConfig,
    errors::ScriptError,
    registration::register_name,
    setup::SetupPlan,
    types::{CnsContract, DeployedContracts},
    utils::{
        read_deployments_keys, remove_deployed_addresses, write_deployed_address, Deployer,
    },
};

/// Deploy the whole naming system, wire it together, and optionally register a name
pub async fn deploy_all(
    args: DeployAllArgs,
    deployer: &Deployer,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let DeployAllArgs {
        artifacts_dir,
        config,
        resume,
        register,
        registration,
    } = args;

    config.validate()?;
    config.log();

    let mut deployed = if resume {
        DeployedContracts::from_deployments_file(deployments_path)?
    } else {
        // Drop the older suite so that a failed fresh run cannot leave a mix behind
        let suite_keys = CnsContract::DEPLOY_ORDER.map(|contract| contract.deployments_key());
        let num_stale = read_deployments_keys(deployments_path)?
            .iter()
            .filter(|key| suite_keys.contains(&key.as_str()))
            .count();
        if num_stale > 0 {
            warn!("Clearing {num_stale} deployments recorded in {deployments_path}");
        }

        remove_deployed_addresses(deployments_path, &suite_keys)?;
        DeployedContracts::default()
    };

    for contract in CnsContract::DEPLOY_ORDER {
        if deployed.contains(contract) {
            info!(
                "Skipping {contract}, already deployed at {:#x}",
                deployed.get(contract)?
            );
            continue;
        }

        deploy_contract(
            contract,
            &mut deployed,
            Path::new(&artifacts_dir),
            &config,
            deployer,
            deployments_path,
        )
        .await?;
    }

    SetupPlan::new(&deployed, deployer.address, &config.tld)?
        .execute(deployer)
        .await?;
    info!("Naming system for `.{}` is set up", config.tld);

    if let Some(label) = register {
        register_name(&label, &config.tld, &registration, &deployed, deployer).await?;
    }

    Ok(())
}

/// Deploy a single contract, reading the addresses of its dependencies from the
/// deployments file
pub async fn deploy(
    args: DeployArgs,
    deployer: &Deployer,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let DeployArgs {
        contract,
        artifacts_dir,
        config,
    } = args;

    config.validate()?;
    let mut deployed = DeployedContracts::from_deployments_file(deployments_path)?;
    if deployed.contains(contract) {
        warn!("Replacing the recorded deployment of {contract}");
    }

    deploy_contract(
        contract,
        &mut deployed,
        Path::new(&artifacts_dir),
        &config,
        deployer,
        deployments_path,
    )
    .await?;

    Ok(())
}

/// Apply the wiring transactions to the contracts in the deployments file
pub async fn setup(
    args: SetupArgs,
    deployer: &Deployer,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let deployed = DeployedContracts::from_deployments_file(deployments_path)?;

    SetupPlan::new(&deployed, deployer.address, &args.tld)?
        .execute(deployer)
        .await
}

/// Register a name through the contracts in the deployments file
pub async fn register(
    args: RegisterArgs,
    deployer: &Deployer,
    deployments_path: &str,
) -> Result<(), ScriptError> {
    let deployed = DeployedContracts::from_deployments_file(deployments_path)?;

    register_name(
        &args.label,
        &args.tld,
        &args.registration,
        &deployed,
        deployer,
    )
    .await
}

/// Deploy `contract` from its artifact and record its address, both in the
/// deployments file and in `deployed`
async fn deploy_contract(
    contract: CnsContract,
    deployed: &mut DeployedContracts,
    artifacts_dir: &Path,
    config: &DeployConfig,
    deployer: &Deployer,
    deployments_path: &str,
) -> Result<Address, ScriptError> {
    deployed.check_dependencies(contract)?;

    let artifact = Artifact::find(artifacts_dir, contract.artifact_name())?;
    let args = constructor_args(contract, deployed, config)?;

    let DeployedContract { address, .. } =
        ContractFactory::new(artifact, deployer).deploy(args).await?;

    write_deployed_address(deployments_path, contract.deployments_key(), address)?;
    deployed.insert(contract, address);

    Ok(address)
}

/// The constructor arguments of `contract`, given its deployed dependencies
fn constructor_args(
    contract: CnsContract,
    deployed: &DeployedContracts,
    config: &DeployConfig,
) -> Result<Vec<DynSolValue>, ScriptError> {
    let addr = |c: CnsContract| deployed.get(c).map(DynSolValue::Address);
    let uint = |v: u64| DynSolValue::Uint(U256::from(v), 256);

    let args = match contract {
        CnsContract::EnsRegistry => vec![],
        CnsContract::ReverseRegistrar => vec![addr(CnsContract::EnsRegistry)?],
        CnsContract::BaseRegistrar => vec![
            addr(CnsContract::EnsRegistry)?,
            DynSolValue::FixedBytes(config.tld_node(), 32),
        ],
        CnsContract::StaticMetadataService => {
            vec![DynSolValue::String(config.metadata_uri.clone())]
        }
        CnsContract::NameWrapper => vec![
            addr(CnsContract::EnsRegistry)?,
            addr(CnsContract::BaseRegistrar)?,
            addr(CnsContract::StaticMetadataService)?,
        ],
        CnsContract::CfxPriceOracle => {
            vec![DynSolValue::Uint(U256::from(config.native_usd_price), 256)]
        }
        CnsContract::StablePriceOracle => vec![
            addr(CnsContract::CfxPriceOracle)?,
            DynSolValue::Array(
                config
                    .rent_prices_per_second()
                    .into_iter()
                    .map(|price| DynSolValue::Uint(price, 256))
                    .collect(),
            ),
        ],
        CnsContract::RegistrarController => vec![
            addr(CnsContract::BaseRegistrar)?,
            addr(CnsContract::StablePriceOracle)?,
            uint(config.min_commitment_age),
            uint(config.max_commitment_age),
            addr(CnsContract::ReverseRegistrar)?,
            addr(CnsContract::NameWrapper)?,
        ],
        CnsContract::PublicResolver => vec![
            addr(CnsContract::EnsRegistry)?,
            addr(CnsContract::NameWrapper)?,
            addr(CnsContract::RegistrarController)?,
            addr(CnsContract::ReverseRegistrar)?,
        ],
    };

    Ok(args)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use alloy::{
        dyn_abi::DynSolValue,
        primitives::{Address, U256},
    };
    use tempfile::tempdir;

    use crate::{
        cli::DeployAllArgs,
        config::DeployConfig,
        constants::{DEFAULT_MINE_BLOCKS, SECONDS_PER_YEAR},
        errors::ScriptError,
        namehash::namehash,
        registration::{AdvanceStrategy, RegistrationArgs},
        test_helpers::offline_deployer,
        types::{CnsContract, DeployedContracts},
        utils::{read_deployments_keys, write_deployed_address},
    };

    use super::{constructor_args, deploy_all};

    /// Build a deployment where each contract's address is derived from its position
    fn mock_deployment() -> DeployedContracts {
        let mut deployed = DeployedContracts::default();
        for (i, contract) in CnsContract::DEPLOY_ORDER.iter().enumerate() {
            deployed.insert(*contract, Address::repeat_byte(i as u8 + 1));
        }
        deployed
    }

    #[test]
    fn test_address_args_match_dependencies() {
        let deployed = mock_deployment();
        let config = DeployConfig::default();

        for contract in CnsContract::DEPLOY_ORDER {
            let args = constructor_args(contract, &deployed, &config).unwrap();
            let addresses: BTreeSet<Address> = args
                .iter()
                .filter_map(|arg| match arg {
                    DynSolValue::Address(a) => Some(*a),
                    _ => None,
                })
                .collect();
            let expected: BTreeSet<Address> = contract
                .dependencies()
                .iter()
                .map(|c| deployed.get(*c).unwrap())
                .collect();

            assert_eq!(addresses, expected, "address arguments of {contract}");
        }
    }

    #[test]
    fn test_args_without_dependencies() {
        let empty = DeployedContracts::default();
        let config = DeployConfig::default();

        for contract in CnsContract::DEPLOY_ORDER {
            let res = constructor_args(contract, &empty, &config);
            assert_eq!(res.is_ok(), contract.dependencies().is_empty(), "{contract}");
        }
    }

    #[test]
    fn test_config_values_in_args() {
        let deployed = mock_deployment();
        let config = DeployConfig::default();

        let args = constructor_args(CnsContract::BaseRegistrar, &deployed, &config).unwrap();
        assert_eq!(args[1], DynSolValue::FixedBytes(namehash("web3"), 32));

        let args = constructor_args(CnsContract::CfxPriceOracle, &deployed, &config).unwrap();
        assert_eq!(
            args,
            vec![DynSolValue::Uint(U256::from(200_000_000_000u64), 256)]
        );

        let args =
            constructor_args(CnsContract::RegistrarController, &deployed, &config).unwrap();
        assert_eq!(args[2], DynSolValue::Uint(U256::from(120), 256));
        assert_eq!(args[3], DynSolValue::Uint(U256::from(36_000), 256));

        let args = constructor_args(CnsContract::StablePriceOracle, &deployed, &config).unwrap();
        match &args[1] {
            DynSolValue::Array(prices) => assert_eq!(prices.len(), 6),
            other => panic!("unexpected rent prices argument: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fresh_deploy_all_clears_recorded_suite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let path = path.to_str().unwrap();

        for (i, contract) in CnsContract::DEPLOY_ORDER.iter().enumerate() {
            let address = Address::repeat_byte(i as u8 + 1);
            write_deployed_address(path, contract.deployments_key(), address).unwrap();
        }
        write_deployed_address(path, "faucet", Address::repeat_byte(0xfa)).unwrap();

        // The artifacts directory is empty, so the first deployment fails
        let artifacts_dir = dir.path().join("artifacts");
        std::fs::create_dir(&artifacts_dir).unwrap();
        let args = DeployAllArgs {
            artifacts_dir: artifacts_dir.to_str().unwrap().to_string(),
            config: DeployConfig::default(),
            resume: false,
            register: None,
            registration: RegistrationArgs {
                duration: SECONDS_PER_YEAR,
                secret: None,
                owner: None,
                advance: AdvanceStrategy::Hardhat,
                mine_blocks: DEFAULT_MINE_BLOCKS,
            },
        };

        let res = deploy_all(args, &offline_deployer(), path).await;
        assert!(matches!(res, Err(ScriptError::ArtifactParsing(_))));

        // None of the older suite survives, other entries do
        assert_eq!(read_deployments_keys(path).unwrap(), vec!["faucet"]);
        assert!(DeployedContracts::from_deployments_file(path)
            .unwrap()
            .get(CnsContract::EnsRegistry)
            .is_err());
    }
}
