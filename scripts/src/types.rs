//! Type definitions used throughout the scripts

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
};

use alloy::primitives::Address;
use clap::ValueEnum;
use tracing::debug;

use crate::{
    errors::ScriptError,
    utils::{parse_addr_from_deployments_file, read_deployments_keys},
};

/// The contracts making up the naming system
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CnsContract {
    /// The registry of name ownership nodes
    EnsRegistry,
    /// The registrar of `addr.reverse` records
    ReverseRegistrar,
    /// The ERC721 registrar of the top level domain
    BaseRegistrar,
    /// The metadata service backing the name wrapper's token URIs
    StaticMetadataService,
    /// The ERC1155 name wrapper
    NameWrapper,
    /// The oracle quoting the native coin in USD
    CfxPriceOracle,
    /// The oracle pricing rent by label length
    StablePriceOracle,
    /// The commit/reveal registration controller
    RegistrarController,
    /// The default resolver
    PublicResolver,
}

impl CnsContract {
    /// All contracts, in the order in which they must be deployed
    pub const DEPLOY_ORDER: [CnsContract; 9] = [
        CnsContract::EnsRegistry,
        CnsContract::ReverseRegistrar,
        CnsContract::BaseRegistrar,
        CnsContract::StaticMetadataService,
        CnsContract::NameWrapper,
        CnsContract::CfxPriceOracle,
        CnsContract::StablePriceOracle,
        CnsContract::RegistrarController,
        CnsContract::PublicResolver,
    ];

    /// The name of the contract as compiled, i.e. the name of its artifact file
    pub fn artifact_name(&self) -> &'static str {
        match self {
            CnsContract::EnsRegistry => "ENSRegistry",
            CnsContract::ReverseRegistrar => "ReverseRegistrar",
            CnsContract::BaseRegistrar => "BaseRegistrarImplementation",
            CnsContract::StaticMetadataService => "StaticMetadataService",
            CnsContract::NameWrapper => "NameWrapper",
            CnsContract::CfxPriceOracle => "CFXPriceOracle",
            CnsContract::StablePriceOracle => "StablePriceOracle",
            CnsContract::RegistrarController => "ETHRegistrarController",
            CnsContract::PublicResolver => "PublicResolver",
        }
    }

    /// The key of the contract in the `deployments.json` file
    pub fn deployments_key(&self) -> &'static str {
        match self {
            CnsContract::EnsRegistry => "ens_registry",
            CnsContract::ReverseRegistrar => "reverse_registrar",
            CnsContract::BaseRegistrar => "base_registrar",
            CnsContract::StaticMetadataService => "static_metadata_service",
            CnsContract::NameWrapper => "name_wrapper",
            CnsContract::CfxPriceOracle => "cfx_price_oracle",
            CnsContract::StablePriceOracle => "stable_price_oracle",
            CnsContract::RegistrarController => "registrar_controller",
            CnsContract::PublicResolver => "public_resolver",
        }
    }

    /// The contracts whose addresses are passed to this contract's constructor
    pub fn dependencies(&self) -> &'static [CnsContract] {
        match self {
            CnsContract::EnsRegistry
            | CnsContract::StaticMetadataService
            | CnsContract::CfxPriceOracle => &[],
            CnsContract::ReverseRegistrar | CnsContract::BaseRegistrar => {
                &[CnsContract::EnsRegistry]
            }
            CnsContract::NameWrapper => &[
                CnsContract::EnsRegistry,
                CnsContract::BaseRegistrar,
                CnsContract::StaticMetadataService,
            ],
            CnsContract::StablePriceOracle => &[CnsContract::CfxPriceOracle],
            CnsContract::RegistrarController => &[
                CnsContract::BaseRegistrar,
                CnsContract::StablePriceOracle,
                CnsContract::ReverseRegistrar,
                CnsContract::NameWrapper,
            ],
            CnsContract::PublicResolver => &[
                CnsContract::EnsRegistry,
                CnsContract::NameWrapper,
                CnsContract::RegistrarController,
                CnsContract::ReverseRegistrar,
            ],
        }
    }
}

impl Display for CnsContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact_name())
    }
}

/// The addresses of the deployed contracts of the naming system
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeployedContracts(BTreeMap<CnsContract, Address>);

impl DeployedContracts {
    /// Read all recorded deployments from the given deployments file.
    ///
    /// Contracts without an entry are left out; a missing file yields an empty set.
    pub fn from_deployments_file(file_path: &str) -> Result<Self, ScriptError> {
        let keys = read_deployments_keys(file_path)?;

        let mut deployed = Self::default();
        for contract in CnsContract::DEPLOY_ORDER {
            if !keys.iter().any(|k| k == contract.deployments_key()) {
                continue;
            }

            let address = parse_addr_from_deployments_file(file_path, contract.deployments_key())?;
            debug!("Found {contract} at {address:#x}");
            deployed.insert(contract, address);
        }

        Ok(deployed)
    }

    /// Record the address of a contract
    pub fn insert(&mut self, contract: CnsContract, address: Address) {
        self.0.insert(contract, address);
    }

    /// Whether the given contract has a recorded address
    pub fn contains(&self, contract: CnsContract) -> bool {
        self.0.contains_key(&contract)
    }

    /// Get the address of the given contract
    pub fn get(&self, contract: CnsContract) -> Result<Address, ScriptError> {
        self.0
            .get(&contract)
            .copied()
            .ok_or_else(|| ScriptError::MissingDeployment(contract.to_string()))
    }

    /// Check that all the dependencies of the given contract are deployed
    pub fn check_dependencies(&self, contract: CnsContract) -> Result<(), ScriptError> {
        for dependency in contract.dependencies() {
            self.get(*dependency)?;
        }

        Ok(())
    }
}
