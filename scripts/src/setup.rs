//! The administrative transactions wiring the deployed contracts together

use std::fmt::{self, Display};

use alloy::{primitives::Address, providers::DynProvider, rpc::types::TransactionReceipt};
use tracing::info;

use crate::{
    constants::{ADDR_LABEL, REVERSE_LABEL},
    errors::ScriptError,
    namehash::{labelhash, namehash},
    solidity::{BaseRegistrar, ENSRegistry, NameWrapper, ReverseRegistrar},
    types::{CnsContract, DeployedContracts},
    utils::{call_helper, send_tx, Deployer},
};

/// A single wiring transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupStep {
    /// Assign a name directly under an existing node to an owner, via the registry
    SetSubnodeOwner {
        /// The full dotted name being assigned
        name: String,
        /// The new owner of the name
        owner: Address,
    },
    /// Allow a controller to register names in the base registrar
    AddRegistrarController {
        /// The controller to add
        controller: Address,
    },
    /// Allow a controller to wrap names in the name wrapper
    SetWrapperController {
        /// The controller to enable
        controller: Address,
    },
    /// Set the resolver used for reverse records by default
    SetDefaultResolver {
        /// The resolver
        resolver: Address,
    },
    /// Allow a controller to set reverse records on behalf of registrants
    SetReverseController {
        /// The controller to enable
        controller: Address,
    },
}

impl Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::SetSubnodeOwner { name, owner } => {
                write!(f, "set owner of `{name}` to {owner:#x}")
            }
            SetupStep::AddRegistrarController { controller } => {
                write!(f, "add base registrar controller {controller:#x}")
            }
            SetupStep::SetWrapperController { controller } => {
                write!(f, "enable name wrapper controller {controller:#x}")
            }
            SetupStep::SetDefaultResolver { resolver } => {
                write!(f, "set default reverse resolver to {resolver:#x}")
            }
            SetupStep::SetReverseController { controller } => {
                write!(f, "enable reverse registrar controller {controller:#x}")
            }
        }
    }
}

/// Split a dotted name into its first label and the name of its parent
fn split_name(name: &str) -> (&str, &str) {
    name.split_once('.').unwrap_or((name, ""))
}

/// The ordered wiring transactions of a deployment
#[derive(Clone, Debug)]
pub struct SetupPlan {
    /// The registry contract
    registry: Address,
    /// The base registrar contract
    base_registrar: Address,
    /// The name wrapper contract
    name_wrapper: Address,
    /// The reverse registrar contract
    reverse_registrar: Address,
    /// The steps, in the order in which they are applied
    pub steps: Vec<SetupStep>,
}

impl SetupPlan {
    /// Build the plan for the given deployment of the `tld` namespace, with
    /// `deployer` as the owner of the `reverse` namespace
    pub fn new(
        deployed: &DeployedContracts,
        deployer: Address,
        tld: &str,
    ) -> Result<Self, ScriptError> {
        let registry = deployed.get(CnsContract::EnsRegistry)?;
        let base_registrar = deployed.get(CnsContract::BaseRegistrar)?;
        let name_wrapper = deployed.get(CnsContract::NameWrapper)?;
        let reverse_registrar = deployed.get(CnsContract::ReverseRegistrar)?;
        let controller = deployed.get(CnsContract::RegistrarController)?;
        let resolver = deployed.get(CnsContract::PublicResolver)?;

        let steps = vec![
            SetupStep::SetSubnodeOwner {
                name: tld.to_string(),
                owner: base_registrar,
            },
            SetupStep::SetSubnodeOwner {
                name: REVERSE_LABEL.to_string(),
                owner: deployer,
            },
            SetupStep::SetSubnodeOwner {
                name: format!("{ADDR_LABEL}.{REVERSE_LABEL}"),
                owner: reverse_registrar,
            },
            SetupStep::AddRegistrarController { controller },
            SetupStep::AddRegistrarController {
                controller: name_wrapper,
            },
            SetupStep::SetWrapperController { controller },
            SetupStep::SetDefaultResolver { resolver },
            SetupStep::SetReverseController { controller },
        ];

        Ok(Self {
            registry,
            base_registrar,
            name_wrapper,
            reverse_registrar,
            steps,
        })
    }

    /// Apply the steps in order, skipping those already in effect on-chain
    pub async fn execute(&self, deployer: &Deployer) -> Result<(), ScriptError> {
        for (i, step) in self.steps.iter().enumerate() {
            if self.is_applied(step, &deployer.client).await? {
                info!(
                    "[{}/{}] Skipping `{step}`, already applied",
                    i + 1,
                    self.steps.len()
                );
                continue;
            }

            let receipt = self.apply(step, deployer).await?;
            info!(
                "[{}/{}] Applied `{step}` (tx {:#x})",
                i + 1,
                self.steps.len(),
                receipt.transaction_hash
            );
        }

        Ok(())
    }

    /// Check whether the effect of the given step is already visible on-chain
    async fn is_applied(
        &self,
        step: &SetupStep,
        client: &DynProvider,
    ) -> Result<bool, ScriptError> {
        let description = step.to_string();
        match step {
            SetupStep::SetSubnodeOwner { name, owner } => {
                let registry = ENSRegistry::new(self.registry, client.clone());
                let current = call_helper(registry.owner(namehash(name)), &description).await?;
                Ok(current._0 == *owner)
            }
            SetupStep::AddRegistrarController { controller } => {
                let registrar = BaseRegistrar::new(self.base_registrar, client.clone());
                let res = call_helper(registrar.controllers(*controller), &description).await?;
                Ok(res._0)
            }
            SetupStep::SetWrapperController { controller } => {
                let wrapper = NameWrapper::new(self.name_wrapper, client.clone());
                let res = call_helper(wrapper.controllers(*controller), &description).await?;
                Ok(res._0)
            }
            SetupStep::SetDefaultResolver { resolver } => {
                let reverse = ReverseRegistrar::new(self.reverse_registrar, client.clone());
                let res = call_helper(reverse.defaultResolver(), &description).await?;
                Ok(res._0 == *resolver)
            }
            SetupStep::SetReverseController { controller } => {
                let reverse = ReverseRegistrar::new(self.reverse_registrar, client.clone());
                let res = call_helper(reverse.controllers(*controller), &description).await?;
                Ok(res._0)
            }
        }
    }

    /// Send the transaction of the given step
    async fn apply(
        &self,
        step: &SetupStep,
        deployer: &Deployer,
    ) -> Result<TransactionReceipt, ScriptError> {
        let client = deployer.client.clone();
        let confirmations = deployer.confirmations;
        let description = step.to_string();

        match step {
            SetupStep::SetSubnodeOwner { name, owner } => {
                let (label, parent) = split_name(name);
                let registry = ENSRegistry::new(self.registry, client);
                let tx = registry.setSubnodeOwner(namehash(parent), labelhash(label), *owner);
                send_tx(tx, confirmations, &description).await
            }
            SetupStep::AddRegistrarController { controller } => {
                let registrar = BaseRegistrar::new(self.base_registrar, client);
                send_tx(registrar.addController(*controller), confirmations, &description).await
            }
            SetupStep::SetWrapperController { controller } => {
                let wrapper = NameWrapper::new(self.name_wrapper, client);
                let tx = wrapper.setController(*controller, true);
                send_tx(tx, confirmations, &description).await
            }
            SetupStep::SetDefaultResolver { resolver } => {
                let reverse = ReverseRegistrar::new(self.reverse_registrar, client);
                let tx = reverse.setDefaultResolver(*resolver);
                send_tx(tx, confirmations, &description).await
            }
            SetupStep::SetReverseController { controller } => {
                let reverse = ReverseRegistrar::new(self.reverse_registrar, client);
                let tx = reverse.setController(*controller, true);
                send_tx(tx, confirmations, &description).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::{primitives::Address, providers::Provider};

    use crate::{
        constants::DEFAULT_TLD,
        namehash::namehash,
        solidity::{BaseRegistrar, ENSRegistry, ReverseRegistrar},
        test_helpers::{deploy_standin, spawn_devnet},
        types::{CnsContract, DeployedContracts},
        utils::{send_tx, Deployer},
    };

    use super::{split_name, SetupPlan, SetupStep};

    /// The number of transactions sent by the deployer
    async fn nonce(deployer: &Deployer) -> u64 {
        deployer
            .client
            .get_transaction_count(deployer.address)
            .await
            .unwrap()
    }

    /// Build a deployment where each contract's address is derived from its position
    fn mock_deployment() -> DeployedContracts {
        let mut deployed = DeployedContracts::default();
        for (i, contract) in CnsContract::DEPLOY_ORDER.iter().enumerate() {
            deployed.insert(*contract, Address::repeat_byte(i as u8 + 1));
        }
        deployed
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("web3"), ("web3", ""));
        assert_eq!(split_name("addr.reverse"), ("addr", "reverse"));
    }

    #[test]
    fn test_plan_order() {
        let deployed = mock_deployment();
        let deployer = Address::repeat_byte(0xde);
        let plan = SetupPlan::new(&deployed, deployer, DEFAULT_TLD).unwrap();

        let addr = |c| deployed.get(c).unwrap();
        let controller = addr(CnsContract::RegistrarController);
        assert_eq!(
            plan.steps,
            vec![
                SetupStep::SetSubnodeOwner {
                    name: "web3".to_string(),
                    owner: addr(CnsContract::BaseRegistrar),
                },
                SetupStep::SetSubnodeOwner {
                    name: "reverse".to_string(),
                    owner: deployer,
                },
                SetupStep::SetSubnodeOwner {
                    name: "addr.reverse".to_string(),
                    owner: addr(CnsContract::ReverseRegistrar),
                },
                SetupStep::AddRegistrarController { controller },
                SetupStep::AddRegistrarController {
                    controller: addr(CnsContract::NameWrapper),
                },
                SetupStep::SetWrapperController { controller },
                SetupStep::SetDefaultResolver {
                    resolver: addr(CnsContract::PublicResolver),
                },
                SetupStep::SetReverseController { controller },
            ]
        );
    }

    #[test]
    fn test_plan_requires_full_deployment() {
        let mut deployed = DeployedContracts::default();
        deployed.insert(CnsContract::EnsRegistry, Address::repeat_byte(1));

        let res = SetupPlan::new(&deployed, Address::ZERO, DEFAULT_TLD);
        assert!(res.is_err());
    }

    #[test]
    fn test_custom_tld() {
        let plan = SetupPlan::new(&mock_deployment(), Address::ZERO, "cfx").unwrap();

        assert_eq!(
            plan.steps[0].to_string(),
            format!("set owner of `cfx` to {:#x}", Address::repeat_byte(3))
        );
    }

    #[tokio::test]
    async fn test_setup_skips_applied_steps() {
        let Some((_anvil, deployer)) = spawn_devnet().await else {
            return;
        };

        let mut deployed = mock_deployment();
        for contract in [
            CnsContract::EnsRegistry,
            CnsContract::BaseRegistrar,
            CnsContract::NameWrapper,
            CnsContract::ReverseRegistrar,
        ] {
            deployed.insert(contract, deploy_standin(&deployer).await);
        }
        let addr = |c| deployed.get(c).unwrap();

        // Apply the name wrapper controller step ahead of the plan
        let registrar =
            BaseRegistrar::new(addr(CnsContract::BaseRegistrar), deployer.client.clone());
        let tx = registrar.addController(addr(CnsContract::NameWrapper));
        send_tx(tx, deployer.confirmations, "addController").await.unwrap();

        let plan = SetupPlan::new(&deployed, deployer.address, DEFAULT_TLD).unwrap();
        let start = nonce(&deployer).await;
        plan.execute(&deployer).await.unwrap();
        assert_eq!(nonce(&deployer).await, start + plan.steps.len() as u64 - 1);

        let registry = ENSRegistry::new(addr(CnsContract::EnsRegistry), deployer.client.clone());
        let owner = registry.owner(namehash("addr.reverse")).call().await.unwrap()._0;
        assert_eq!(owner, addr(CnsContract::ReverseRegistrar));
        let reverse =
            ReverseRegistrar::new(addr(CnsContract::ReverseRegistrar), deployer.client.clone());
        let resolver = reverse.defaultResolver().call().await.unwrap()._0;
        assert_eq!(resolver, addr(CnsContract::PublicResolver));

        // Every step is now in effect, so a second run sends nothing
        plan.execute(&deployer).await.unwrap();
        assert_eq!(nonce(&deployer).await, start + plan.steps.len() as u64 - 1);
    }
}
