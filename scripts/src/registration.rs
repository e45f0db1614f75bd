//! The commit/reveal registration of a name, run as a smoke test of a deployment

use std::time::Duration;

use alloy::{
    primitives::{Address, Bytes, B256, U256},
    providers::DynProvider,
};
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use crate::{
    constants::{
        ANVIL_MINE_METHOD, DEFAULT_MINE_BLOCKS, EVM_INCREASE_TIME_METHOD, HARDHAT_MINE_METHOD,
        MINE_BLOCK_INTERVAL, SECONDS_PER_YEAR,
    },
    errors::ScriptError,
    namehash::namehash,
    solidity::{ENSRegistry, RegistrarController},
    types::{CnsContract, DeployedContracts},
    utils::{call_helper, devnet_rpc, send_tx, Deployer},
};

/// How to let a commitment age before revealing it
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdvanceStrategy {
    /// Increase the time and mine blocks on a Hardhat node
    Hardhat,
    /// Increase the time and mine blocks on an Anvil node
    Anvil,
    /// Sleep in real time, for networks without devnet RPC methods
    Wait,
}

/// Options of the registration smoke test
#[derive(Args, Clone, Debug)]
pub struct RegistrationArgs {
    /// The registration duration, in seconds
    #[arg(long, default_value_t = SECONDS_PER_YEAR)]
    pub duration: u64,

    /// The commitment secret, in hex. A random secret is used if not given
    #[arg(long)]
    pub secret: Option<B256>,

    /// The owner of the registered name. Defaults to the deployer
    #[arg(long)]
    pub owner: Option<Address>,

    /// How to wait out the minimum commitment age
    #[arg(long, value_enum, default_value_t = AdvanceStrategy::Hardhat)]
    pub advance: AdvanceStrategy,

    /// The number of blocks to mine on a devnet after committing
    #[arg(long, default_value_t = DEFAULT_MINE_BLOCKS)]
    pub mine_blocks: u64,
}

/// The parameters of a registration, committed to and then revealed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// The label to register under the top level domain
    pub label: String,
    /// The owner of the name
    pub owner: Address,
    /// The registration duration, in seconds
    pub duration: u64,
    /// The commitment secret
    pub secret: B256,
    /// The resolver set on the name
    pub resolver: Address,
    /// Calls made to the resolver while registering
    pub data: Vec<Bytes>,
    /// Whether to set the reverse record of the owner
    pub reverse_record: bool,
    /// The fuses burned on the wrapped name
    pub fuses: u32,
    /// The expiry of the wrapped name
    pub wrapper_expiry: u64,
}

impl Registration {
    /// Build the registration of `label`, resolving to `resolver`
    pub fn new(label: &str, resolver: Address, owner: Address, args: &RegistrationArgs) -> Self {
        Self {
            label: label.to_string(),
            owner,
            duration: args.duration,
            secret: args.secret.unwrap_or_else(B256::random),
            resolver,
            data: vec![],
            reverse_record: true,
            fuses: 0,
            wrapper_expiry: args.duration,
        }
    }

    /// Check the parameters before anything is sent to the controller
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.label.is_empty() || self.label.contains('.') {
            return Err(ScriptError::Registration(format!(
                "`{}` is not a single label",
                self.label
            )));
        }

        Ok(())
    }
}

/// Register `label` under `tld` through the deployed registrar controller,
/// then check that the name landed in the name wrapper
pub async fn register_name(
    label: &str,
    tld: &str,
    args: &RegistrationArgs,
    deployed: &DeployedContracts,
    deployer: &Deployer,
) -> Result<(), ScriptError> {
    let resolver = deployed.get(CnsContract::PublicResolver)?;
    let controller_address = deployed.get(CnsContract::RegistrarController)?;
    let registry_address = deployed.get(CnsContract::EnsRegistry)?;
    let name_wrapper = deployed.get(CnsContract::NameWrapper)?;

    let owner = args.owner.unwrap_or(deployer.address);
    let registration = Registration::new(label, resolver, owner, args);
    registration.validate()?;

    let name = format!("{label}.{tld}");
    let controller = RegistrarController::new(controller_address, deployer.client.clone());
    let registry = ENSRegistry::new(registry_address, deployer.client.clone());

    // Check the name can be bought
    let valid = call_helper(controller.valid(label.to_string()), "valid").await?._0;
    info!("`{label}` valid: {valid}");
    if !valid {
        return Err(ScriptError::Registration(format!("`{label}` is not a valid label")));
    }

    let available = call_helper(controller.available(label.to_string()), "available").await?._0;
    info!("`{name}` available: {available}");
    if !available {
        return Err(ScriptError::Registration(format!("`{name}` is not available")));
    }

    let duration = U256::from(registration.duration);
    let price = call_helper(
        controller.rentPrice(label.to_string(), duration),
        "rentPrice",
    )
    .await?
    .price;
    let value = price.base + price.premium;
    info!("`{name}` price: {} (base {}, premium {})", value, price.base, price.premium);

    let min_age = call_helper(controller.minCommitmentAge(), "minCommitmentAge")
        .await?
        ._0
        .saturating_to::<u64>();
    let max_age = call_helper(controller.maxCommitmentAge(), "maxCommitmentAge")
        .await?
        ._0
        .saturating_to::<u64>();
    check_commitment_window(args.advance, min_age, max_age, args.mine_blocks)?;

    // Commit
    let commitment = call_helper(
        controller.makeCommitment(
            registration.label.clone(),
            registration.owner,
            duration,
            registration.secret,
            registration.resolver,
            registration.data.clone(),
            registration.reverse_record,
            registration.fuses,
            registration.wrapper_expiry,
        ),
        "makeCommitment",
    )
    .await?
    ._0;

    let receipt = send_tx(
        controller.commit(commitment),
        deployer.confirmations,
        "commit",
    )
    .await?;
    info!("Committed {commitment:#x} (tx {:#x})", receipt.transaction_hash);

    // Let the commitment age
    advance_time(
        &deployer.client,
        args.advance,
        min_age.saturating_add(1),
        args.mine_blocks,
    )
    .await?;

    // Reveal
    let tx = controller
        .register(
            registration.label.clone(),
            registration.owner,
            duration,
            registration.secret,
            registration.resolver,
            registration.data.clone(),
            registration.reverse_record,
            registration.fuses,
            registration.wrapper_expiry,
        )
        .value(value);
    let receipt = send_tx(tx, deployer.confirmations, "register").await?;
    info!("Registered `{name}` to {owner:#x} (tx {:#x})", receipt.transaction_hash);

    // Registered names are wrapped, so the wrapper owns them in the registry
    let registry_owner = call_helper(registry.owner(namehash(&name)), "owner").await?._0;
    if registry_owner != name_wrapper {
        return Err(ScriptError::Registration(format!(
            "`{name}` is owned by {registry_owner:#x} in the registry, expected the name wrapper at {name_wrapper:#x}"
        )));
    }

    Ok(())
}

/// Check that waiting out the minimum commitment age with the given strategy
/// does not also outlive the maximum commitment age.
///
/// Devnet strategies mine `mine_blocks` blocks after increasing the time, each
/// of which moves the clock forward by `MINE_BLOCK_INTERVAL`.
pub fn check_commitment_window(
    strategy: AdvanceStrategy,
    min_age: u64,
    max_age: u64,
    mine_blocks: u64,
) -> Result<(), ScriptError> {
    let mut elapsed = min_age.saturating_add(1);
    if strategy != AdvanceStrategy::Wait {
        elapsed = elapsed.saturating_add(mine_blocks.saturating_mul(MINE_BLOCK_INTERVAL));
    }

    if elapsed >= max_age {
        return Err(ScriptError::Registration(format!(
            "waiting {elapsed}s would expire the commitment (max age {max_age}s), mine fewer blocks"
        )));
    }

    Ok(())
}

/// Let at least `seconds` elapse on-chain, using the given strategy
pub async fn advance_time(
    client: &DynProvider,
    strategy: AdvanceStrategy,
    seconds: u64,
    blocks: u64,
) -> Result<(), ScriptError> {
    match strategy {
        AdvanceStrategy::Hardhat | AdvanceStrategy::Anvil => {
            let mine_method = if strategy == AdvanceStrategy::Hardhat {
                HARDHAT_MINE_METHOD
            } else {
                ANVIL_MINE_METHOD
            };

            devnet_rpc(client, EVM_INCREASE_TIME_METHOD, (seconds,)).await?;
            let mine_params = (format!("{blocks:#x}"), format!("{MINE_BLOCK_INTERVAL:#x}"));
            devnet_rpc(client, mine_method, mine_params).await?;
            info!("Advanced time by {seconds}s and mined {blocks} blocks");
        }
        AdvanceStrategy::Wait => {
            warn!("Waiting {seconds}s for the commitment to age");
            tokio::time::sleep(Duration::from_secs(seconds)).await;
        }
    }

    Ok(())
}
