//! Definitions of CLI arguments and commands for deploy scripts

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy, deploy_all, register, setup},
    config::DeployConfig,
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_PATH, DEFAULT_NUM_CONFIRMATIONS, DEFAULT_PKEY,
        DEFAULT_RPC_URL, DEFAULT_TLD,
    },
    errors::ScriptError,
    registration::RegistrationArgs,
    types::CnsContract,
    utils::Deployer,
};

/// Deploy and configure the CNS naming system contracts on an EVM chain
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", default_value = DEFAULT_PKEY)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Path to a `deployments.json` file
    #[arg(short, long, env = "DEPLOYMENTS_PATH", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: String,

    /// Number of confirmations to wait for on each transaction
    #[arg(long, default_value_t = DEFAULT_NUM_CONFIRMATIONS)]
    pub confirmations: u64,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy every contract, wire them together, and optionally register a name
    DeployAll(DeployAllArgs),
    /// Deploy a single contract
    Deploy(DeployArgs),
    /// Wire already deployed contracts together
    Setup(SetupArgs),
    /// Register a name through the deployed registrar controller
    Register(RegisterArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, deployer: Deployer, deployments_path: &str) -> Result<(), ScriptError> {
        match self {
            Command::DeployAll(args) => deploy_all(args, &deployer, deployments_path).await,
            Command::Deploy(args) => deploy(args, &deployer, deployments_path).await,
            Command::Setup(args) => setup(args, &deployer, deployments_path).await,
            Command::Register(args) => register(args, &deployer, deployments_path).await,
        }
    }
}

/// Deploy the whole naming system.
///
/// Contracts are deployed in dependency order and recorded in the deployments
/// file as they land, after which the wiring transactions are applied.
#[derive(Args)]
pub struct DeployAllArgs {
    /// Directory holding the Hardhat compilation artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: String,

    /// The deployment parameters
    #[command(flatten)]
    pub config: DeployConfig,

    /// Keep the contracts already recorded in the deployments file, deploying
    /// only the missing ones
    #[arg(long)]
    pub resume: bool,

    /// A label to register once the system is set up, as a smoke test
    #[arg(long)]
    pub register: Option<String>,

    /// The registration options, used with `--register`
    #[command(flatten)]
    pub registration: RegistrationArgs,
}

/// Deploy one contract, reading the addresses it depends on from the deployments file
#[derive(Args)]
pub struct DeployArgs {
    /// The contract to deploy
    #[arg(short, long)]
    pub contract: CnsContract,

    /// Directory holding the Hardhat compilation artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: String,

    /// The deployment parameters
    #[command(flatten)]
    pub config: DeployConfig,
}

/// Apply the wiring transactions to the contracts in the deployments file
#[derive(Args)]
pub struct SetupArgs {
    /// The top level domain managed by the base registrar
    #[arg(long, default_value = DEFAULT_TLD)]
    pub tld: String,
}

/// Run the commit/reveal registration of a name
#[derive(Args)]
pub struct RegisterArgs {
    /// The label to register
    pub label: String,

    /// The top level domain managed by the base registrar
    #[arg(long, default_value = DEFAULT_TLD)]
    pub tld: String,

    /// The registration options
    #[command(flatten)]
    pub registration: RegistrationArgs,
}
