//! Constants used in the CNS deploy scripts

/// The default RPC URL, that of a local Hardhat or Anvil node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The default private key, the first default account of a Hardhat or Anvil node
pub const DEFAULT_PKEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default directory holding the Hardhat compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The number of confirmations to wait for each transaction by default
pub const DEFAULT_NUM_CONFIRMATIONS: u64 = 1;

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The extension of a Hardhat artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The marker with which unlinked library references begin in Hardhat bytecode
pub const LINK_PLACEHOLDER_MARKER: &str = "__$";

// ------------------
// | Naming system |
// ------------------

/// The default top level domain managed by the base registrar
pub const DEFAULT_TLD: &str = "web3";

/// The label of the reverse record namespace, under the root
pub const REVERSE_LABEL: &str = "reverse";

/// The label of the address reverse namespace, under `reverse`
pub const ADDR_LABEL: &str = "addr";

/// The default URI template served by the static metadata service
pub const DEFAULT_METADATA_URI: &str = "http://a.xyz/{id}.json";

/// The default USD price of the native coin, with 8 decimals
pub const DEFAULT_NATIVE_USD_PRICE: u128 = 2000 * 100_000_000;

/// The default yearly rent in USD, indexed by label length bucket
pub const DEFAULT_USD_PRICES_PER_YEAR: [u64; 6] = [100_000, 10_000, 1_000, 100, 10, 1];

/// The number of decimals of the USD amounts handed to the price oracle
pub const USD_DECIMALS: u32 = 18;

/// The number of seconds in a (non-leap) year
pub const SECONDS_PER_YEAR: u64 = 3600 * 24 * 365;

/// The default minimum age of a registration commitment, in seconds
pub const DEFAULT_MIN_COMMITMENT_AGE: u64 = 120;

/// The default maximum age of a registration commitment, in seconds
pub const DEFAULT_MAX_COMMITMENT_AGE: u64 = 3600 * 10;

/// The default number of blocks mined on a devnet while waiting out a commitment
pub const DEFAULT_MINE_BLOCKS: u64 = 1000;

// -------------------
// | Devnet RPC calls |
// -------------------

/// Advances the timestamp of the next block on Hardhat & Anvil nodes
pub const EVM_INCREASE_TIME_METHOD: &str = "evm_increaseTime";

/// Mines a number of blocks on a Hardhat node
pub const HARDHAT_MINE_METHOD: &str = "hardhat_mine";

/// Mines a number of blocks on an Anvil node
pub const ANVIL_MINE_METHOD: &str = "anvil_mine";

/// The seconds between the timestamps of blocks mined on a devnet
pub const MINE_BLOCK_INTERVAL: u64 = 1;
