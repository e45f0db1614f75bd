//! The tunable parameters of a naming system deployment

use alloy::primitives::{B256, U256};
use clap::Args;
use itertools::Itertools;
use tracing::info;

use crate::{
    constants::{
        DEFAULT_MAX_COMMITMENT_AGE, DEFAULT_METADATA_URI, DEFAULT_MIN_COMMITMENT_AGE,
        DEFAULT_NATIVE_USD_PRICE, DEFAULT_TLD, DEFAULT_USD_PRICES_PER_YEAR, SECONDS_PER_YEAR,
        USD_DECIMALS,
    },
    errors::ScriptError,
    namehash::{labelhash, namehash},
};

/// Parameters passed to the contract constructors and used when wiring the contracts
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct DeployConfig {
    /// The top level domain managed by the base registrar
    #[arg(long, default_value = DEFAULT_TLD)]
    pub tld: String,

    /// The URI template served by the static metadata service
    #[arg(long, default_value = DEFAULT_METADATA_URI)]
    pub metadata_uri: String,

    /// The USD price of the native coin reported by the price oracle, with 8 decimals
    #[arg(long, default_value_t = DEFAULT_NATIVE_USD_PRICE)]
    pub native_usd_price: u128,

    /// The yearly rent in whole USD for each label length bucket,
    /// from the shortest labels to the longest
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_USD_PRICES_PER_YEAR)]
    pub usd_prices_per_year: Vec<u64>,

    /// The minimum age, in seconds, of a commitment before it can be revealed
    #[arg(long, default_value_t = DEFAULT_MIN_COMMITMENT_AGE)]
    pub min_commitment_age: u64,

    /// The maximum age, in seconds, of a commitment before it expires
    #[arg(long, default_value_t = DEFAULT_MAX_COMMITMENT_AGE)]
    pub max_commitment_age: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            tld: DEFAULT_TLD.to_string(),
            metadata_uri: DEFAULT_METADATA_URI.to_string(),
            native_usd_price: DEFAULT_NATIVE_USD_PRICE,
            usd_prices_per_year: DEFAULT_USD_PRICES_PER_YEAR.to_vec(),
            min_commitment_age: DEFAULT_MIN_COMMITMENT_AGE,
            max_commitment_age: DEFAULT_MAX_COMMITMENT_AGE,
        }
    }
}

impl DeployConfig {
    /// Check that the configuration is consistent before anything is sent on-chain
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.tld.is_empty() || self.tld.contains('.') {
            return Err(ScriptError::InvalidConfig(format!(
                "`{}` is not a single label",
                self.tld
            )));
        }

        if self.usd_prices_per_year.is_empty() {
            return Err(ScriptError::InvalidConfig(
                "at least one rent price is required".to_string(),
            ));
        }

        if self.min_commitment_age >= self.max_commitment_age {
            return Err(ScriptError::InvalidConfig(format!(
                "min commitment age ({}s) must be below max commitment age ({}s)",
                self.min_commitment_age, self.max_commitment_age
            )));
        }

        Ok(())
    }

    /// The node of the top level domain
    pub fn tld_node(&self) -> B256 {
        namehash(&self.tld)
    }

    /// The label hash of the top level domain, under the root
    pub fn tld_label(&self) -> B256 {
        labelhash(&self.tld)
    }

    /// The rent prices handed to the price oracle: USD per second, with 18 decimals
    pub fn rent_prices_per_second(&self) -> Vec<U256> {
        let scale = U256::from(10).pow(U256::from(USD_DECIMALS));
        let seconds_per_year = U256::from(SECONDS_PER_YEAR);

        self.usd_prices_per_year
            .iter()
            .map(|usd| U256::from(*usd) * scale / seconds_per_year)
            .collect()
    }

    /// Log the configuration
    pub fn log(&self) {
        info!(
            "Deploying `.{}` with yearly rents of [{}] USD, commitment ages {}s..{}s",
            self.tld,
            self.usd_prices_per_year.iter().join(", "),
            self.min_commitment_age,
            self.max_commitment_age,
        );
    }
}
