//! Scripts for deploying, wiring and smoke testing the CNS naming system contracts.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod namehash;
pub mod registration;
pub mod setup;
mod solidity;
#[cfg(test)]
mod test_helpers;
pub mod types;
pub mod utils;
