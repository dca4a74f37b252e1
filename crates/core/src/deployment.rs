//! Resolution of contract addresses from Foundry broadcast artifacts.
//!
//! A deploy script leaves a manifest at
//! `<broadcast-root>/<script>/<chain-id>/run-latest.json` listing the
//! transactions it sent. Named contracts are looked up by `contractName`;
//! anonymously deployed mocks are the records without one. The manifest is
//! consumed read-only and first match wins, in file order.

use std::{
    fs,
    path::{Path, PathBuf},
};

use airdrop_common::args::CliArgs;
use alloy_primitives::Address;
use clap::{Parser, ValueHint};
use colored::Colorize;
use serde::Deserialize;
use serde_json::json;

use crate::error::DeploymentError;

/// One transaction entry in a broadcast manifest. Deploy tools write many more
/// fields; only the two used for resolution are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub contract_address: Option<Address>,
}

/// Ordered list of deployment records from one broadcast run.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentManifest {
    pub transactions: Vec<DeploymentRecord>,
}

/// Path of the latest broadcast manifest for a deploy script on a chain.
pub fn run_latest_path(broadcast_root: &Path, script: &str, chain_id: u64) -> PathBuf {
    broadcast_root
        .join(script)
        .join(chain_id.to_string())
        .join("run-latest.json")
}

impl DeploymentManifest {
    /// Load and parse a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, DeploymentError> {
        let raw = fs::read_to_string(path).map_err(|source| DeploymentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| DeploymentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Address of the first record deployed under the given contract name.
    pub fn address_of(&self, name: &str) -> Result<Address, DeploymentError> {
        self.transactions
            .iter()
            .find(|record| record.contract_name.as_deref() == Some(name))
            .and_then(|record| record.contract_address)
            .ok_or_else(|| DeploymentError::MissingContractAddress(name.to_string()))
    }

    /// Address of the first record deployed without a contract name.
    pub fn anonymous_address(&self) -> Result<Address, DeploymentError> {
        self.transactions
            .iter()
            .find(|record| record.contract_name.is_none() && record.contract_address.is_some())
            .and_then(|record| record.contract_address)
            .ok_or(DeploymentError::MissingAnonymousAddress)
    }
}

/// Arguments for resolving a contract address from a broadcast manifest.
#[derive(Debug, Parser)]
#[clap(
    name = "resolve",
    about = "Resolve a contract address from a broadcast manifest"
)]
pub struct ResolveArgs {
    /// Root directory of the deploy tool's broadcast artifacts
    #[clap(long, value_hint = ValueHint::DirPath, default_value = "broadcast")]
    pub broadcast_root: PathBuf,

    /// Deploy script the manifest was produced by
    #[clap(long, default_value = "Deploy.s.sol")]
    pub script: String,

    /// Chain id of the deployment
    #[clap(long, default_value_t = crate::DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Contract name to resolve; omit to resolve the first anonymous record
    #[clap(value_name = "CONTRACT_NAME")]
    pub contract_name: Option<String>,
}

impl ResolveArgs {
    pub fn run(&self, cli_args: &CliArgs) -> Result<(), DeploymentError> {
        let path = run_latest_path(&self.broadcast_root, &self.script, self.chain_id);
        let manifest = DeploymentManifest::load(&path)?;

        let address = match &self.contract_name {
            Some(name) => manifest.address_of(name)?,
            None => manifest.anonymous_address()?,
        };

        if cli_args.json_output() {
            println!(
                "{}",
                json!({
                    "status": "success",
                    "contract_name": self.contract_name,
                    "contract_address": address,
                })
            );
        } else {
            let label = self.contract_name.as_deref().unwrap_or("<anonymous>");
            println!("{}: {}", label.bold(), address.to_string().cyan());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn manifest_from(json: &str) -> DeploymentManifest {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        DeploymentManifest::load(file.path()).unwrap()
    }

    #[test]
    fn resolves_named_contract() {
        let manifest = manifest_from(
            r#"{"transactions":[{"contractName":"AirdropManager","contractAddress":"0x00000000000000000000000000000000000000aa"}]}"#,
        );

        let address = manifest.address_of("AirdropManager").unwrap();
        assert_eq!(
            address,
            "0x00000000000000000000000000000000000000aa"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn missing_contract_is_an_error() {
        let manifest = manifest_from(
            r#"{"transactions":[{"contractName":"Other","contractAddress":"0x00000000000000000000000000000000000000aa"}]}"#,
        );

        let result = manifest.address_of("AirdropManager");
        match result.unwrap_err() {
            DeploymentError::MissingContractAddress(name) => {
                assert_eq!(name, "AirdropManager");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn first_match_wins_in_file_order() {
        let manifest = manifest_from(
            r#"{"transactions":[
                {"contractName":"AirdropManager","contractAddress":"0x00000000000000000000000000000000000000aa"},
                {"contractName":"AirdropManager","contractAddress":"0x00000000000000000000000000000000000000bb"}
            ]}"#,
        );

        let address = manifest.address_of("AirdropManager").unwrap();
        assert_eq!(
            address,
            "0x00000000000000000000000000000000000000aa"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn resolves_anonymous_record() {
        let manifest = manifest_from(
            r#"{"transactions":[
                {"contractName":"AirdropManager","contractAddress":"0x00000000000000000000000000000000000000aa"},
                {"contractName":null,"contractAddress":"0x00000000000000000000000000000000000000cc"}
            ]}"#,
        );

        let address = manifest.anonymous_address().unwrap();
        assert_eq!(
            address,
            "0x00000000000000000000000000000000000000cc"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn no_anonymous_record_is_an_error() {
        let manifest = manifest_from(
            r#"{"transactions":[{"contractName":"AirdropManager","contractAddress":"0x00000000000000000000000000000000000000aa"}]}"#,
        );

        assert!(matches!(
            manifest.anonymous_address().unwrap_err(),
            DeploymentError::MissingAnonymousAddress
        ));
    }

    #[test]
    fn records_without_address_are_skipped() {
        let manifest = manifest_from(
            r#"{"transactions":[
                {"contractName":null,"contractAddress":null},
                {"contractName":null,"contractAddress":"0x00000000000000000000000000000000000000cc"}
            ]}"#,
        );

        let address = manifest.anonymous_address().unwrap();
        assert_eq!(
            address,
            "0x00000000000000000000000000000000000000cc"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn unknown_manifest_fields_are_ignored() {
        let manifest = manifest_from(
            r#"{"transactions":[{
                "hash":"0x1234",
                "transactionType":"CREATE",
                "contractName":"AirdropManager",
                "contractAddress":"0x00000000000000000000000000000000000000aa",
                "function":null
            }]}"#,
        );

        assert!(manifest.address_of("AirdropManager").is_ok());
    }

    #[test]
    fn malformed_manifest_is_a_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"transactions\": 42}").unwrap();

        let result = DeploymentManifest::load(file.path());
        assert!(matches!(
            result.unwrap_err(),
            DeploymentError::Parse { .. }
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = DeploymentManifest::load(Path::new("/nonexistent/run-latest.json"));
        assert!(matches!(result.unwrap_err(), DeploymentError::Io { .. }));
    }

    #[test]
    fn run_latest_path_follows_convention() {
        let path = run_latest_path(Path::new("broadcast"), "Deploy.s.sol", 84532);
        assert_eq!(
            path,
            PathBuf::from("broadcast/Deploy.s.sol/84532/run-latest.json")
        );
    }
}
