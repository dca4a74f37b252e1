//! The airdrop campaign flow: approve token spend, create a campaign, claim a
//! reward. Strictly sequential; campaign creation and the claim go through the
//! policy gate, the token approval is submitted directly.

use std::path::PathBuf;

use airdrop_common::args::CliArgs;
use alloy::{
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use alloy_primitives::{Address, TxHash, U256};
use chrono::Utc;
use clap::{Parser, ValueHint};
use colored::Colorize;
use policy_gate_client::PolicyClient;
use serde_json::json;
use url::Url;

use crate::{
    DEFAULT_CHAIN_ID, DEFAULT_POLICY_ADDRESS, DEFAULT_POLICY_SIGN_URL, DEFAULT_RPC_URL,
    calls::{self, CampaignTerms},
    deployment::{DeploymentManifest, run_latest_path},
    error::FlowError,
    sequencer::{NonceTracker, RpcSubmitter, TxSequencer},
};

/// Arguments for running the airdrop campaign flow end to end.
#[derive(Debug, Parser)]
#[clap(
    name = "campaign",
    about = "Approve token spend, create an airdrop campaign and claim a reward",
    long_about = "Resolve the airdrop manager and mock token from broadcast manifests, \
                  approve the manager to spend the token, then create a campaign and \
                  claim a reward, routing the gated transactions through the policy gate."
)]
pub struct CampaignArgs {
    /// JSON-RPC endpoint of the chain
    #[clap(long, env = "RPC_URL", value_hint = ValueHint::Url, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Signing key for the sender account
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Sign endpoint of the policy gate
    #[clap(long, env = "POLICY_SIGN_URL", value_hint = ValueHint::Url, default_value = DEFAULT_POLICY_SIGN_URL)]
    pub policy_url: String,

    /// On-chain policy the gate checks transactions against
    #[clap(long, env = "POLICY_ADDRESS", default_value = DEFAULT_POLICY_ADDRESS)]
    pub policy_address: Address,

    /// Chain id the deployment was broadcast to
    #[clap(long, default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Root directory of the deploy tool's broadcast artifacts
    #[clap(long, value_hint = ValueHint::DirPath, default_value = "broadcast")]
    pub broadcast_root: PathBuf,

    /// Deploy script that produced the airdrop manager manifest
    #[clap(long, default_value = "Deploy.s.sol")]
    pub deploy_script: String,

    /// Deploy script that produced the mock token manifest
    #[clap(long, default_value = "DeployMock.s.sol")]
    pub mock_script: String,

    /// Contract name of the airdrop manager in the manifest
    #[clap(long, default_value = "AirdropManager")]
    pub manager_contract: String,

    /// Total rewards funded into the campaign, in wei
    #[clap(long, default_value = "1000000000000000000000")]
    pub total_rewards: U256,

    /// Maximum number of campaign participants
    #[clap(long, default_value_t = 100)]
    pub max_participants: u64,

    /// Campaign duration in seconds
    #[clap(long, default_value_t = 86_400)]
    pub duration_secs: u64,

    /// Campaign id to claim from
    #[clap(long, default_value_t = 1)]
    pub campaign_id: u64,
}

/// Transaction hashes produced by one campaign run.
#[derive(Debug)]
struct CampaignRun {
    manager: Address,
    reward_token: Address,
    start_nonce: u64,
    approve: TxHash,
    create: TxHash,
    claim: TxHash,
}

impl CampaignArgs {
    /// Campaign terms for a window opening now.
    fn campaign_terms(&self, reward_token: Address, now: u64) -> CampaignTerms {
        CampaignTerms {
            reward_token,
            total_rewards: self.total_rewards,
            max_participants: U256::from(self.max_participants),
            start_time: U256::from(now),
            end_time: U256::from(now + self.duration_secs),
            // The mock deployment reuses the token as the criteria contract.
            criteria_logic: reward_token,
        }
    }

    pub async fn run(&self, cli_args: &CliArgs) -> Result<(), FlowError> {
        let verbose = !cli_args.json_output();

        let manager = DeploymentManifest::load(&run_latest_path(
            &self.broadcast_root,
            &self.deploy_script,
            self.chain_id,
        ))?
        .address_of(&self.manager_contract)?;

        let reward_token = DeploymentManifest::load(&run_latest_path(
            &self.broadcast_root,
            &self.mock_script,
            self.chain_id,
        ))?
        .anonymous_address()?;

        let signer: PrivateKeySigner = self
            .private_key
            .parse()
            .map_err(|e| FlowError::SigningKey(format!("{e}")))?;
        let sender = signer.address();

        let rpc_url: Url = self.rpc_url.parse()?;
        let provider = ProviderBuilder::new().wallet(signer).connect_http(rpc_url);

        let start_nonce = provider
            .get_transaction_count(sender)
            .await
            .map_err(|e| FlowError::Rpc(e.to_string()))?;

        if verbose {
            println!("Airdrop manager: {}", manager.to_string().cyan());
            println!("Reward token:    {}", reward_token.to_string().cyan());
            println!("Sender:          {}", sender.to_string().cyan());
            println!("Current nonce:   {start_nonce}");
        }

        let gate = PolicyClient::new(&self.policy_url, self.policy_address)?;
        let mut sequencer = TxSequencer::new(
            gate,
            RpcSubmitter::new(provider),
            sender,
            NonceTracker::new(start_nonce),
        );

        if verbose {
            println!("Approving the airdrop manager to spend the reward token...");
        }
        let approve = sequencer
            .send(calls::approve_tx(reward_token, manager, self.total_rewards))
            .await?;

        if verbose {
            println!("Getting policy approval for campaign creation...");
        }
        let now = Utc::now().timestamp() as u64;
        let create = sequencer
            .send_gated(calls::create_campaign_tx(
                manager,
                &self.campaign_terms(reward_token, now),
            ))
            .await?;

        if verbose {
            println!("Getting policy approval for the claim...");
        }
        let claim = sequencer
            .send_gated(calls::claim_reward_tx(
                manager,
                U256::from(self.campaign_id),
            ))
            .await?;

        self.display_run(
            &CampaignRun {
                manager,
                reward_token,
                start_nonce,
                approve,
                create,
                claim,
            },
            cli_args.json_output(),
        );

        Ok(())
    }

    fn display_run(&self, run: &CampaignRun, json_output: bool) {
        if json_output {
            let output = json!({
                "status": "success",
                "airdrop_manager": run.manager,
                "reward_token": run.reward_token,
                "start_nonce": run.start_nonce,
                "approve_tx": run.approve,
                "create_campaign_tx": run.create,
                "claim_reward_tx": run.claim,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        } else {
            println!("\n{}", "Campaign Run".bold().green());
            println!("{}", "============".green());
            println!("Approve:         {}", run.approve.to_string().cyan());
            println!("Campaign created: {}", run.create.to_string().cyan());
            println!("Reward claimed:   {}", run.claim.to_string().cyan());
        }
    }
}
