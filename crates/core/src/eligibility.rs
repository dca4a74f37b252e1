//! The eligibility proof flow: generate a zero-knowledge proof of a user's
//! average balance, then submit it to the eligibility contract through the
//! policy gate. If proving fails, nothing is submitted.

use std::path::PathBuf;

use airdrop_common::args::CliArgs;
use alloy::{
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use alloy_primitives::{Address, B256, Bytes, TxHash, U256};
use clap::{Parser, ValueHint};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use policy_gate_client::PolicyClient;
use prover_client::{ProveRequest, ProverClient};
use serde_json::json;
use tokio::time::Duration;
use url::Url;

use crate::{
    DEFAULT_CHAIN_ID, DEFAULT_POLICY_ADDRESS, DEFAULT_POLICY_SIGN_URL, DEFAULT_RPC_URL,
    calls,
    deployment::{DeploymentManifest, run_latest_path},
    error::FlowError,
    sequencer::{ApprovalGate, NonceTracker, RpcSubmitter, Submitter, TxSequencer},
};

/// Proving capability as the flow sees it: kick off a job, wait for the
/// artifact. Implemented by the real prover client and by stubs in tests.
#[allow(async_fn_in_trait)]
pub trait EligibilityProver {
    async fn prove(&self, request: &ProveRequest) -> Result<B256, FlowError>;
    async fn wait_for_result(&self, handle: B256) -> Result<Bytes, FlowError>;
}

impl EligibilityProver for ProverClient {
    async fn prove(&self, request: &ProveRequest) -> Result<B256, FlowError> {
        Ok(ProverClient::prove(self, request).await?)
    }

    async fn wait_for_result(&self, handle: B256) -> Result<Bytes, FlowError> {
        Ok(ProverClient::wait_for_result(self, handle).await?)
    }
}

/// Generate a proof and submit it on-chain, strictly in that order.
///
/// A proving failure returns before any transaction is prepared, so nothing
/// reaches the gate or the node.
pub async fn generate_and_submit<Pr, G, S>(
    prover: &Pr,
    sequencer: &mut TxSequencer<G, S>,
    eligibility: Address,
    request: &ProveRequest,
    user: Address,
    average_balance: U256,
) -> Result<TxHash, FlowError>
where
    Pr: EligibilityProver,
    G: ApprovalGate,
    S: Submitter,
{
    let handle = prover.prove(request).await?;
    let proof = prover.wait_for_result(handle).await?;

    sequencer
        .send_gated(calls::submit_proof_tx(
            eligibility,
            proof,
            user,
            average_balance,
        ))
        .await
}

/// Arguments for generating and submitting an eligibility proof.
#[derive(Debug, Parser)]
#[clap(
    name = "prove",
    about = "Generate a zero-knowledge eligibility proof and submit it on-chain",
    long_about = "Resolve the prover and eligibility contracts from the broadcast \
                  manifest, ask the proving service to prove the user's average \
                  balance, wait for the result and submit the proof through the \
                  policy gate."
)]
pub struct ProveArgs {
    /// JSON-RPC endpoint of the chain
    #[clap(long, env = "RPC_URL", value_hint = ValueHint::Url, default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Signing key for the sender account
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// URL of the proving service
    #[clap(long, env = "PROVER_URL", value_hint = ValueHint::Url)]
    pub prover_url: String,

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

    /// Deploy script that produced the manifest
    #[clap(long, default_value = "Deploy.s.sol")]
    pub deploy_script: String,

    /// Contract name of the prover contract in the manifest
    #[clap(long, default_value = "AverageBalance")]
    pub prover_contract: String,

    /// Contract name of the eligibility contract in the manifest
    #[clap(long, default_value = "Eligibility")]
    pub eligibility_contract: String,

    /// User the proof is generated for
    #[clap(long, env = "USER_ADDRESS")]
    pub user: Address,
}

impl ProveArgs {
    /// Creates and configures a progress spinner for displaying operation status.
    fn create_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner} {msg}")
                .expect("Failed to set spinner style"),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    pub async fn run(&self, cli_args: &CliArgs) -> Result<(), FlowError> {
        let verbose = !cli_args.json_output();

        let manifest = DeploymentManifest::load(&run_latest_path(
            &self.broadcast_root,
            &self.deploy_script,
            self.chain_id,
        ))?;
        let prover_contract = manifest.address_of(&self.prover_contract)?;
        let eligibility = manifest.address_of(&self.eligibility_contract)?;

        if verbose {
            println!("Prover contract:      {}", prover_contract.to_string().cyan());
            println!("Eligibility contract: {}", eligibility.to_string().cyan());
        }

        let signer: PrivateKeySigner = self
            .private_key
            .parse()
            .map_err(|e| FlowError::SigningKey(format!("{e}")))?;
        let sender = signer.address();

        let rpc_url: Url = self.rpc_url.parse()?;
        let provider = ProviderBuilder::new().wallet(signer).connect_http(rpc_url);

        let average_balance = {
            let out = provider
                .call(calls::average_balance_call(prover_contract, self.user))
                .await
                .map_err(|e| FlowError::Rpc(e.to_string()))?;
            calls::decode_average_balance(&out).map_err(|e| FlowError::Rpc(e.to_string()))?
        };

        let start_nonce = provider
            .get_transaction_count(sender)
            .await
            .map_err(|e| FlowError::Rpc(e.to_string()))?;

        let gate = PolicyClient::new(&self.policy_url, self.policy_address)?;
        let mut sequencer = TxSequencer::new(
            gate,
            RpcSubmitter::new(provider),
            sender,
            NonceTracker::new(start_nonce),
        );

        let prover = ProverClient::new(&self.prover_url)?;
        let request = ProveRequest {
            address: prover_contract,
            function_name: "averageBalanceOf".to_string(),
            args: vec![json!(self.user)],
            chain_id: self.chain_id,
        };

        let spinner = verbose.then(|| {
            let spinner = Self::create_spinner();
            spinner.set_message(format!("Proving average balance of {}...", self.user));
            spinner
        });

        let result = generate_and_submit(
            &prover,
            &mut sequencer,
            eligibility,
            &request,
            self.user,
            average_balance,
        )
        .await;

        if let Some(spinner) = spinner {
            match &result {
                Ok(_) => spinner.finish_with_message("Proof generated and submitted."),
                Err(_) => spinner.finish_with_message("❌ Proof flow failed."),
            }
        }
        let submission = result?;

        if cli_args.json_output() {
            let output = json!({
                "status": "success",
                "prover_contract": prover_contract,
                "eligibility_contract": eligibility,
                "user": self.user,
                "average_balance": average_balance,
                "submit_proof_tx": submission,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        } else {
            println!("\n{}", "Eligibility Proof".bold().green());
            println!("{}", "=================".green());
            println!("Average balance: {average_balance}");
            println!("Submission:      {}", submission.to_string().cyan());
        }

        Ok(())
    }
}
