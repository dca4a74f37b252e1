use std::time::Duration;

use alloy_primitives::{Address, B256, Bytes};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use url::Url;

/// How often a pending proof is polled for its result.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound on polls before a pending proof is considered timed out.
const DEFAULT_MAX_POLLS: u32 = 150;

/// A client for the zero-knowledge proving service.
///
/// The service exposes a JSON-RPC 2.0 interface: `v_call` kicks off a proving
/// job and returns a handle, `v_getProofReceipt` reports the job's status and,
/// once done, the proof artifact. The artifact is opaque to this client and is
/// handed to callers unmodified.
///
/// ``` no_run
/// use prover_client::{ProveRequest, ProverClient};
/// use alloy_primitives::address;
///
/// #[tokio::main]
/// async fn main() {
///     let client = ProverClient::new("http://localhost:3000").unwrap();
///     let handle = client
///         .prove(&ProveRequest {
///             address: address!("00000000000000000000000000000000000000aa"),
///             function_name: "averageBalanceOf".to_string(),
///             args: vec!["0x00000000000000000000000000000000000000bb".into()],
///             chain_id: 84532,
///         })
///         .await
///         .unwrap();
///     let proof = client.wait_for_result(handle).await.unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct ProverClient {
    client: Client,
    base_url: Url,
    poll_interval: Duration,
    max_polls: u32,
    request_id: std::sync::atomic::AtomicU64,
}

#[derive(Debug, thiserror::Error)]
pub enum ProverClientError {
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("JSON-RPC error code {code}: {message}")]
    JsonRpcError { code: i32, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("proving failed: {0}")]
    ProvingFailed(String),
    #[error("proof {0} still pending after {1} polls")]
    TimedOut(B256, u32),
}

/// Arguments for a proving job: which prover contract function to execute and
/// on which chain.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProveRequest {
    pub address: Address,
    pub function_name: String,
    pub args: Vec<serde_json::Value>,
    pub chain_id: u64,
}

/// Status of a proving job as reported by `v_getProofReceipt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProofStatus {
    Queued,
    Running,
    Done,
    Failed,
}

/// Receipt for a proving job. `proof` is only present once the job is done.
#[derive(Debug, Clone, Deserialize)]
pub struct ProofReceipt {
    pub status: ProofStatus,
    pub proof: Option<Bytes>,
    pub error: Option<String>,
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: String,
    method: String,
    params: T,
    id: u64,
}

/// JSON-RPC response structure for successful responses
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    jsonrpc: String,
    result: Option<T>,
    error: Option<JsonRpcError>,
    id: u64,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl ProverClient {
    /// Create a new prover client with default polling behavior.
    pub fn new(prover_url: &str) -> Result<Self, ProverClientError> {
        Self::with_polling(prover_url, DEFAULT_POLL_INTERVAL, DEFAULT_MAX_POLLS)
    }

    /// Create a new prover client with explicit polling behavior.
    pub fn with_polling(
        prover_url: &str,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<Self, ProverClientError> {
        let base_url = Url::parse(prover_url)?;
        let client = Client::new();

        Ok(Self {
            client,
            base_url,
            poll_interval,
            max_polls,
            request_id: std::sync::atomic::AtomicU64::new(1),
        })
    }

    /// Get next request ID
    fn next_request_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }

    /// Make a JSON-RPC request
    async fn make_request<P, R>(&self, method: &str, params: P) -> Result<R, ProverClientError>
    where
        P: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let request_id = self.next_request_id();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: request_id,
        };

        let response = self
            .client
            .post(self.base_url.clone())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProverClientError::InvalidResponse(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let response_body: JsonRpcResponse<R> = response.json().await?;

        // Validate JSON-RPC 2.0 compliance
        if response_body.jsonrpc != "2.0" {
            return Err(ProverClientError::InvalidResponse(format!(
                "Invalid JSON-RPC version: expected '2.0', got '{}'",
                response_body.jsonrpc
            )));
        }

        if response_body.id != request_id {
            return Err(ProverClientError::InvalidResponse(format!(
                "Request/response ID mismatch: expected {}, got {}",
                request_id, response_body.id
            )));
        }

        if let Some(error) = response_body.error {
            return Err(ProverClientError::JsonRpcError {
                code: error.code,
                message: error.message,
            });
        }

        response_body.result.ok_or_else(|| {
            ProverClientError::InvalidResponse("Missing result in successful response".to_string())
        })
    }

    /// Kick off a proving job and return its handle.
    pub async fn prove(&self, request: &ProveRequest) -> Result<B256, ProverClientError> {
        self.make_request("v_call", vec![request]).await
    }

    /// Fetch the receipt for a proving job.
    pub async fn proof_receipt(&self, handle: B256) -> Result<ProofReceipt, ProverClientError> {
        let params = vec![handle.to_string()];
        self.make_request("v_getProofReceipt", params).await
    }

    /// Poll a proving job until it completes and return the proof artifact.
    ///
    /// A job that reports `failed` surfaces the service's error message; a job
    /// that is still pending after `max_polls` receipts is a timeout.
    pub async fn wait_for_result(&self, handle: B256) -> Result<Bytes, ProverClientError> {
        for _ in 0..self.max_polls {
            let receipt = self.proof_receipt(handle).await?;
            match receipt.status {
                ProofStatus::Done => {
                    return receipt.proof.ok_or_else(|| {
                        ProverClientError::InvalidResponse(
                            "Done receipt is missing the proof artifact".to_string(),
                        )
                    });
                }
                ProofStatus::Failed => {
                    return Err(ProverClientError::ProvingFailed(
                        receipt
                            .error
                            .unwrap_or_else(|| "no error reported".to_string()),
                    ));
                }
                ProofStatus::Queued | ProofStatus::Running => {
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        Err(ProverClientError::TimedOut(handle, self.max_polls))
    }
}
