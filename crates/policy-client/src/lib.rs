use alloy::rpc::types::TransactionRequest;
use alloy_primitives::Address;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use url::Url;

/// A client for the transaction policy gate.
///
/// Every transaction destined for the chain is posted to the gate's sign
/// endpoint before submission. The gate either returns an approved transaction
/// (which may differ from the candidate, the gate is free to transform the
/// calldata) or rejects it.
///
/// ``` no_run
/// use policy_gate_client::PolicyClient;
/// use alloy::rpc::types::TransactionRequest;
/// use alloy_primitives::address;
///
/// #[tokio::main]
/// async fn main() {
///     let policy = address!("04f3b196e30e6f78174ef95a612e1f85a3b4110c");
///     let client = PolicyClient::new("http://localhost:3030/sign", policy).unwrap();
///     let approved = client.approve(&TransactionRequest::default()).await.unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct PolicyClient {
    client: Client,
    sign_url: Url,
    policy_address: Address,
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyClientError {
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("policy gate rejected transaction (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Candidate transaction plus the policy it should be checked against.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApprovalRequest<'a> {
    policy_address: Address,
    transaction: &'a TransactionRequest,
}

/// Approved (possibly transformed) transaction returned by the gate.
#[derive(Debug, Deserialize)]
struct ApprovalResponse {
    transaction: TransactionRequest,
}

impl PolicyClient {
    /// Create a new policy gate client for the given sign endpoint.
    pub fn new(sign_url: &str, policy_address: Address) -> Result<Self, PolicyClientError> {
        let sign_url = Url::parse(sign_url)?;
        let client = Client::new();

        Ok(Self {
            client,
            sign_url,
            policy_address,
        })
    }

    /// The on-chain policy the gate checks candidates against.
    pub fn policy_address(&self) -> Address {
        self.policy_address
    }

    /// Submit a candidate transaction and return the approved transaction.
    ///
    /// A non-success HTTP status is treated as a rejection; the response body
    /// is surfaced as the rejection message.
    pub async fn approve(
        &self,
        tx: &TransactionRequest,
    ) -> Result<TransactionRequest, PolicyClientError> {
        let request = ApprovalRequest {
            policy_address: self.policy_address,
            transaction: tx,
        };

        let response = self
            .client
            .post(self.sign_url.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            return Err(PolicyClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApprovalResponse = response
            .json()
            .await
            .map_err(|e| PolicyClientError::InvalidResponse(e.to_string()))?;

        Ok(body.transaction)
    }
}
