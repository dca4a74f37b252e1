use std::path::PathBuf;

use policy_gate_client::PolicyClientError;
use prover_client::ProverClientError;

/// Failures while loading or querying deployment artifacts.
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("could not read deployment manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("deployment manifest {path} is not the expected shape: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no deployment record for contract `{0}`")]
    MissingContractAddress(String),
    #[error("no anonymous deployment record in manifest")]
    MissingAnonymousAddress,
}

/// Failures while running a transaction or proof flow.
///
/// The first failure aborts the remaining sequence; there is no retry and no
/// rollback of already-submitted transactions.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    #[error("invalid signing key: {0}")]
    SigningKey(String),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("transaction approval rejected: {0}")]
    ApprovalRejected(String),
    #[error("transaction submission failed: {0}")]
    Submission(String),
    #[error("proof generation failed: {0}")]
    Proof(String),
}

impl From<PolicyClientError> for FlowError {
    fn from(err: PolicyClientError) -> Self {
        match err {
            PolicyClientError::UrlParseError(err) => FlowError::Url(err),
            other => FlowError::ApprovalRejected(other.to_string()),
        }
    }
}

impl From<ProverClientError> for FlowError {
    fn from(err: ProverClientError) -> Self {
        match err {
            ProverClientError::UrlParseError(err) => FlowError::Url(err),
            other => FlowError::Proof(other.to_string()),
        }
    }
}
