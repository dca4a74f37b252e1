//! Sequenced transaction submission.
//!
//! A flow prepares each transaction (sender, next nonce), optionally routes it
//! through the policy gate, then submits it and waits for the receipt. No
//! transaction starts before the previous one's hash is available; the first
//! failure aborts the remaining sequence.

use alloy::{
    network::TransactionBuilder,
    providers::Provider,
    rpc::types::TransactionRequest,
};
use alloy_primitives::{Address, TxHash};
use policy_gate_client::PolicyClient;

use crate::error::FlowError;

/// Hands out strictly increasing nonces for one run.
///
/// The node is consulted once at flow start; every prepared transaction then
/// takes the next value. Two sequential sends must never carry the same nonce,
/// the second would replace the first in the mempool instead of following it.
#[derive(Debug, Clone, Copy)]
pub struct NonceTracker {
    next: u64,
}

impl NonceTracker {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// The nonce the next prepared transaction will carry.
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn next(&mut self) -> u64 {
        let nonce = self.next;
        self.next += 1;
        nonce
    }
}

/// External policy gate: inspects a candidate transaction and returns the
/// transaction to actually submit, or rejects it.
#[allow(async_fn_in_trait)]
pub trait ApprovalGate {
    async fn approve(&self, tx: TransactionRequest) -> Result<TransactionRequest, FlowError>;
}

impl ApprovalGate for PolicyClient {
    async fn approve(&self, tx: TransactionRequest) -> Result<TransactionRequest, FlowError> {
        Ok(PolicyClient::approve(self, &tx).await?)
    }
}

/// Final submission step: hand the transaction to the node and wait for its
/// receipt.
#[allow(async_fn_in_trait)]
pub trait Submitter {
    async fn submit(&self, tx: TransactionRequest) -> Result<TxHash, FlowError>;
}

/// Submits transactions through an alloy provider and waits for receipts.
#[derive(Debug)]
pub struct RpcSubmitter<P> {
    provider: P,
}

impl<P: Provider> RpcSubmitter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: Provider> Submitter for RpcSubmitter<P> {
    async fn submit(&self, tx: TransactionRequest) -> Result<TxHash, FlowError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| FlowError::Submission(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| FlowError::Submission(e.to_string()))?;

        Ok(receipt.transaction_hash)
    }
}

/// Runs an ordered list of transactions strictly in sequence.
#[derive(Debug)]
pub struct TxSequencer<G, S> {
    gate: G,
    submitter: S,
    sender: Address,
    nonces: NonceTracker,
}

impl<G: ApprovalGate, S: Submitter> TxSequencer<G, S> {
    pub fn new(gate: G, submitter: S, sender: Address, nonces: NonceTracker) -> Self {
        Self {
            gate,
            submitter,
            sender,
            nonces,
        }
    }

    /// Stamp a request with the sender and the next nonce.
    fn prepare(&mut self, tx: TransactionRequest) -> TransactionRequest {
        tx.with_from(self.sender).with_nonce(self.nonces.next())
    }

    /// Submit a transaction directly, bypassing the policy gate.
    pub async fn send(&mut self, tx: TransactionRequest) -> Result<TxHash, FlowError> {
        let tx = self.prepare(tx);
        self.submitter.submit(tx).await
    }

    /// Route a transaction through the policy gate, then submit whatever the
    /// gate returned.
    pub async fn send_gated(&mut self, tx: TransactionRequest) -> Result<TxHash, FlowError> {
        let tx = self.prepare(tx);
        let approved = self.gate.approve(tx).await?;
        self.submitter.submit(approved).await
    }
}
