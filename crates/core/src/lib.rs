#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod calls;
pub mod campaign;
pub mod deployment;
pub mod eligibility;
pub mod error;
pub mod sequencer;

/// Default JSON-RPC endpoint (Base Sepolia).
pub const DEFAULT_RPC_URL: &str = "https://sepolia.base.org";

/// Default policy gate sign endpoint.
pub const DEFAULT_POLICY_SIGN_URL: &str = "https://dc7sea.venn.build/sign";

/// Default on-chain policy the gate checks transactions against.
pub const DEFAULT_POLICY_ADDRESS: &str = "0x04f3B196E30e6F78174EF95a612E1f85A3B4110C";

/// Default chain id (Base Sepolia).
pub const DEFAULT_CHAIN_ID: u64 = 84532;
