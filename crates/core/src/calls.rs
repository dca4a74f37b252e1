//! ABI call builders for the airdrop and eligibility contracts.

use alloy::{
    network::TransactionBuilder, rpc::types::TransactionRequest, sol, sol_types::SolCall,
};
use alloy_primitives::{Address, Bytes, U256};

sol! {
    function approve(address spender, uint256 value);
    function createCampaign(address rewardToken, uint256 totalRewards, uint256 maxParticipants, uint256 startTime, uint256 endTime, address criteriaLogic) returns (uint256);
    function claimReward(uint256 campaignId);
    function submitProof(bytes proof, address user, uint256 averageBalance);
    function averageBalanceOf(address user) returns (uint256);
}

/// Terms of a new campaign, ABI-encoded into `createCampaign`.
#[derive(Debug, Clone)]
pub struct CampaignTerms {
    pub reward_token: Address,
    pub total_rewards: U256,
    pub max_participants: U256,
    pub start_time: U256,
    pub end_time: U256,
    pub criteria_logic: Address,
}

/// Generates a TransactionRequest approving `spender` on an ERC-20 token
pub fn approve_tx(token: Address, spender: Address, value: U256) -> TransactionRequest {
    let input = approveCall { spender, value }.abi_encode();
    TransactionRequest::default()
        .with_to(token)
        .with_input(input)
        .with_value(U256::ZERO)
}

/// Generates a TransactionRequest for createCampaign
pub fn create_campaign_tx(manager: Address, terms: &CampaignTerms) -> TransactionRequest {
    let input = createCampaignCall {
        rewardToken: terms.reward_token,
        totalRewards: terms.total_rewards,
        maxParticipants: terms.max_participants,
        startTime: terms.start_time,
        endTime: terms.end_time,
        criteriaLogic: terms.criteria_logic,
    }
    .abi_encode();
    TransactionRequest::default()
        .with_to(manager)
        .with_input(input)
        .with_value(U256::ZERO)
}

/// Generates a TransactionRequest for claimReward
pub fn claim_reward_tx(manager: Address, campaign_id: U256) -> TransactionRequest {
    let input = claimRewardCall {
        campaignId: campaign_id,
    }
    .abi_encode();
    TransactionRequest::default()
        .with_to(manager)
        .with_input(input)
        .with_value(U256::ZERO)
}

/// Generates a TransactionRequest for submitProof.
///
/// The proof artifact is whatever the proving service returned, carried as
/// opaque `bytes`; the eligibility contract owns its decoding.
pub fn submit_proof_tx(
    eligibility: Address,
    proof: Bytes,
    user: Address,
    average_balance: U256,
) -> TransactionRequest {
    let input = submitProofCall {
        proof,
        user,
        averageBalance: average_balance,
    }
    .abi_encode();
    TransactionRequest::default()
        .with_to(eligibility)
        .with_input(input)
        .with_value(U256::ZERO)
}

/// Generates the read-only `averageBalanceOf` call for `eth_call`.
pub fn average_balance_call(prover_contract: Address, user: Address) -> TransactionRequest {
    let input = averageBalanceOfCall { user }.abi_encode();
    TransactionRequest::default()
        .with_to(prover_contract)
        .with_input(input)
}

/// Decodes the return data of `averageBalanceOf`.
pub fn decode_average_balance(data: &[u8]) -> alloy::sol_types::Result<U256> {
    averageBalanceOfCall::abi_decode_returns(data)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    fn token() -> Address {
        address!("00000000000000000000000000000000000000aa")
    }

    fn manager() -> Address {
        address!("00000000000000000000000000000000000000bb")
    }

    fn input_of(tx: &TransactionRequest) -> &[u8] {
        tx.input.input().expect("calldata should be set")
    }

    #[test]
    fn approve_tx_targets_token_with_approve_selector() {
        let tx = approve_tx(token(), manager(), U256::from(1000));

        assert_eq!(tx.to.unwrap().to().copied(), Some(token()));
        assert!(input_of(&tx).starts_with(&approveCall::SELECTOR));
        assert_eq!(tx.value, Some(U256::ZERO));
    }

    #[test]
    fn create_campaign_tx_encodes_terms() {
        let terms = CampaignTerms {
            reward_token: token(),
            total_rewards: U256::from(1000),
            max_participants: U256::from(100),
            start_time: U256::from(1_700_000_000u64),
            end_time: U256::from(1_700_086_400u64),
            criteria_logic: token(),
        };
        let tx = create_campaign_tx(manager(), &terms);

        assert_eq!(tx.to.unwrap().to().copied(), Some(manager()));
        let decoded = createCampaignCall::abi_decode(input_of(&tx)).unwrap();
        assert_eq!(decoded.rewardToken, terms.reward_token);
        assert_eq!(decoded.totalRewards, terms.total_rewards);
        assert_eq!(decoded.endTime, terms.end_time);
    }

    #[test]
    fn claim_reward_tx_encodes_campaign_id() {
        let tx = claim_reward_tx(manager(), U256::from(7));

        let decoded = claimRewardCall::abi_decode(input_of(&tx)).unwrap();
        assert_eq!(decoded.campaignId, U256::from(7));
    }

    #[test]
    fn submit_proof_tx_carries_artifact_unmodified() {
        let proof = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        let user = address!("00000000000000000000000000000000000000cc");
        let tx = submit_proof_tx(manager(), proof.clone(), user, U256::from(42));

        let decoded = submitProofCall::abi_decode(input_of(&tx)).unwrap();
        assert_eq!(decoded.proof, proof);
        assert_eq!(decoded.user, user);
        assert_eq!(decoded.averageBalance, U256::from(42));
    }

    #[test]
    fn average_balance_roundtrip_decodes() {
        let tx = average_balance_call(token(), manager());
        assert!(input_of(&tx).starts_with(&averageBalanceOfCall::SELECTOR));

        let encoded = U256::from(123456).to_be_bytes::<32>();
        assert_eq!(decode_average_balance(&encoded).unwrap(), U256::from(123456));
    }
}
