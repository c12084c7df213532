//! The source contract: read-only, side-effect-free chain data access.
//!
//! The core never talks to a node directly — it is specified only by the
//! queries it makes (spec §6). `ConsensusSource` and `RuntimeSource` are the
//! two concrete contracts; both are `Send + Sync` so a single client can
//! back several concurrently-spawned extractors per height (spec §5).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

use crate::errors::IngestError;

/// Races a source call against the per-height cancellation token. Extractors
/// use this at their one blocking point so that a sibling's failure is
/// observed "at their next source call" (spec §5) instead of only after the
/// call returns.
pub async fn cancellable<T>(
    token: &CancellationToken,
    fut: impl std::future::Future<Output = Result<T, IngestError>>,
) -> Result<T, IngestError> {
    tokio::select! {
        biased;
        () = token.cancelled() => Err(IngestError::Cancelled),
        result = fut => result,
    }
}

// ===== Consensus domain types =====

#[derive(Debug, Clone)]
pub struct StateRoot {
    pub namespace: String,
    pub version: u64,
    pub root_type: String,
    pub hash: String,
}

#[derive(Debug, Clone)]
pub struct BlockHeader {
    pub height: u64,
    pub hash: String,
    pub time: DateTime<Utc>,
    pub state_root: StateRoot,
}

/// An on-chain signed transaction exactly as the source returns it — opaque
/// until `TransactionCodec::open` attempts to decode it. Spec §4.3: a
/// decode failure drops the single transaction and the height proceeds.
///
/// `hash` is the envelope hash (over the signed transaction as a whole),
/// computed by the source independently of body decoding — it is available
/// even when `TransactionCodec::open` later fails, since events on this
/// transaction's result still need a `tx_hash` to attach to.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub hash: String,
    pub raw: Vec<u8>,
}

/// A successfully opened transaction.
#[derive(Debug, Clone)]
pub struct OpenTransaction {
    pub hash: String,
    pub nonce: u64,
    pub fee_amount: u64,
    pub fee_gas: u64,
    pub method: String,
    pub sender: String,
    pub body: Json,
}

/// Per-result error detail, present when the transaction's execution failed
/// on-chain (not the same as a decode failure).
#[derive(Debug, Clone, Default)]
pub struct ExecutionError {
    pub module: Option<String>,
    pub code: Option<u32>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TxResult {
    pub error: Option<ExecutionError>,
    pub events: Vec<RawEvent>,
}

/// A raw, nested source event. Collapsed into a flat `ClassifiedEvent` by
/// the event classifier (spec §4.5); see `events.rs`.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub staking: Option<StakingEvent>,
    pub registry: Option<RegistryEvent>,
    pub roothash: Option<RootHashEvent>,
    pub governance: Option<GovernanceEvent>,
}

#[derive(Debug, Clone)]
pub enum StakingEvent {
    Transfer(StakingTransfer),
    Burn(StakingBurn),
    Escrow(StakingEscrowEvent),
    AllowanceChange(StakingAllowanceChange),
}

#[derive(Debug, Clone)]
pub enum StakingEscrowEvent {
    Add(StakingAddEscrow),
    Take(StakingTakeEscrow),
    DebondingStart(StakingDebondingStart),
    Reclaim(StakingReclaimEscrow),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StakingTransfer {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StakingBurn {
    pub owner: String,
    pub amount: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StakingAddEscrow {
    pub owner: String,
    pub escrow: String,
    pub amount: u64,
    pub new_shares: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StakingTakeEscrow {
    pub owner: String,
    pub amount: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StakingDebondingStart {
    pub escrow: String,
    pub owner: String,
    pub amount: u64,
    pub active_shares: u64,
    pub debonding_shares: u64,
    pub debond_end_time: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StakingReclaimEscrow {
    pub owner: String,
    pub escrow: String,
    pub amount: u64,
    pub shares: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StakingAllowanceChange {
    pub owner: String,
    pub beneficiary: String,
    pub allowance: u64,
}

#[derive(Debug, Clone)]
pub enum RegistryEvent {
    Runtime(RegistryRuntime),
    Entity(RegistryEntity),
    Node(RegistryNode),
    NodeUnfrozen(RegistryNodeUnfrozen),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryRuntime {
    pub id: String,
    pub kind: String,
    pub tee_hardware: String,
    pub key_manager: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryEntity {
    pub id: String,
    pub staking_address: String,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct NodeAddresses {
    pub tls: Vec<String>,
    pub p2p: Vec<String>,
    pub consensus: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryNode {
    pub id: String,
    pub entity_id: String,
    pub is_registration: bool,
    pub roles: Vec<String>,
    pub software_version: String,
    pub vrf_pubkey: Option<String>,
    pub addresses: NodeAddresses,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryNodeUnfrozen {
    pub node_id: String,
}

#[derive(Debug, Clone)]
pub enum RootHashEvent {
    ExecutorCommitted(RoothashExecutorCommitted),
    DiscrepancyDetected(RoothashDiscrepancyDetected),
    Finalized(RoothashFinalized),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoothashExecutorCommitted {
    pub runtime_id: String,
    pub node_id: String,
    pub round: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoothashDiscrepancyDetected {
    pub runtime_id: String,
    pub round: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RoothashFinalized {
    pub runtime_id: String,
    pub round: u64,
}

#[derive(Debug, Clone)]
pub enum GovernanceEvent {
    ProposalSubmitted(GovernanceProposalSubmitted),
    ProposalExecuted(GovernanceProposalExecuted),
    ProposalFinalized(GovernanceProposalFinalized),
    Vote(GovernanceVote),
}

#[derive(Debug, Clone)]
pub enum ProposalContent {
    Upgrade { target_version: String, epoch: u64 },
    CancelUpgrade { proposal_id: u64 },
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct GovernanceProposalSubmitted {
    pub proposal_id: u64,
    pub submitter: String,
    #[serde(skip)]
    pub content: ProposalContent,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct GovernanceProposalExecuted {
    pub proposal_id: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct GovernanceProposalFinalized {
    pub proposal_id: u64,
    pub state: String,
    pub invalid_votes: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct GovernanceVote {
    pub proposal_id: u64,
    pub submitter: String,
    pub vote: String,
}

#[derive(Debug, Clone)]
pub struct ConsensusBlockData {
    pub header: BlockHeader,
    pub epoch: u64,
    pub transactions: Vec<SignedTransaction>,
    pub results: Vec<TxResult>,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryData {
    pub runtime_events: Vec<RegistryRuntime>,
    pub entity_events: Vec<RegistryEntity>,
    pub node_events: Vec<RegistryNode>,
    pub node_unfrozen_events: Vec<RegistryNodeUnfrozen>,
    pub runtime_suspensions: Vec<String>,
    pub runtime_unsuspensions: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StakingData {
    pub epoch: u64,
    pub transfers: Vec<StakingTransfer>,
    pub burns: Vec<StakingBurn>,
    pub escrows: Vec<StakingEscrowEvent>,
    pub allowance_changes: Vec<StakingAllowanceChange>,
}

#[derive(Debug, Clone)]
pub struct Validator {
    pub node_id: String,
    pub voting_power: u64,
}

#[derive(Debug, Clone)]
pub struct CommitteeMember {
    pub public_key: String,
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct Committee {
    pub kind: String,
    pub valid_for: u64,
    pub members: Vec<CommitteeMember>,
}

#[derive(Debug, Clone, Default)]
pub struct SchedulerData {
    pub validators: Vec<Validator>,
    /// runtime namespace -> committees scheduled for the current epoch.
    pub committees: HashMap<String, Vec<Committee>>,
}

#[derive(Debug, Clone, Default)]
pub struct GovernanceData {
    pub submissions: Vec<GovernanceProposalSubmitted>,
    pub executions: Vec<GovernanceProposalExecuted>,
    pub finalizations: Vec<GovernanceProposalFinalized>,
    pub votes: Vec<GovernanceVote>,
}

/// Read-only consensus source, one typed method per extractor (spec §6).
#[async_trait]
pub trait ConsensusSource: Send + Sync {
    async fn block_data(&self, height: u64) -> Result<ConsensusBlockData, IngestError>;
    async fn registry_data(&self, height: u64) -> Result<RegistryData, IngestError>;
    async fn staking_data(&self, height: u64) -> Result<StakingData, IngestError>;
    async fn scheduler_data(&self, height: u64) -> Result<SchedulerData, IngestError>;
    async fn governance_data(&self, height: u64) -> Result<GovernanceData, IngestError>;
    fn name(&self) -> &str;
}

// ===== Runtime domain types =====

#[derive(Debug, Clone)]
pub struct RuntimeBlockData {
    pub round: u64,
    pub version: u64,
    pub timestamp: DateTime<Utc>,
    pub encoded_hash: String,
    pub previous_hash: String,
    pub io_root: String,
    pub state_root: String,
    pub messages_hash: String,
    pub in_messages_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct CoreData {
    pub gas_used: Vec<GasUsedEvent>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct GasUsedEvent {
    pub tx_index: Option<u32>,
    pub amount: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AccountsData {
    pub transfers: Vec<AccountTransfer>,
    pub burns: Vec<AccountBurn>,
    pub mints: Vec<AccountMint>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AccountTransfer {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AccountBurn {
    pub owner: String,
    pub amount: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AccountMint {
    pub owner: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ConsensusAccountsData {
    pub deposits: Vec<ConsensusAccountsDeposit>,
    pub withdraws: Vec<ConsensusAccountsWithdraw>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConsensusAccountsDeposit {
    pub from_consensus_address: String,
    pub to_runtime_address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConsensusAccountsWithdraw {
    pub from_runtime_address: String,
    pub to_consensus_address: String,
    pub amount: u64,
}

/// Read-only runtime source, one typed method per module extractor (spec §6).
#[async_trait]
pub trait RuntimeSource: Send + Sync {
    async fn block_data(&self, round: u64) -> Result<RuntimeBlockData, IngestError>;
    async fn core_data(&self, round: u64) -> Result<CoreData, IngestError>;
    async fn accounts_data(&self, round: u64) -> Result<AccountsData, IngestError>;
    async fn consensus_accounts_data(&self, round: u64) -> Result<ConsensusAccountsData, IngestError>;
    fn name(&self) -> &str;
}

/// Decodes the opaque bytes of a signed transaction. Pluggable the way the
/// prior codebase's `Decoder` trait is: the wire envelope format is a
/// chain-specific concern external to this crate, but the "attempt to open,
/// silently skip on failure" *behavior* (spec §4.3, §9) lives in the
/// extractor that calls this trait.
pub trait TransactionCodec: Send + Sync {
    fn open(&self, raw: &[u8]) -> anyhow::Result<OpenTransaction>;
}

/// External entity-metadata registry fetch (spec §4.3's side channel).
/// Failure of this fetch fails the whole height it's attempted on.
#[async_trait]
pub trait MetadataRegistry: Send + Sync {
    async fn fetch_all(&self) -> anyhow::Result<Vec<(String, Json)>>;
}
