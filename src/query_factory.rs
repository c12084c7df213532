//! Tenant-scoped parametric SQL generation.
//!
//! Every statement produced here is scoped by `chain_id` and, for runtime
//! tables, `runtime_id` (spec §4.6) — the factory is the one place that
//! knows table names and column layouts, so extractors never hand-write SQL.
//! Matches the prior codebase's `QueryBuilder`-per-statement style in
//! `torii-sql-sink::insert_*`, generalized from Starknet's fixed table set to
//! a tenant-parameterized one.
//!
//! The factory is pure and stateless: given the same tenant scope and
//! arguments it always emits the same statement. It never opens a
//! connection and never sees live data beyond what's passed in.

use crate::batch::{Param, Statement};

/// Identifies which tenant's tables a statement is scoped to. Consensus
/// tables take only `chain_id`; runtime tables additionally take
/// `runtime_id`, spec §3's two analyzer families.
#[derive(Debug, Clone)]
pub struct QueryFactory {
    chain_id: String,
    runtime_id: Option<String>,
}

impl QueryFactory {
    pub fn consensus(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            runtime_id: None,
        }
    }

    pub fn runtime(chain_id: impl Into<String>, runtime_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            runtime_id: Some(runtime_id.into()),
        }
    }

    fn runtime_id(&self) -> &str {
        self.runtime_id.as_deref().unwrap_or("")
    }

    // ===== consensus: blocks / epochs =====

    pub fn insert_block(&self, height: u64, hash: &str, time_rfc3339: &str) -> Statement {
        Statement::new(
            "INSERT INTO chain_block (chain_id, height, hash, block_time) VALUES (?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(height),
                Param::from(hash.to_string()),
                Param::from(time_rfc3339.to_string()),
            ],
        )
    }

    pub fn insert_state_root(&self, height: u64, namespace: &str, version: u64, root_type: &str, hash: &str) -> Statement {
        Statement::new(
            "INSERT INTO chain_state_root (chain_id, height, namespace, version, root_type, hash) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(height),
                Param::from(namespace.to_string()),
                Param::from(version),
                Param::from(root_type.to_string()),
                Param::from(hash.to_string()),
            ],
        )
    }

    /// Called unconditionally on every block, same as the original: the
    /// `ON CONFLICT DO NOTHING` makes repeated inserts for a height's
    /// still-current epoch harmless (spec §15).
    pub fn insert_epoch(&self, epoch: u64, start_height: u64) -> Statement {
        Statement::new(
            "INSERT INTO chain_epoch (chain_id, epoch, start_height, end_height) VALUES (?, ?, ?, NULL) \
             ON CONFLICT (chain_id, epoch) DO NOTHING",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(epoch),
                Param::from(start_height),
            ],
        )
    }

    /// Also called unconditionally every block with `epoch - 1`; a no-op
    /// `UPDATE` when that row doesn't exist or is already closed (spec §15 /
    /// original Go source's epoch-terminator behavior).
    pub fn close_previous_epoch(&self, previous_epoch: u64, end_height: u64) -> Statement {
        Statement::new(
            "UPDATE chain_epoch SET end_height = ? WHERE chain_id = ? AND epoch = ?",
            vec![
                Param::from(end_height),
                Param::from(self.chain_id.clone()),
                Param::from(previous_epoch),
            ],
        )
    }

    // ===== consensus: transactions =====

    /// `err_module`/`err_code`/`err_msg` are the three discrete fields spec
    /// §4.3 names, not a single collapsed message string — `None` across all
    /// three for a successful transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_transaction(
        &self,
        height: u64,
        tx_index: u32,
        hash: &str,
        nonce: u64,
        method: &str,
        sender: &str,
        fee_amount: u64,
        fee_gas: u64,
        body: serde_json::Value,
        err_module: Option<&str>,
        err_code: Option<u32>,
        err_msg: Option<&str>,
    ) -> Statement {
        Statement::new(
            "INSERT INTO chain_transaction \
             (chain_id, height, tx_index, hash, nonce, method, sender, fee_amount, fee_gas, body, err_module, err_code, err_msg) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(height),
                Param::from(u64::from(tx_index)),
                Param::from(hash.to_string()),
                Param::from(nonce),
                Param::from(method.to_string()),
                Param::from(sender.to_string()),
                Param::from(fee_amount),
                Param::from(fee_gas),
                Param::from(body),
                Param::from(err_module.map(str::to_string)),
                Param::from(err_code.map(u64::from)),
                Param::from(err_msg.map(str::to_string)),
            ],
        )
    }

    /// Upserts the sender's nonce to exactly `nonce`, not a relative bump
    /// (spec §15 confirms the original does an absolute set, keyed by address).
    pub fn set_account_nonce(&self, address: &str, nonce: u64) -> Statement {
        Statement::new(
            "INSERT INTO chain_account (chain_id, address, nonce) VALUES (?, ?, ?) \
             ON CONFLICT (chain_id, address) DO UPDATE SET nonce = excluded.nonce",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(address.to_string()),
                Param::from(nonce),
            ],
        )
    }

    /// Only called when `method == "staking.AmendCommissionSchedule"`
    /// (spec §15): every other method skips the schedule table entirely.
    pub fn upsert_commission_schedule(&self, address: &str, schedule: serde_json::Value) -> Statement {
        Statement::new(
            "INSERT INTO staking_commission_schedule (chain_id, address, schedule) VALUES (?, ?, ?) \
             ON CONFLICT (chain_id, address) DO UPDATE SET schedule = excluded.schedule",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(address.to_string()),
                Param::from(schedule),
            ],
        )
    }

    // ===== consensus: events =====

    /// `tx_hash` is the owning transaction's envelope hash (spec §4.3's
    /// event tuple is `(backend, type, body_json, height, tx_hash, tx_index)`);
    /// `None` only for events not attributed to any transaction.
    pub fn insert_event(
        &self,
        height: u64,
        tx_index: Option<u32>,
        tx_hash: Option<&str>,
        backend: &str,
        kind: &str,
        body: serde_json::Value,
    ) -> Statement {
        Statement::new(
            "INSERT INTO chain_event (chain_id, height, tx_index, tx_hash, backend, kind, body) VALUES (?, ?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(height),
                Param::from(tx_index.map(u64::from)),
                Param::from(tx_hash.map(str::to_string)),
                Param::from(backend.to_string()),
                Param::from(kind.to_string()),
                Param::from(body),
            ],
        )
    }

    // ===== registry =====

    /// `key_manager` defaults to the literal string `"none"`, not SQL NULL,
    /// when the runtime has none (spec §4.3: "key_manager or \"none\"").
    pub fn upsert_runtime(&self, id: &str, kind: &str, tee_hardware: &str, key_manager: Option<&str>) -> Statement {
        Statement::new(
            "INSERT INTO registry_runtime (chain_id, id, kind, tee_hardware, key_manager, suspended) \
             VALUES (?, ?, ?, ?, ?, FALSE) \
             ON CONFLICT (chain_id, id) DO UPDATE SET kind = excluded.kind, tee_hardware = excluded.tee_hardware, key_manager = excluded.key_manager",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(id.to_string()),
                Param::from(kind.to_string()),
                Param::from(tee_hardware.to_string()),
                Param::from(key_manager.unwrap_or("none").to_string()),
            ],
        )
    }

    /// Plain id-list suspension/unsuspension toggle, not an upsert — the
    /// event carries no other runtime fields to upsert with (spec §15).
    pub fn set_runtime_suspended(&self, id: &str, suspended: bool) -> Statement {
        Statement::new(
            "UPDATE registry_runtime SET suspended = ? WHERE chain_id = ? AND id = ?",
            vec![
                Param::from(suspended),
                Param::from(self.chain_id.clone()),
                Param::from(id.to_string()),
            ],
        )
    }

    pub fn insert_entity(&self, id: &str, staking_address: &str) -> Statement {
        Statement::new(
            "INSERT INTO registry_entity (chain_id, id, staking_address) VALUES (?, ?, ?) \
             ON CONFLICT (chain_id, id) DO UPDATE SET staking_address = excluded.staking_address",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(id.to_string()),
                Param::from(staking_address.to_string()),
            ],
        )
    }

    pub fn insert_claimed_node(&self, entity_id: &str, node_id: &str) -> Statement {
        Statement::new(
            "INSERT INTO registry_entity_node (chain_id, entity_id, node_id) VALUES (?, ?, ?) \
             ON CONFLICT DO NOTHING",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(entity_id.to_string()),
                Param::from(node_id.to_string()),
            ],
        )
    }

    /// `tls`/`p2p` carry the `{'a','b','c'}` literal form, `consensus` the
    /// comma-joined string form — both already formatted by the caller per
    /// §6's array encoding (exact text, bound as an ordinary parameter rather
    /// than concatenated into the statement).
    #[allow(clippy::too_many_arguments)]
    pub fn upsert_node(
        &self,
        id: &str,
        entity_id: &str,
        software_version: &str,
        vrf_pubkey: &str,
        roles: serde_json::Value,
        tls: &str,
        p2p: &str,
        consensus: &str,
    ) -> Statement {
        Statement::new(
            "INSERT INTO registry_node \
             (chain_id, id, entity_id, software_version, vrf_pubkey, roles, tls_addresses, p2p_addresses, consensus_addresses, frozen) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, FALSE) \
             ON CONFLICT (chain_id, id) DO UPDATE SET \
             entity_id = excluded.entity_id, software_version = excluded.software_version, \
             vrf_pubkey = excluded.vrf_pubkey, roles = excluded.roles, \
             tls_addresses = excluded.tls_addresses, p2p_addresses = excluded.p2p_addresses, \
             consensus_addresses = excluded.consensus_addresses",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(id.to_string()),
                Param::from(entity_id.to_string()),
                Param::from(software_version.to_string()),
                Param::from(vrf_pubkey.to_string()),
                Param::from(roles),
                Param::from(tls.to_string()),
                Param::from(p2p.to_string()),
                Param::from(consensus.to_string()),
            ],
        )
    }

    /// Formats an address list as the `{'a','b','c'}` literal §6 requires.
    pub fn format_address_list(addresses: &[String]) -> String {
        let quoted: Vec<String> = addresses.iter().map(|a| format!("'{a}'")).collect();
        format!("{{{}}}", quoted.join(","))
    }

    /// Formats consensus addresses as a single comma-joined string, per §6.
    pub fn format_consensus_addresses(addresses: &[String]) -> String {
        addresses.join(",")
    }

    pub fn delete_node(&self, id: &str) -> Statement {
        Statement::new(
            "DELETE FROM registry_node WHERE chain_id = ? AND id = ?",
            vec![Param::from(self.chain_id.clone()), Param::from(id.to_string())],
        )
    }

    pub fn unfreeze_node(&self, id: &str) -> Statement {
        Statement::new(
            "UPDATE registry_node SET frozen = FALSE WHERE chain_id = ? AND id = ?",
            vec![Param::from(self.chain_id.clone()), Param::from(id.to_string())],
        )
    }

    pub fn upsert_entity_metadata(&self, entity_id: &str, metadata: serde_json::Value) -> Statement {
        Statement::new(
            "INSERT INTO registry_entity_metadata (chain_id, entity_id, metadata) VALUES (?, ?, ?) \
             ON CONFLICT (chain_id, entity_id) DO UPDATE SET metadata = excluded.metadata",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(entity_id.to_string()),
                Param::from(metadata),
            ],
        )
    }

    // ===== staking =====
    //
    // Balances are stored as running totals on `chain_account` /
    // `staking_escrow_balance`, not as an append-only ledger — each of
    // these is an upsert-with-delta against the prior codebase's balance
    // tables, matching `original_source/analyzer/consensus/consensus.go`'s
    // direct-update style rather than an event log (spec §4.3).

    /// `delta` may be negative (a decrement); the row is created at `delta`
    /// on first touch.
    pub fn adjust_general_balance(&self, address: &str, delta: i64) -> Statement {
        Statement::new(
            "INSERT INTO chain_account (chain_id, address, general_balance) VALUES (?, ?, ?) \
             ON CONFLICT (chain_id, address) DO UPDATE SET general_balance = chain_account.general_balance + excluded.general_balance",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(address.to_string()),
                Param::I64(delta),
            ],
        )
    }

    pub fn adjust_escrow_balance(&self, escrow: &str, amount_delta: i64, shares_delta: i64) -> Statement {
        Statement::new(
            "INSERT INTO staking_escrow_balance (chain_id, escrow, active_balance, active_shares) VALUES (?, ?, ?, ?) \
             ON CONFLICT (chain_id, escrow) DO UPDATE SET \
             active_balance = staking_escrow_balance.active_balance + excluded.active_balance, \
             active_shares = staking_escrow_balance.active_shares + excluded.active_shares",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(escrow.to_string()),
                Param::I64(amount_delta),
                Param::I64(shares_delta),
            ],
        )
    }

    /// Spec §4.3's DebondingStart escrow update also removes debonding
    /// shares from the active pool while adding them to a debonding pool.
    pub fn debonding_start_escrow_balance(&self, escrow: &str, amount_delta: i64, active_shares_delta: i64, debonding_shares_delta: i64) -> Statement {
        Statement::new(
            "INSERT INTO staking_escrow_balance (chain_id, escrow, active_balance, active_shares, debonding_shares) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (chain_id, escrow) DO UPDATE SET \
             active_balance = staking_escrow_balance.active_balance + excluded.active_balance, \
             active_shares = staking_escrow_balance.active_shares + excluded.active_shares, \
             debonding_shares = staking_escrow_balance.debonding_shares + excluded.debonding_shares",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(escrow.to_string()),
                Param::I64(amount_delta),
                Param::I64(active_shares_delta),
                Param::I64(debonding_shares_delta),
            ],
        )
    }

    pub fn adjust_delegation(&self, escrow: &str, owner: &str, shares_delta: i64) -> Statement {
        Statement::new(
            "INSERT INTO staking_delegation (chain_id, escrow, owner, shares) VALUES (?, ?, ?, ?) \
             ON CONFLICT (chain_id, escrow, owner) DO UPDATE SET shares = staking_delegation.shares + excluded.shares",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(escrow.to_string()),
                Param::from(owner.to_string()),
                Param::I64(shares_delta),
            ],
        )
    }

    pub fn insert_debonding_delegation(&self, escrow: &str, owner: &str, shares: u64, debond_end_time: u64) -> Statement {
        Statement::new(
            "INSERT INTO staking_debonding_delegation (chain_id, escrow, owner, shares, debond_end_time) VALUES (?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(escrow.to_string()),
                Param::from(owner.to_string()),
                Param::from(shares),
                Param::from(debond_end_time),
            ],
        )
    }

    /// Deletes debonding delegations that have matured — `debond_end_time`
    /// at or before `current_epoch` (spec §4.3's Reclaim handling, spec §8's
    /// "a reclaim with a specific epoch deletes only debonding delegations
    /// whose end-epoch has passed").
    pub fn delete_matured_debonding_delegations(&self, owner: &str, escrow: &str, shares: u64, current_epoch: u64) -> Statement {
        Statement::new(
            "DELETE FROM staking_debonding_delegation \
             WHERE chain_id = ? AND owner = ? AND escrow = ? AND shares = ? AND debond_end_time <= ?",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(owner.to_string()),
                Param::from(escrow.to_string()),
                Param::from(shares),
                Param::from(current_epoch),
            ],
        )
    }

    /// An allowance change to 0 deletes the row rather than upserting a
    /// zero (spec §4.3, §8).
    pub fn delete_allowance(&self, owner: &str, beneficiary: &str) -> Statement {
        Statement::new(
            "DELETE FROM staking_allowance WHERE chain_id = ? AND owner = ? AND beneficiary = ?",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(owner.to_string()),
                Param::from(beneficiary.to_string()),
            ],
        )
    }

    pub fn set_allowance(&self, owner: &str, beneficiary: &str, allowance: u64) -> Statement {
        Statement::new(
            "INSERT INTO staking_allowance (chain_id, owner, beneficiary, allowance) VALUES (?, ?, ?, ?) \
             ON CONFLICT (chain_id, owner, beneficiary) DO UPDATE SET allowance = excluded.allowance",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(owner.to_string()),
                Param::from(beneficiary.to_string()),
                Param::from(allowance),
            ],
        )
    }

    // ===== scheduler =====

    pub fn upsert_validator(&self, node_id: &str, voting_power: u64) -> Statement {
        Statement::new(
            "INSERT INTO scheduler_validator (chain_id, node_id, voting_power) VALUES (?, ?, ?) \
             ON CONFLICT (chain_id, node_id) DO UPDATE SET voting_power = excluded.voting_power",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(node_id.to_string()),
                Param::from(voting_power),
            ],
        )
    }

    /// Committees are replaced in full every height, across every runtime —
    /// the extractor truncates the whole table, not just one runtime's rows
    /// (spec §4.3).
    pub fn truncate_committee_members(&self) -> Statement {
        Statement::new(
            "DELETE FROM scheduler_committee_member WHERE chain_id = ?",
            vec![Param::from(self.chain_id.clone())],
        )
    }

    pub fn insert_committee_member(&self, runtime_id: &str, kind: &str, valid_for_epoch: u64, public_key: &str, role: &str) -> Statement {
        Statement::new(
            "INSERT INTO scheduler_committee_member (chain_id, runtime_id, kind, valid_for_epoch, public_key, role) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(runtime_id.to_string()),
                Param::from(kind.to_string()),
                Param::from(valid_for_epoch),
                Param::from(public_key.to_string()),
                Param::from(role.to_string()),
            ],
        )
    }

    // ===== governance =====

    pub fn insert_proposal(&self, proposal_id: u64, submitter: &str, content: serde_json::Value) -> Statement {
        Statement::new(
            "INSERT INTO governance_proposal (chain_id, id, submitter, content, state) VALUES (?, ?, ?, ?, 'active')",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(proposal_id),
                Param::from(submitter.to_string()),
                Param::from(content),
            ],
        )
    }

    pub fn mark_proposal_executed(&self, proposal_id: u64) -> Statement {
        Statement::new(
            "UPDATE governance_proposal SET state = 'executed' WHERE chain_id = ? AND id = ?",
            vec![Param::from(self.chain_id.clone()), Param::from(proposal_id)],
        )
    }

    pub fn finalize_proposal(&self, proposal_id: u64, state: &str, invalid_votes: u64) -> Statement {
        Statement::new(
            "UPDATE governance_proposal SET state = ?, invalid_votes = ? WHERE chain_id = ? AND id = ?",
            vec![
                Param::from(state.to_string()),
                Param::from(invalid_votes),
                Param::from(self.chain_id.clone()),
                Param::from(proposal_id),
            ],
        )
    }

    pub fn insert_vote(&self, proposal_id: u64, submitter: &str, vote: &str) -> Statement {
        Statement::new(
            "INSERT INTO governance_vote (chain_id, proposal_id, submitter, vote) VALUES (?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(proposal_id),
                Param::from(submitter.to_string()),
                Param::from(vote.to_string()),
            ],
        )
    }

    // ===== runtime =====

    /// Every field spec §4.4 names for the runtime block row, including the
    /// linkage hashes (`previous_hash`, `io_root`, `messages_hash`,
    /// `in_messages_hash`) a round-only summary would otherwise drop.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_runtime_block(
        &self,
        round: u64,
        version: u64,
        timestamp: &str,
        encoded_hash: &str,
        previous_hash: &str,
        io_root: &str,
        state_root: &str,
        messages_hash: &str,
        in_messages_hash: &str,
    ) -> Statement {
        Statement::new(
            "INSERT INTO runtime_block \
             (chain_id, runtime_id, round, version, block_time, hash, previous_hash, io_root, state_root, messages_hash, in_messages_hash) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(self.runtime_id().to_string()),
                Param::from(round),
                Param::from(version),
                Param::from(timestamp.to_string()),
                Param::from(encoded_hash.to_string()),
                Param::from(previous_hash.to_string()),
                Param::from(io_root.to_string()),
                Param::from(state_root.to_string()),
                Param::from(messages_hash.to_string()),
                Param::from(in_messages_hash.to_string()),
            ],
        )
    }

    pub fn insert_gas_used(&self, round: u64, tx_index: Option<u32>, amount: u64) -> Statement {
        Statement::new(
            "INSERT INTO runtime_gas_used (chain_id, runtime_id, round, tx_index, amount) VALUES (?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(self.runtime_id().to_string()),
                Param::from(round),
                Param::from(tx_index.map(u64::from)),
                Param::from(amount),
            ],
        )
    }

    pub fn insert_runtime_transfer(&self, round: u64, from: &str, to: &str, amount: u64) -> Statement {
        Statement::new(
            "INSERT INTO runtime_account_transfer (chain_id, runtime_id, round, sender, receiver, amount) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(self.runtime_id().to_string()),
                Param::from(round),
                Param::from(from.to_string()),
                Param::from(to.to_string()),
                Param::from(amount),
            ],
        )
    }

    pub fn insert_runtime_burn(&self, round: u64, owner: &str, amount: u64) -> Statement {
        Statement::new(
            "INSERT INTO runtime_account_burn (chain_id, runtime_id, round, owner, amount) VALUES (?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(self.runtime_id().to_string()),
                Param::from(round),
                Param::from(owner.to_string()),
                Param::from(amount),
            ],
        )
    }

    pub fn insert_runtime_mint(&self, round: u64, owner: &str, amount: u64) -> Statement {
        Statement::new(
            "INSERT INTO runtime_account_mint (chain_id, runtime_id, round, owner, amount) VALUES (?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(self.runtime_id().to_string()),
                Param::from(round),
                Param::from(owner.to_string()),
                Param::from(amount),
            ],
        )
    }

    pub fn insert_consensus_deposit(&self, round: u64, from_consensus: &str, to_runtime: &str, amount: u64) -> Statement {
        Statement::new(
            "INSERT INTO runtime_consensus_deposit (chain_id, runtime_id, round, from_consensus_address, to_runtime_address, amount) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(self.runtime_id().to_string()),
                Param::from(round),
                Param::from(from_consensus.to_string()),
                Param::from(to_runtime.to_string()),
                Param::from(amount),
            ],
        )
    }

    pub fn insert_consensus_withdraw(&self, round: u64, from_runtime: &str, to_consensus: &str, amount: u64) -> Statement {
        Statement::new(
            "INSERT INTO runtime_consensus_withdraw (chain_id, runtime_id, round, from_runtime_address, to_consensus_address, amount) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Param::from(self.chain_id.clone()),
                Param::from(self.runtime_id().to_string()),
                Param::from(round),
                Param::from(from_runtime.to_string()),
                Param::from(to_consensus.to_string()),
                Param::from(amount),
            ],
        )
    }
}
