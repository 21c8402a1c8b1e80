//! Batch results, aggregation, and ledger digest.
//!
//! Aggregation collapses a batch into per-key totals so downstream
//! executors apply one operation per (account, reason) instead of one per
//! claim. All maps are ordered, so the aggregated ledger and its digest are
//! identical for any permutation of the same claims.

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

use relaysettle_types::constants::LEDGER_DIGEST_DOMAIN;
use relaysettle_types::{
    Address, ModuleAccount, Result, ServiceId, SettlementError, SettlementOpReason,
};

use crate::result::SettlementResult;

/// Aggregated amount and the number of claims that contributed to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateEntry {
    pub amount: u128,
    pub num_claims: u64,
}

impl AggregateEntry {
    fn absorb(&mut self, amount: u128) -> Result<()> {
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or_else(|| SettlementError::overflow("aggregated amount"))?;
        self.num_claims += 1;
        Ok(())
    }
}

pub type MintBurnKey = (ModuleAccount, SettlementOpReason);
pub type ModToModKey = (ModuleAccount, ModuleAccount, SettlementOpReason);
pub type ModToAcctKey = (ModuleAccount, Address, SettlementOpReason);

/// A batch ledger collapsed by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedLedger {
    pub mints: BTreeMap<MintBurnKey, AggregateEntry>,
    pub burns: BTreeMap<MintBurnKey, AggregateEntry>,
    pub mod_to_mod_transfers: BTreeMap<ModToModKey, AggregateEntry>,
    pub mod_to_acct_transfers: BTreeMap<ModToAcctKey, AggregateEntry>,
}

/// Results of a settled batch, in settlement order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementResults {
    results: Vec<SettlementResult>,
}

impl SettlementResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: SettlementResult) {
        self.results.push(result);
    }

    #[must_use]
    pub fn results(&self) -> &[SettlementResult] {
        &self.results
    }

    #[must_use]
    pub fn into_results(self) -> Vec<SettlementResult> {
        self.results
    }

    #[must_use]
    pub fn num_claims(&self) -> usize {
        self.results.len()
    }

    pub fn num_relays(&self) -> Result<u64> {
        self.results
            .iter()
            .try_fold(0u64, |acc, r| acc.checked_add(r.claim.num_relays))
            .ok_or_else(|| SettlementError::overflow("num relays"))
    }

    pub fn num_compute_units(&self) -> Result<u64> {
        self.results
            .iter()
            .try_fold(0u64, |acc, r| acc.checked_add(r.claim.num_claimed_compute_units))
            .ok_or_else(|| SettlementError::overflow("num compute units"))
    }

    #[must_use]
    pub fn consumer_addresses(&self) -> BTreeSet<Address> {
        self.results
            .iter()
            .map(|r| r.claim.application.clone())
            .collect()
    }

    #[must_use]
    pub fn operator_addresses(&self) -> BTreeSet<Address> {
        self.results
            .iter()
            .map(|r| r.claim.supplier_operator.clone())
            .collect()
    }

    #[must_use]
    pub fn service_ids(&self) -> BTreeSet<ServiceId> {
        self.results
            .iter()
            .map(|r| r.claim.service_id.clone())
            .collect()
    }

    pub fn relays_per_service(&self) -> Result<BTreeMap<ServiceId, u64>> {
        let mut per_service: BTreeMap<ServiceId, u64> = BTreeMap::new();
        for r in &self.results {
            let entry = per_service.entry(r.claim.service_id.clone()).or_insert(0);
            *entry = entry
                .checked_add(r.claim.num_relays)
                .ok_or_else(|| SettlementError::overflow("relays per service"))?;
        }
        Ok(per_service)
    }

    /// Collapse every operation in the batch by key.
    pub fn aggregate(&self) -> Result<AggregatedLedger> {
        let mut ledger = AggregatedLedger::default();
        for r in &self.results {
            // Totals within the claim first, so each key counts a claim once.
            let mut mints: BTreeMap<MintBurnKey, u128> = BTreeMap::new();
            for op in &r.mints {
                add(&mut mints, (op.module, op.reason), op.coin.amount)?;
            }
            let mut burns: BTreeMap<MintBurnKey, u128> = BTreeMap::new();
            for op in &r.burns {
                add(&mut burns, (op.module, op.reason), op.coin.amount)?;
            }
            let mut m2m: BTreeMap<ModToModKey, u128> = BTreeMap::new();
            for op in &r.mod_to_mod_transfers {
                add(&mut m2m, (op.sender, op.recipient, op.reason), op.coin.amount)?;
            }
            let mut m2a: BTreeMap<ModToAcctKey, u128> = BTreeMap::new();
            for op in &r.mod_to_acct_transfers {
                add(&mut m2a, (op.sender, op.recipient.clone(), op.reason), op.coin.amount)?;
            }

            absorb(&mut ledger.mints, mints)?;
            absorb(&mut ledger.burns, burns)?;
            absorb(&mut ledger.mod_to_mod_transfers, m2m)?;
            absorb(&mut ledger.mod_to_acct_transfers, m2a)?;
        }
        Ok(ledger)
    }

    /// Total credited to each ordinary account across the batch.
    pub fn recipient_totals(&self) -> Result<BTreeMap<Address, u128>> {
        let mut totals = BTreeMap::new();
        for r in &self.results {
            for op in &r.mod_to_acct_transfers {
                add(&mut totals, op.recipient.clone(), op.coin.amount)?;
            }
        }
        Ok(totals)
    }

    /// SHA-256 of the aggregated ledger, hex encoded.
    pub fn ledger_digest(&self) -> Result<String> {
        Ok(hex::encode(self.aggregate()?.digest()))
    }
}

impl AggregatedLedger {
    /// SHA-256 over every section in key order, prefixed by a domain tag.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(LEDGER_DIGEST_DOMAIN);

        hasher.update(b"mint");
        hasher.update((self.mints.len() as u64).to_le_bytes());
        for ((module, reason), entry) in &self.mints {
            hash_str(&mut hasher, module.name());
            hash_str(&mut hasher, reason.as_str());
            hash_entry(&mut hasher, entry);
        }

        hasher.update(b"burn");
        hasher.update((self.burns.len() as u64).to_le_bytes());
        for ((module, reason), entry) in &self.burns {
            hash_str(&mut hasher, module.name());
            hash_str(&mut hasher, reason.as_str());
            hash_entry(&mut hasher, entry);
        }

        hasher.update(b"mod_to_mod");
        hasher.update((self.mod_to_mod_transfers.len() as u64).to_le_bytes());
        for ((sender, recipient, reason), entry) in &self.mod_to_mod_transfers {
            hash_str(&mut hasher, sender.name());
            hash_str(&mut hasher, recipient.name());
            hash_str(&mut hasher, reason.as_str());
            hash_entry(&mut hasher, entry);
        }

        hasher.update(b"mod_to_acct");
        hasher.update((self.mod_to_acct_transfers.len() as u64).to_le_bytes());
        for ((sender, recipient, reason), entry) in &self.mod_to_acct_transfers {
            hash_str(&mut hasher, sender.name());
            hash_str(&mut hasher, recipient.as_str());
            hash_str(&mut hasher, reason.as_str());
            hash_entry(&mut hasher, entry);
        }

        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }
}

fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_entry(hasher: &mut Sha256, entry: &AggregateEntry) {
    hasher.update(entry.amount.to_le_bytes());
    hasher.update(entry.num_claims.to_le_bytes());
}

fn add<K: Ord>(map: &mut BTreeMap<K, u128>, key: K, amount: u128) -> Result<()> {
    let entry = map.entry(key).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| SettlementError::overflow("claim operation total"))?;
    Ok(())
}

fn absorb<K: Ord>(
    into: &mut BTreeMap<K, AggregateEntry>,
    per_claim: BTreeMap<K, u128>,
) -> Result<()> {
    for (key, amount) in per_claim {
        into.entry(key).or_default().absorb(amount)?;
    }
    Ok(())
}
