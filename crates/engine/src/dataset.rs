//! In-memory collections handed to the engine by the data source.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Record, ResultEngine,
    entities::{Agent, AuditLog, Pickup, Referral, User, Wallet},
};

/// One collection per entity. Missing collections deserialize as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub agents: Vec<Agent>,
    pub users: Vec<User>,
    pub pickups: Vec<Pickup>,
    pub referrals: Vec<Referral>,
    pub audit_logs: Vec<AuditLog>,
    pub wallets: Vec<Wallet>,
}

impl Dataset {
    /// Parses and validates a JSON dataset.
    pub fn from_json(input: &str) -> ResultEngine<Self> {
        let dataset: Self = serde_json::from_str(input)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Checks that identifiers are unique within each collection.
    pub fn validate(&self) -> ResultEngine<()> {
        ensure_unique_ids(&self.agents)?;
        ensure_unique_ids(&self.users)?;
        ensure_unique_ids(&self.pickups)?;
        ensure_unique_ids(&self.referrals)?;
        ensure_unique_ids(&self.audit_logs)?;
        ensure_unique_ids(&self.wallets)?;
        Ok(())
    }
}

fn ensure_unique_ids<R: Record>(records: &[R]) -> ResultEngine<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            return Err(EngineError::DuplicateId(format!(
                "{} {}",
                R::ENTITY,
                record.id()
            )));
        }
    }
    Ok(())
}
