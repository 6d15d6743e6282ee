//! Per-identity placement cooldowns
//!
//! One record per identity, written on every successful placement. An identity
//! with no record is ready.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::StoreError;
use crate::store::{DocumentStore, COOLDOWN_COLLECTION};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownRecord {
    pub identity: String,
    pub cooldown_end: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Ready,
    Waiting { remaining_ms: i64 },
}

impl CooldownStatus {
    /// An identity may place iff `now >= cooldown_end`
    pub fn at(cooldown_end: i64, now: i64) -> Self {
        if now >= cooldown_end {
            CooldownStatus::Ready
        } else {
            CooldownStatus::Waiting {
                remaining_ms: cooldown_end - now,
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CooldownStatus::Ready)
    }
}

pub struct CooldownLedger {
    store: Arc<dyn DocumentStore>,
}

impl CooldownLedger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Stored deadline for `identity`, or `now` when it has never placed
    pub async fn get_cooldown_end(&self, identity: &str, now: i64) -> Result<i64, StoreError> {
        match self.store.get(COOLDOWN_COLLECTION, identity).await? {
            Some(doc) => {
                let record: CooldownRecord = serde_json::from_value(doc)?;
                Ok(record.cooldown_end)
            }
            None => Ok(now),
        }
    }

    /// Start a fresh window ending at `now + interval_ms`. Last write wins.
    pub async fn advance_cooldown(
        &self,
        identity: &str,
        interval_ms: i64,
        now: i64,
    ) -> Result<i64, StoreError> {
        let record = CooldownRecord {
            identity: identity.to_string(),
            cooldown_end: now.saturating_add(interval_ms),
        };

        self.store
            .set(COOLDOWN_COLLECTION, identity, serde_json::to_value(&record)?)
            .await?;
        Ok(record.cooldown_end)
    }

    pub async fn status(&self, identity: &str, now: i64) -> Result<CooldownStatus, StoreError> {
        let cooldown_end = self.get_cooldown_end(identity, now).await?;
        Ok(CooldownStatus::at(cooldown_end, now))
    }
}
