use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{EngineError, ResultEngine};

mod donations;
mod forum;
mod fundraisers;
mod people;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    ledger_locks: LedgerLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// One async lock per fundraiser.
///
/// Ledger writes and status transitions for the same fundraiser run one at a
/// time; different fundraisers never wait on each other. A slot lives only
/// while some caller holds or waits for it.
#[derive(Debug, Default)]
struct LedgerLocks {
    slots: Mutex<HashMap<i32, Arc<AsyncMutex<()>>>>,
}

impl LedgerLocks {
    async fn acquire(&self, fundraiser_id: i32) -> LedgerGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(fundraiser_id).or_default())
        };
        LedgerGuard {
            locks: self,
            fundraiser_id,
            guard: Some(slot.lock_owned().await),
        }
    }
}

/// Held lock on one fundraiser's ledger. Dropping it releases the lock and
/// removes the slot when nobody else references it.
struct LedgerGuard<'a> {
    locks: &'a LedgerLocks,
    fundraiser_id: i32,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LedgerGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // New waiters clone the slot under this same map lock.
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slots
            .get(&self.fundraiser_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.fundraiser_id);
        }
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            ledger_locks: LedgerLocks::default(),
        })
    }
}
