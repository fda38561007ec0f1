//! Consent record store.
//!
//! Sole owner of the persisted record. Validity, expiry and versioning are
//! decided here so no caller reasons about raw storage. None of the public
//! operations return errors: storage and parse failures are logged and
//! degraded.
//!
//! # Record states
//!
//! ```text
//! ABSENT --write--> VALID --read (expired | version mismatch)--> ABSENT
//! ```
//!
//! Expiry is evaluated lazily on read, from the creation timestamp.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ConsentConfig;
use crate::error::ConsentError;
use crate::record::{ConsentReason, ConsentRecord, RegionContext};
use crate::storage::KeyValueStore;

/// Reads and writes the consent record under a fixed key.
#[derive(Clone)]
pub struct ConsentRecordStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    expiry_days: u32,
    schema_version: String,
    required: Vec<String>,
}

impl std::fmt::Debug for ConsentRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentRecordStore")
            .field("key", &self.key)
            .field("expiry_days", &self.expiry_days)
            .field("schema_version", &self.schema_version)
            .field("required", &self.required)
            .finish()
    }
}

impl ConsentRecordStore {
    /// Store using the system clock.
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &ConsentConfig) -> Self {
        Self::with_clock(storage, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        storage: Arc<dyn KeyValueStore>,
        config: &ConsentConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            clock,
            key: config.storage_key.clone(),
            expiry_days: config.expiry_days,
            schema_version: config.schema_version.clone(),
            required: config.required_ids(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn expiry_days(&self) -> u32 {
        self.expiry_days
    }

    /// The current valid record, if any.
    ///
    /// Expired or version-mismatched records are erased as a side effect.
    /// Malformed records are left in place and reported as absent. Required
    /// categories are always reported as granted, even when the stored copy
    /// predates their declaration or says otherwise.
    pub fn read(&self) -> Option<ConsentRecord> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "consent storage unreadable, treating as absent");
                return None;
            }
        };

        let mut record = match parse_record(&raw) {
            Ok(record) => record,
            Err(e) => {
                debug!(key = %self.key, error = %e, "ignoring malformed consent record");
                return None;
            }
        };

        if record.schema_version != self.schema_version {
            debug!(
                stored = %record.schema_version,
                current = %self.schema_version,
                "consent record version mismatch"
            );
            self.erase();
            return None;
        }

        let now = self.clock.now_millis();
        if record.is_expired(self.expiry_days, now) {
            debug!(
                created_at = record.created_at,
                expires_at = record.expires_at(self.expiry_days),
                "consent record expired"
            );
            self.erase();
            return None;
        }

        for id in &self.required {
            if !record.is_granted(id) {
                debug!(category = %id, "required category not granted on stored record, forcing");
                record.categories.insert(id.clone(), true);
            }
        }

        Some(record)
    }

    /// Write a fresh record and return it.
    ///
    /// Required categories are forced to `true`. If persisting fails the
    /// record is still returned, so the session behaves as consented.
    pub fn write(
        &self,
        categories: BTreeMap<String, bool>,
        reason: ConsentReason,
        region_context: Option<RegionContext>,
    ) -> ConsentRecord {
        let mut categories = categories;
        for id in &self.required {
            categories.insert(id.clone(), true);
        }

        let record = ConsentRecord {
            created_at: self.clock.now_millis(),
            categories,
            schema_version: self.schema_version.clone(),
            reason,
            region_context,
        };

        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = self.storage.set(&self.key, &json) {
                    warn!(key = %self.key, error = %e, "failed to persist consent, keeping it for this session");
                } else {
                    debug!(key = %self.key, reason = %record.reason, "consent record written");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to serialize consent record");
            }
        }

        record
    }

    pub fn exists(&self) -> bool {
        self.read().is_some()
    }

    /// Remove the stored record. Idempotent.
    pub fn clear(&self) {
        self.erase();
    }

    /// Whether `id` is granted by the current valid record.
    pub fn category_consent(&self, id: &str) -> bool {
        self.read().is_some_and(|record| record.is_granted(id))
    }

    /// Rewrite the current record with one category changed.
    ///
    /// Returns `None` and leaves storage alone when no valid record exists.
    /// Reason and region context carry over; `created_at` is refreshed.
    pub fn update_category(&self, id: &str, value: bool) -> Option<ConsentRecord> {
        let current = self.read()?;
        let mut categories = current.categories;
        categories.insert(id.to_string(), value);
        Some(self.write(categories, current.reason, current.region_context))
    }

    fn erase(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            warn!(key = %self.key, error = %e, "failed to remove consent record");
        }
    }
}

fn parse_record(raw: &str) -> Result<ConsentRecord, ConsentError> {
    serde_json::from_str(raw).map_err(|e| ConsentError::MalformedRecord {
        message: e.to_string(),
    })
}
