//! The persisted consent record and its wire format.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds per day, the unit of the expiry window.
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// How a record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsentReason {
    /// The visitor accepted (all or a custom selection).
    #[serde(rename = "user_accept")]
    ExplicitAccept,

    /// The visitor rejected every optional category.
    #[serde(rename = "user_reject")]
    ExplicitReject,

    /// Region lookup found no consent requirement.
    #[serde(rename = "location_not_required")]
    RegionExempt,
}

impl std::fmt::Display for ConsentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExplicitAccept => write!(f, "explicit-accept"),
            Self::ExplicitReject => write!(f, "explicit-reject"),
            Self::RegionExempt => write!(f, "region-exempt"),
        }
    }
}

/// Region metadata attached to region-exempt records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Whether the region required consent.
    #[serde(rename = "inEU")]
    pub in_eu: bool,

    /// Lookup mechanism that produced this context.
    #[serde(rename = "detectionMethod")]
    pub detection_method: String,
}

/// A persisted consent decision.
///
/// Wire shape:
///
/// ```text
/// { "timestamp": 1700000000000,
///   "categories": { "necessary": true, "analytics": false },
///   "version": "1.0.0",
///   "reason": "user_accept",
///   "locationData": { "country": "US", "inEU": false, "detectionMethod": "ipapi" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Epoch milliseconds when the record was written.
    #[serde(rename = "timestamp")]
    pub created_at: i64,

    pub categories: BTreeMap<String, bool>,

    #[serde(rename = "version")]
    pub schema_version: String,

    pub reason: ConsentReason,

    #[serde(
        rename = "locationData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub region_context: Option<RegionContext>,
}

impl ConsentRecord {
    /// Whether `category` was granted. Unknown ids are not granted.
    pub fn is_granted(&self, category: &str) -> bool {
        self.categories.get(category).copied().unwrap_or(false)
    }

    /// Epoch milliseconds after which the record is expired.
    ///
    /// Expiry is fixed from creation; reading a record never extends it.
    pub fn expires_at(&self, expiry_days: u32) -> i64 {
        self.created_at
            .saturating_add(i64::from(expiry_days).saturating_mul(MILLIS_PER_DAY))
    }

    /// Strictly past the expiry instant.
    pub fn is_expired(&self, expiry_days: u32, now_millis: i64) -> bool {
        now_millis > self.expires_at(expiry_days)
    }

    /// Creation time as a UTC datetime, for display.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.created_at).single()
    }

    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(id, _)| id.as_str())
    }
}
