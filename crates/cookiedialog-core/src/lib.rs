//! Consent lifecycle engine for an embeddable cookie consent prompt.
//!
//! This crate decides whether to show a consent prompt and persists the
//! visitor's cookie-category choices, providing:
//!
//! - A persisted consent record with lazy expiry and schema-version checks
//! - Region gating via an IP geolocation lookup, cached for one hour
//! - A startup orchestrator that respects existing consent, auto-accepts
//!   exempt regions, or prompts
//!
//! Rendering is left to a [`PromptSurface`] implementation; storage is any
//! [`KeyValueStore`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use cookiedialog_core::{ConsentConfig, ConsentHooks, ConsentOrchestrator, MemoryStore, StartOutcome};
//!
//! # async fn example() -> Result<(), cookiedialog_core::ConsentError> {
//! let config = ConsentConfig::default().with_location(true);
//! let hooks = ConsentHooks::new().on_accept(|record| println!("granted: {:?}", record.categories));
//!
//! let mut orchestrator =
//!     ConsentOrchestrator::new(config, Arc::new(MemoryStore::new()))?.with_hooks(hooks);
//!
//! if orchestrator.start().await == StartOutcome::Prompted {
//!     // later, from the prompt UI:
//!     orchestrator.accept_all();
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `COOKIEDIALOG_STORAGE_KEY` | Storage key (default: `cookiedialog_consent`) |
//! | `COOKIEDIALOG_ENABLE_LOCATION` | Enable region gating |
//! | `COOKIEDIALOG_FORCE_SHOW` | Always show the prompt |
//! | `COOKIEDIALOG_EXPIRY_DAYS` | Record lifetime in days (default: 365) |
//! | `COOKIEDIALOG_LOCATION_ENDPOINT` | Region lookup URL (default: `https://ipapi.co/json/`) |
//! | `COOKIEDIALOG_LOCATION_TIMEOUT` | Region lookup timeout in seconds (default: 5) |

pub mod clock;
pub mod config;
pub mod error;
pub mod hooks;
pub mod orchestrator;
pub mod prompt;
pub mod record;
pub mod region;
pub mod storage;
pub mod store;

// Re-export main types
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use clock::ManualClock;
pub use config::{
    default_categories, parse_flag, CategoryDeclaration, ConsentConfig, CONSENT_SCHEMA_VERSION,
    DEFAULT_LOCATION_ENDPOINT, DEFAULT_STORAGE_KEY,
};
pub use error::{ConsentError, ConsentResult};
pub use hooks::ConsentHooks;
pub use orchestrator::{ConsentOrchestrator, StartOutcome};
pub use prompt::{HeadlessPrompt, PromptSurface};
pub use record::{ConsentReason, ConsentRecord, RegionContext, MILLIS_PER_DAY};
pub use region::{
    requires_consent, HttpRegionLookup, LookupProvider, RegionLookup, RegionLookupResult,
    RegionResolver, CONSENT_REQUIRED_COUNTRIES, REGION_CACHE_TTL_MS,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::ConsentRecordStore;
