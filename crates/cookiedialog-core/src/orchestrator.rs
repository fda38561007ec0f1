//! Consent orchestrator.
//!
//! Single entry point that sequences the record store and the region
//! resolver into one startup decision, and routes the visitor's choice back
//! into storage.
//!
//! Startup order:
//! 1. Existing valid record (unless `force_show`) → accept hook, done.
//! 2. Location gating enabled → resolve region; exempt region (unless
//!    `force_show`) → write region-exempt record, hooks, done.
//! 3. Show the prompt.
//!
//! The store is always read before the resolver is consulted, so consent on
//! file never costs a network call. Concurrent `start` calls are not
//! deduplicated.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ConsentConfig;
use crate::error::{ConsentError, ConsentResult};
use crate::hooks::ConsentHooks;
use crate::prompt::{HeadlessPrompt, PromptSurface};
use crate::record::{ConsentReason, ConsentRecord};
use crate::region::{HttpRegionLookup, RegionLookupResult, RegionResolver};
use crate::storage::KeyValueStore;
use crate::store::ConsentRecordStore;

/// What `start` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A valid record was already on file.
    ExistingConsent(ConsentRecord),

    /// The region needs no prompt; a region-exempt record was written.
    RegionExempt(ConsentRecord),

    /// The prompt is being shown.
    Prompted,
}

impl std::fmt::Display for StartOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExistingConsent(_) => write!(f, "existing-consent"),
            Self::RegionExempt(_) => write!(f, "region-exempt"),
            Self::Prompted => write!(f, "prompted"),
        }
    }
}

/// Coordinates store, resolver, prompt and hooks.
pub struct ConsentOrchestrator {
    config: ConsentConfig,
    store: ConsentRecordStore,
    resolver: Option<RegionResolver>,
    hooks: ConsentHooks,
    prompt: Arc<dyn PromptSurface>,
    visible: bool,
}

impl std::fmt::Debug for ConsentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentOrchestrator")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("resolver", &self.resolver)
            .field("hooks", &self.hooks)
            .field("visible", &self.visible)
            .finish()
    }
}

impl ConsentOrchestrator {
    /// Build the default wiring: system clock, and an HTTP region lookup when
    /// location gating is enabled.
    pub fn new(config: ConsentConfig, storage: Arc<dyn KeyValueStore>) -> ConsentResult<Self> {
        config.validate()?;

        let store = ConsentRecordStore::new(storage, &config);
        let resolver = if config.enable_location {
            let lookup = HttpRegionLookup::from_config(&config)?;
            Some(RegionResolver::new(Arc::new(lookup)))
        } else {
            None
        };

        Self::with_parts(config, store, resolver)
    }

    /// Build from injected collaborators.
    ///
    /// The resolver is ignored when location gating is disabled, and required
    /// when it is enabled.
    pub fn with_parts(
        config: ConsentConfig,
        store: ConsentRecordStore,
        resolver: Option<RegionResolver>,
    ) -> ConsentResult<Self> {
        config.validate()?;

        let resolver = if config.enable_location {
            Some(resolver.ok_or_else(|| ConsentError::Config {
                message: "location gating enabled but no region resolver supplied".to_string(),
            })?)
        } else {
            None
        };

        Ok(Self {
            config,
            store,
            resolver,
            hooks: ConsentHooks::default(),
            prompt: Arc::new(HeadlessPrompt),
            visible: false,
        })
    }

    pub fn with_hooks(mut self, hooks: ConsentHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn PromptSurface>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    pub fn store(&self) -> &ConsentRecordStore {
        &self.store
    }

    /// Run the startup decision.
    pub async fn start(&mut self) -> StartOutcome {
        if !self.config.force_show && self.store.exists() {
            if let Some(record) = self.store.read() {
                debug!(reason = %record.reason, "consent already on file");
                self.hooks.accept(&record);
                return StartOutcome::ExistingConsent(record);
            }
        }

        if let Some(resolver) = self.resolver.clone() {
            let region = resolver.resolve().await;

            if !region.requires_consent && !self.config.force_show {
                let context = region.to_context(resolver.detection_method());
                let record = self.store.write(
                    self.all_granted(),
                    ConsentReason::RegionExempt,
                    Some(context.clone()),
                );
                info!(country = ?context.country, "region does not require consent, auto-accepted");
                self.hooks.location_not_required(&context);
                self.hooks.accept(&record);
                return StartOutcome::RegionExempt(record);
            }

            if region == RegionLookupResult::fail_safe() {
                debug!("region unknown, showing prompt");
            } else {
                debug!(country = ?region.country, force_show = self.config.force_show, "showing prompt");
            }
        }

        self.show();
        StartOutcome::Prompted
    }

    /// Grant every declared category.
    pub fn accept_all(&mut self) -> ConsentRecord {
        let record = self
            .store
            .write(self.all_granted(), ConsentReason::ExplicitAccept, None);
        info!("visitor accepted all categories");
        self.hide();
        self.hooks.accept(&record);
        record
    }

    /// Grant required categories only.
    pub fn reject_optional(&mut self) -> ConsentRecord {
        let categories = self
            .config
            .categories
            .iter()
            .map(|c| (c.id.clone(), c.required))
            .collect();
        let record = self
            .store
            .write(categories, ConsentReason::ExplicitReject, None);
        info!("visitor rejected optional categories");
        self.hide();
        self.hooks.reject();
        record
    }

    /// Save an explicit selection.
    ///
    /// Required categories are granted regardless of `selections`; ids that
    /// were never declared pass through unchanged.
    pub fn save_custom(&mut self, selections: BTreeMap<String, bool>) -> ConsentRecord {
        let mut categories = selections;
        for category in self.config.categories.iter().filter(|c| c.required) {
            categories.insert(category.id.clone(), true);
        }

        let record = self
            .store
            .write(categories, ConsentReason::ExplicitAccept, None);
        info!(granted = record.granted().count(), "visitor saved custom selection");
        self.hide();
        self.hooks.change(&record);
        record
    }

    /// Change one category on the existing record.
    pub fn update_category(&mut self, id: &str, value: bool) -> Option<ConsentRecord> {
        let record = self.store.update_category(id, value)?;
        self.hooks.change(&record);
        Some(record)
    }

    /// Forget the stored decision and prompt again.
    pub fn reset(&mut self) {
        self.store.clear();
        info!("consent reset");
        self.show();
    }

    pub fn consent(&self) -> Option<ConsentRecord> {
        self.store.read()
    }

    pub fn has_consent(&self, category: &str) -> bool {
        self.store.category_consent(category)
    }

    /// Resolve the visitor's region. `None` when location gating is disabled.
    pub async fn region(&self) -> Option<RegionLookupResult> {
        match &self.resolver {
            Some(resolver) => Some(resolver.resolve().await),
            None => None,
        }
    }

    pub fn show(&mut self) {
        self.prompt.show(&self.config.categories);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.prompt.hide();
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn all_granted(&self) -> BTreeMap<String, bool> {
        self.config
            .categories
            .iter()
            .map(|c| (c.id.clone(), true))
            .collect()
    }
}
