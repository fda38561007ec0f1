//! Notification hooks.
//!
//! Plain synchronous callbacks. A panic inside a hook is not caught and
//! propagates to whoever drove the orchestrator.

use crate::record::{ConsentRecord, RegionContext};

type RecordHook = Box<dyn Fn(&ConsentRecord) + Send + Sync>;
type RegionHook = Box<dyn Fn(&RegionContext) + Send + Sync>;
type UnitHook = Box<dyn Fn() + Send + Sync>;

/// Callbacks fired by the orchestrator. Unset hooks are skipped.
#[derive(Default)]
pub struct ConsentHooks {
    on_accept: Option<RecordHook>,
    on_reject: Option<UnitHook>,
    on_change: Option<RecordHook>,
    on_location_not_required: Option<RegionHook>,
}

impl std::fmt::Debug for ConsentHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentHooks")
            .field("on_accept", &self.on_accept.is_some())
            .field("on_reject", &self.on_reject.is_some())
            .field("on_change", &self.on_change.is_some())
            .field(
                "on_location_not_required",
                &self.on_location_not_required.is_some(),
            )
            .finish()
    }
}

impl ConsentHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired with the record on accept-all, on an existing valid record at
    /// startup, and after a region exemption.
    pub fn on_accept(mut self, hook: impl Fn(&ConsentRecord) + Send + Sync + 'static) -> Self {
        self.on_accept = Some(Box::new(hook));
        self
    }

    /// Fired on reject-optional. Informational only, no record is passed.
    pub fn on_reject(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_reject = Some(Box::new(hook));
        self
    }

    /// Fired with the new record after a custom save or a single-category update.
    pub fn on_change(mut self, hook: impl Fn(&ConsentRecord) + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// Fired when region lookup exempts the visitor from the prompt.
    pub fn on_location_not_required(
        mut self,
        hook: impl Fn(&RegionContext) + Send + Sync + 'static,
    ) -> Self {
        self.on_location_not_required = Some(Box::new(hook));
        self
    }

    pub(crate) fn accept(&self, record: &ConsentRecord) {
        if let Some(hook) = &self.on_accept {
            hook(record);
        }
    }

    pub(crate) fn reject(&self) {
        if let Some(hook) = &self.on_reject {
            hook();
        }
    }

    pub(crate) fn change(&self, record: &ConsentRecord) {
        if let Some(hook) = &self.on_change {
            hook(record);
        }
    }

    pub(crate) fn location_not_required(&self, context: &RegionContext) {
        if let Some(hook) = &self.on_location_not_required {
            hook(context);
        }
    }
}
