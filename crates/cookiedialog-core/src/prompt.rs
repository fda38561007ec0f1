//! Boundary to whatever renders the consent prompt.

use crate::config::CategoryDeclaration;

/// Displays and dismisses the consent prompt.
///
/// Implementations render the categories and call back into the
/// orchestrator's decision operations when the visitor chooses.
pub trait PromptSurface: Send + Sync {
    fn show(&self, categories: &[CategoryDeclaration]);

    fn hide(&self);
}

/// Prompt surface that renders nothing. Visibility is still tracked by the
/// orchestrator.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPrompt;

impl PromptSurface for HeadlessPrompt {
    fn show(&self, _categories: &[CategoryDeclaration]) {}

    fn hide(&self) {}
}
