//! Terminal rendering of the consent prompt.

use cookiedialog_core::{CategoryDeclaration, PromptSurface};

/// Lists the categories on stderr so stdout stays machine-readable.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PromptSurface for TerminalPrompt {
    fn show(&self, categories: &[CategoryDeclaration]) {
        eprintln!("Cookie consent required. Categories:");
        for category in categories {
            let marker = if category.required { " (required)" } else { "" };
            let name = if category.name.is_empty() {
                category.id.as_str()
            } else {
                category.name.as_str()
            };
            eprintln!("  - {} [{}]{}", name, category.id, marker);
        }
        eprintln!("Run `cookiedialog accept`, `cookiedialog reject` or `cookiedialog save <id=bool>...`.");
    }

    fn hide(&self) {}
}
