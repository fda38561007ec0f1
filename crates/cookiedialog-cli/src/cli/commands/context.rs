//! Builds the orchestrator from global arguments, config file and environment.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cookiedialog_core::{ConsentConfig, ConsentOrchestrator, FileStore};
use tracing::debug;

use crate::cli::args::GlobalArgs;
use crate::prompt::TerminalPrompt;

pub fn load_config(global: &GlobalArgs) -> anyhow::Result<ConsentConfig> {
    let mut config = match &global.config {
        Some(path) => ConsentConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?
            .merge_env(),
        None => ConsentConfig::from_env(),
    };

    if global.location {
        config.enable_location = true;
    }
    if global.force_show {
        config.force_show = true;
    }

    Ok(config)
}

pub fn store_path(global: &GlobalArgs) -> anyhow::Result<PathBuf> {
    if let Some(path) = &global.store {
        return Ok(path.clone());
    }
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .context("could not determine a data directory; pass --store")?;
    Ok(base.join("cookiedialog").join("storage.json"))
}

pub fn orchestrator(global: &GlobalArgs) -> anyhow::Result<ConsentOrchestrator> {
    let config = load_config(global)?;
    let path = store_path(global)?;
    debug!(store = %path.display(), "using file store");

    let orchestrator = ConsentOrchestrator::new(config, Arc::new(FileStore::new(path)))
        .context("invalid consent configuration")?
        .with_prompt(Arc::new(TerminalPrompt));
    Ok(orchestrator)
}
