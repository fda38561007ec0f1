//! Decision commands: the operations a prompt UI would call.

use std::collections::BTreeMap;

use crate::cli::args::{GlobalArgs, SaveArgs, SetArgs};
use crate::exit_codes::{NO_CONSENT, SUCCESS};

use super::{context, output};

pub fn accept(global: &GlobalArgs) -> anyhow::Result<i32> {
    let mut orchestrator = context::orchestrator(global)?;
    let record = orchestrator.accept_all();
    output::print_record(&record, orchestrator.store());
    Ok(SUCCESS)
}

pub fn reject(global: &GlobalArgs) -> anyhow::Result<i32> {
    let mut orchestrator = context::orchestrator(global)?;
    let record = orchestrator.reject_optional();
    output::print_record(&record, orchestrator.store());
    Ok(SUCCESS)
}

pub fn save(global: &GlobalArgs, args: SaveArgs) -> anyhow::Result<i32> {
    let mut orchestrator = context::orchestrator(global)?;

    let declared: Vec<&str> = orchestrator
        .config()
        .categories
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    for (id, _) in &args.selections {
        if !declared.contains(&id.as_str()) {
            tracing::warn!(category = %id, "saving undeclared category");
        }
    }

    let selections: BTreeMap<String, bool> = args.selections.into_iter().collect();
    let record = orchestrator.save_custom(selections);
    output::print_record(&record, orchestrator.store());
    Ok(SUCCESS)
}

pub fn set(global: &GlobalArgs, args: SetArgs) -> anyhow::Result<i32> {
    let mut orchestrator = context::orchestrator(global)?;
    match orchestrator.update_category(&args.id, args.value) {
        Some(record) => {
            output::print_record(&record, orchestrator.store());
            Ok(SUCCESS)
        }
        None => {
            println!("no consent on file");
            Ok(NO_CONSENT)
        }
    }
}

pub fn reset(global: &GlobalArgs) -> anyhow::Result<i32> {
    let mut orchestrator = context::orchestrator(global)?;
    orchestrator.reset();
    println!("consent cleared");
    Ok(SUCCESS)
}
