use cookiedialog_core::StartOutcome;
use serde_json::json;

use crate::cli::args::{GlobalArgs, OutputArgs};
use crate::exit_codes::SUCCESS;

use super::{context, output};

pub async fn run(global: &GlobalArgs, args: OutputArgs) -> anyhow::Result<i32> {
    let mut orchestrator = context::orchestrator(global)?;
    let outcome = orchestrator.start().await;

    if args.json {
        let record = match &outcome {
            StartOutcome::ExistingConsent(r) | StartOutcome::RegionExempt(r) => Some(r),
            StartOutcome::Prompted => None,
        };
        let body = json!({
            "outcome": outcome.to_string(),
            "record": record,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(SUCCESS);
    }

    println!("outcome:    {}", outcome);
    match &outcome {
        StartOutcome::ExistingConsent(record) | StartOutcome::RegionExempt(record) => {
            output::print_record(record, orchestrator.store());
        }
        StartOutcome::Prompted => {}
    }
    Ok(SUCCESS)
}
