use crate::cli::args::{GlobalArgs, OutputArgs};
use crate::exit_codes::SUCCESS;

use super::{context, output};

pub async fn run(global: &GlobalArgs, args: OutputArgs) -> anyhow::Result<i32> {
    let orchestrator = context::orchestrator(global)?;

    let Some(result) = orchestrator.region().await else {
        anyhow::bail!(
            "region gating is disabled; pass --location or set COOKIEDIALOG_ENABLE_LOCATION=1"
        );
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_region(&result);
    }
    Ok(SUCCESS)
}
