use crate::cli::args::{GlobalArgs, OutputArgs};
use crate::exit_codes::{NO_CONSENT, SUCCESS};

use super::{context, output};

pub fn run(global: &GlobalArgs, args: OutputArgs) -> anyhow::Result<i32> {
    let orchestrator = context::orchestrator(global)?;

    match orchestrator.consent() {
        Some(record) => {
            if args.json {
                output::print_record_json(&record)?;
            } else {
                output::print_record(&record, orchestrator.store());
            }
            Ok(SUCCESS)
        }
        None => {
            if args.json {
                println!("null");
            } else {
                println!("no consent on file");
            }
            Ok(NO_CONSENT)
        }
    }
}
