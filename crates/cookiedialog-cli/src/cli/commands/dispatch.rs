use super::super::args::*;
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Status(args) => super::status::run(&global, args),
        Command::Start(args) => super::start::run(&global, args).await,
        Command::Accept => super::decide::accept(&global),
        Command::Reject => super::decide::reject(&global),
        Command::Save(args) => super::decide::save(&global, args),
        Command::Set(args) => super::decide::set(&global, args),
        Command::Reset => super::decide::reset(&global),
        Command::Region(args) => super::region::run(&global, args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
