use clap::{Args, Parser, Subcommand};
use cookiedialog_core::parse_flag;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cookiedialog",
    version,
    about = "Inspect and drive cookie consent state: startup decision, region gating and stored choices"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Storage file holding the consent record (default: <data dir>/cookiedialog/storage.json)
    #[arg(long, global = true, env = "COOKIEDIALOG_STORE")]
    pub store: Option<PathBuf>,

    /// Consent config file (YAML, or JSON by extension). COOKIEDIALOG_* variables override it.
    #[arg(long, global = true, env = "COOKIEDIALOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable region gating regardless of config
    #[arg(long, global = true)]
    pub location: bool,

    /// Always show the prompt regardless of config
    #[arg(long, global = true)]
    pub force_show: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the consent record on file (exit 1 when there is none)
    Status(OutputArgs),
    /// Run the startup decision: existing consent, region exemption, or prompt
    Start(OutputArgs),
    /// Accept every category
    Accept,
    /// Reject every optional category
    Reject,
    /// Save a custom selection, e.g. `save analytics=true marketing=false`
    Save(SaveArgs),
    /// Change one category on the existing record
    Set(SetArgs),
    /// Remove the stored consent record
    Reset,
    /// Resolve the visitor's region (requires region gating)
    Region(OutputArgs),
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    /// Selections as id=bool pairs
    #[arg(required = true, value_parser = parse_selection)]
    pub selections: Vec<(String, bool)>,
}

#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Category id
    pub id: String,

    /// Granted (true/false, yes/no, 1/0, on/off)
    #[arg(action = clap::ArgAction::Set, value_parser = clap::builder::BoolishValueParser::new())]
    pub value: bool,
}

pub fn parse_selection(raw: &str) -> Result<(String, bool), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected id=bool, got {raw:?}"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing category id in {raw:?}"));
    }
    let value = parse_flag(value).ok_or_else(|| format!("invalid value in {raw:?}"))?;
    Ok((id.to_string(), value))
}
