use quotemerge_core::MergeEngine;

use crate::cli::StatsArgs;
use crate::error::CliError;

use super::{read_groups, CommandResult};

pub fn run(args: &StatsArgs, engine: &MergeEngine) -> Result<CommandResult, CliError> {
    let groups = read_groups(&args.inputs)?;
    let stats = engine.statistics(&groups);
    Ok(CommandResult::ok(serde_json::to_value(stats)?))
}
