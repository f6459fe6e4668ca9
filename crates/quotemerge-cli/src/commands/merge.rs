use quotemerge_core::MergeEngine;
use serde_json::json;

use crate::cli::MergeArgs;
use crate::error::CliError;

use super::{read_groups, CommandResult};

pub fn run(args: &MergeArgs, engine: &MergeEngine) -> Result<CommandResult, CliError> {
    let groups = read_groups(&args.inputs)?;
    let total: usize = groups.iter().map(Vec::len).sum();

    let records = engine.merge(groups, !args.no_enrich);

    let data = json!({
        "total_records": total,
        "unique_stocks": records.len(),
        "records": records,
    });
    Ok(CommandResult::ok(data))
}
