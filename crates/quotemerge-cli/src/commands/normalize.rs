use quotemerge_core::{normalize_batch, BatchOptions, SourceId};
use serde_json::json;

use crate::cli::NormalizeArgs;
use crate::error::CliError;

use super::{read_array, CommandResult};

pub fn run(args: &NormalizeArgs) -> Result<CommandResult, CliError> {
    let source: SourceId = args.source.parse()?;
    let raws = read_array(&args.input)?;
    let options = BatchOptions {
        skip_invalid: !args.keep_invalid,
        ..BatchOptions::default()
    };

    let batch = normalize_batch(source, &raws, &options);

    let warnings = batch
        .failures
        .iter()
        .map(|failure| {
            format!(
                "item {} ({}): {}",
                failure.index, failure.code, failure.error
            )
        })
        .collect();

    let data = json!({
        "source": source,
        "records": batch.records,
        "failures": batch.failures,
        "skipped": batch.skipped,
    });
    Ok(CommandResult::ok(data).with_warnings(warnings))
}
