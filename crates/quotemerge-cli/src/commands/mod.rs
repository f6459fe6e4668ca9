mod merge;
mod normalize;
mod stats;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use quotemerge_core::{MergeConfig, MergeEngine, QuoteRecord};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

const CONFIG_ENV: &str = "QUOTEMERGE_CONFIG";

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Normalize(args) => normalize::run(args),
        Command::Merge(args) => merge::run(args, &load_engine(cli.config.as_deref())?),
        Command::Stats(args) => stats::run(args, &load_engine(cli.config.as_deref())?),
    }
}

/// Engine from `--config`, then `QUOTEMERGE_CONFIG`, then defaults.
fn load_engine(flag: Option<&Path>) -> Result<MergeEngine, CliError> {
    let path = flag
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading merge config");
            MergeConfig::from_path(&path)?
        }
        None => MergeConfig::default(),
    };
    Ok(MergeEngine::new(config)?)
}

fn read_json(path: &Path) -> Result<Value, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|error| CliError::MalformedInput {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn read_array(path: &Path) -> Result<Vec<Value>, CliError> {
    match read_json(path)? {
        Value::Array(items) => Ok(items),
        _ => Err(CliError::MalformedInput {
            path: path.to_path_buf(),
            message: String::from("expected a JSON array"),
        }),
    }
}

/// Records from a bare array or from a `normalize` output document.
fn read_records(path: &Path) -> Result<Vec<Value>, CliError> {
    let records = match read_json(path)? {
        Value::Array(items) => Some(items),
        Value::Object(mut document) => document
            .get_mut("data")
            .and_then(|data| data.get_mut("records"))
            .map(Value::take)
            .and_then(|records| match records {
                Value::Array(items) => Some(items),
                _ => None,
            }),
        _ => None,
    };
    records.ok_or_else(|| CliError::MalformedInput {
        path: path.to_path_buf(),
        message: String::from("expected a JSON array or a document with data.records"),
    })
}

/// One source group per file.
fn read_groups(paths: &[PathBuf]) -> Result<Vec<Vec<QuoteRecord>>, CliError> {
    paths
        .iter()
        .map(|path| -> Result<Vec<QuoteRecord>, CliError> {
            read_records(path)?
                .into_iter()
                .map(|item| QuoteRecord::from_value(item).map_err(CliError::from))
                .collect()
        })
        .collect()
}
