use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

const RECORD_COLUMNS: [&str; 7] = [
    "code",
    "name",
    "price",
    "change_percent",
    "board",
    "source",
    "quality_score",
];

#[derive(Debug, Serialize)]
struct Document<'a> {
    data: &'a Value,
    warnings: &'a [String],
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let document = Document {
                data: &result.data,
                warnings: &result.warnings,
            };
            let payload = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(result)?),
    }
    Ok(())
}

fn render_table(result: &CommandResult) -> Result<String, CliError> {
    let mut out = String::new();

    if !result.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &result.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    match result.data.get("records").and_then(Value::as_array) {
        Some(records) => {
            for (key, value) in result.data.as_object().into_iter().flatten() {
                if key != "records" && key != "failures" {
                    out.push_str(&format!("{key:<14}: {}\n", scalar(value)));
                }
            }
            out.push_str(&records_table(records));
        }
        None => {
            let pretty = serde_json::to_string_pretty(&result.data)?;
            for line in pretty.lines() {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

fn records_table(records: &[Value]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            RECORD_COLUMNS
                .iter()
                .map(|column| record.get(*column).map(scalar).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = RECORD_COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = RECORD_COLUMNS.iter().map(|c| (*c).to_owned()).collect();
    let mut out = format_row(&header, &widths);
    for row in &rows {
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn table_lists_records_in_columns() {
        let result = CommandResult::ok(json!({
            "unique_stocks": 1,
            "records": [{
                "code": "600000",
                "name": "浦发银行",
                "price": 10.5,
                "change_percent": 1.2,
                "board": "沪A",
                "source": "tencent",
                "quality_score": 0.8,
            }],
        }));

        let table = render_table(&result).expect("render");
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "unique_stocks : 1");
        assert!(lines[1].starts_with("code"));
        assert!(lines[2].starts_with("600000  浦发银行"));
        assert!(lines[2].ends_with("0.8"));
    }

    #[test]
    fn table_falls_back_to_pretty_json() {
        let result = CommandResult::ok(json!({"total_records": 3}))
            .with_warnings(vec![String::from("item 0 (unknown): no stock code found in payload")]);
        let table = render_table(&result).expect("render");
        assert!(table.starts_with("warnings:\n  - item 0"));
        assert!(table.contains("\"total_records\": 3"));
    }
}
