//! Rendering of peering objects for the terminal
//!
//! Every function returns the text to print and leaves its input untouched.

use clap::ValueEnum;
use crds::NetPeering;
use serde::Serialize;
use serde_json::json;

use crate::Result;

const NONE: &str = "<none>";

/// Table columns, in order
pub const PEERING_COLUMNS: [&str; 7] = [
    "NAME",
    "SOURCE NET ID",
    "ACCEPTER NET ID",
    "PEERING ID",
    "STATE",
    "MESSAGE",
    "EXPIRATION",
];

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Columnar table (default)
    #[default]
    Table,
    Json,
    Yaml,
    /// kubectl's own wide table
    Wide,
}

/// Formats for commands that only print documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl From<DocumentFormat> for OutputFormat {
    fn from(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Json => OutputFormat::Json,
            DocumentFormat::Yaml => OutputFormat::Yaml,
        }
    }
}

/// A single object as JSON or YAML; table formats fall back to JSON
pub fn render_object<T: Serialize>(object: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(object)?),
        OutputFormat::Json | OutputFormat::Table | OutputFormat::Wide => {
            Ok(serde_json::to_string_pretty(object)?)
        }
    }
}

pub fn render_peering(peering: &NetPeering, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => render_object(peering, format),
        OutputFormat::Table | OutputFormat::Wide => Ok(render_table(std::slice::from_ref(peering))),
    }
}

/// Peerings as a `List` document or a table
pub fn render_peerings(peerings: &[NetPeering], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let list = json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": peerings,
            });
            render_object(&list, format)
        }
        OutputFormat::Table | OutputFormat::Wide => Ok(render_table(peerings)),
    }
}

/// A status line; structured formats wrap it as `{"message": ...}`
pub fn render_message(message: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            render_object(&json!({ "message": message }), format)
        }
        OutputFormat::Table | OutputFormat::Wide => Ok(message.to_string()),
    }
}

/// Outcome of a successful create: `{"message": ..., "netPeering": {...}}`
pub fn render_created(message: &str, peering: &NetPeering, format: DocumentFormat) -> Result<String> {
    render_object(
        &json!({ "message": message, "netPeering": peering }),
        format.into(),
    )
}

fn peering_row(peering: &NetPeering) -> Vec<String> {
    let status = peering.status.as_ref();
    let cell = |value: Option<&String>| value.map_or(NONE, String::as_str).to_string();

    vec![
        cell(peering.metadata.name.as_ref()),
        cell(status.and_then(|s| s.source_net_id.as_ref())),
        cell(status.and_then(|s| s.accepter_net_id.as_ref())),
        cell(status.and_then(|s| s.net_peering_id.as_ref())),
        cell(status.and_then(|s| s.net_peering_state.as_ref())),
        cell(status.and_then(|s| s.net_peering_state_message.as_ref())),
        cell(status.and_then(|s| s.expiration_date.as_ref())),
    ]
}

fn render_table(peerings: &[NetPeering]) -> String {
    let rows: Vec<Vec<String>> = peerings.iter().map(peering_row).collect();
    format_table(&PEERING_COLUMNS, &rows)
}

/// Column-aligned table with headers, two spaces between columns
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let width = widths.get(i).copied().unwrap_or(0);
                format!("{:<width$}", cell, width = width)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(headers.to_vec())];
    lines.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    lines.join("\n")
}
