//! Output formatting utilities for netctl
//!
//! Every `render_*` function returns the finished text so commands decide
//! where it goes and tests can inspect it.

use crate::cli::OutputFormat;
use colored::*;
use netlens_core::errors::CoreError;
use netlens_core::prelude::*;
use netlens_http_bridge::{LoadNetworkResponse, NetworksResponse};
use serde::Serialize;
use tabled::{builder::Builder, Table, Tabled};

const MISSING: &str = "-";
const SNAPSHOT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the saved networks of the server
pub fn render_networks(networks: &NetworksResponse, format: &OutputFormat) -> Result<String, CoreError> {
    match format {
        OutputFormat::Table => {
            if networks.networks.is_empty() {
                return Ok("No saved networks found".to_string());
            }
            let rows: Vec<NetworkTableRow> = networks
                .networks
                .iter()
                .map(|name| NetworkTableRow {
                    name: name.clone(),
                    active: if is_active(name, networks.active.as_deref()) { "*" } else { "" }.to_string(),
                })
                .collect();
            Ok(Table::new(rows).to_string())
        }
        OutputFormat::Json => to_json(networks),
        OutputFormat::Csv => {
            let mut records = vec![vec!["name".to_string(), "active".to_string()]];
            for name in &networks.networks {
                records.push(vec![
                    name.clone(),
                    is_active(name, networks.active.as_deref()).to_string(),
                ]);
            }
            to_csv(records)
        }
    }
}

/// Render the outcome of loading a network
pub fn render_loaded(loaded: &LoadNetworkResponse, format: &OutputFormat) -> Result<String, CoreError> {
    match format {
        OutputFormat::Table => {
            let mut lines = vec![format!("{} {}", "✓ Loaded network".green().bold(), loaded.network)];
            lines.push(format!("{:<12} {}", "Snapshots:".bold(), loaded.snapshots));
            lines.push(format!("{:<12} {}", "Components:".bold(), join_components(&loaded.components)));
            if let Some(replaced) = &loaded.replaced {
                lines.push(format!("{:<12} {}", "Replaced:".bold(), replaced));
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => to_json(loaded),
        OutputFormat::Csv => to_csv(vec![
            vec!["network".to_string(), "snapshots".to_string(), "replaced".to_string()],
            vec![
                loaded.network.clone(),
                loaded.snapshots.to_string(),
                loaded.replaced.clone().unwrap_or_default(),
            ],
        ]),
    }
}

/// Render the component types that hold data
pub fn render_components(components: &[ComponentType], format: &OutputFormat) -> Result<String, CoreError> {
    match format {
        OutputFormat::Table => {
            if components.is_empty() {
                return Ok("No components with data".to_string());
            }
            let rows: Vec<ComponentTableRow> = components
                .iter()
                .map(|c| ComponentTableRow {
                    component: c.to_string(),
                })
                .collect();
            Ok(Table::new(rows).to_string())
        }
        OutputFormat::Json => to_json(&serde_json::json!({ "components": components })),
        OutputFormat::Csv => {
            let mut records = vec![vec!["component".to_string()]];
            records.extend(components.iter().map(|c| vec![c.to_string()]));
            to_csv(records)
        }
    }
}

/// Render the static and varying attribute names of a component type
pub fn render_attributes(
    component: &str,
    attributes: &ComponentAttributes,
    format: &OutputFormat,
) -> Result<String, CoreError> {
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["static".to_string(), "varying".to_string()]);
            let depth = attributes.static_attributes.len().max(attributes.varying.len());
            for i in 0..depth {
                builder.push_record([
                    attributes.static_attributes.get(i).cloned().unwrap_or_default(),
                    attributes.varying.get(i).cloned().unwrap_or_default(),
                ]);
            }
            Ok(format!("{}\n{}", component.bold().blue(), builder.build()))
        }
        OutputFormat::Json => to_json(attributes),
        OutputFormat::Csv => {
            let mut records = vec![vec!["attribute".to_string(), "kind".to_string()]];
            records.extend(
                attributes
                    .static_attributes
                    .iter()
                    .map(|a| vec![a.clone(), "static".to_string()]),
            );
            records.extend(
                attributes
                    .varying
                    .iter()
                    .map(|a| vec![a.clone(), "varying".to_string()]),
            );
            to_csv(records)
        }
    }
}

/// Render the static table of a component type, one row per entity
pub fn render_static_table(table: &StaticTableView, format: &OutputFormat) -> Result<String, CoreError> {
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(table.headers().into_iter().map(str::to_string));
            for i in 0..table.row_count() {
                builder.push_record(table.row(i).into_iter().map(|cell| {
                    if cell.is_missing() {
                        MISSING.to_string()
                    } else {
                        cell.to_string()
                    }
                }));
            }
            Ok(builder.build().to_string())
        }
        OutputFormat::Json => to_json(table),
        OutputFormat::Csv => {
            let mut records = vec![table.headers().into_iter().map(str::to_string).collect()];
            for i in 0..table.row_count() {
                records.push(table.row(i).into_iter().map(|cell| cell.to_string()).collect());
            }
            to_csv(records)
        }
    }
}

/// Render a varying series with one row per snapshot
pub fn render_varying_series(series: &VaryingSeries, format: &OutputFormat) -> Result<String, CoreError> {
    let missing = match format {
        OutputFormat::Table => MISSING,
        OutputFormat::Csv => "",
        OutputFormat::Json => return to_json(series),
    };

    let mut records: Vec<Vec<String>> = Vec::with_capacity(series.len() + 1);
    let mut header = vec!["snapshot".to_string()];
    header.extend(series.entity_names().into_iter().map(str::to_string));
    records.push(header);

    for (i, snapshot) in series.snapshots.iter().enumerate() {
        let mut record = vec![snapshot.format(SNAPSHOT_FORMAT).to_string()];
        for (_, values) in &series.entities {
            record.push(
                values
                    .get(i)
                    .copied()
                    .flatten()
                    .map_or_else(|| missing.to_string(), |v| v.to_string()),
            );
        }
        records.push(record);
    }

    if *format == OutputFormat::Csv {
        return to_csv(records);
    }
    let mut builder = Builder::default();
    for record in records {
        builder.push_record(record);
    }
    Ok(builder.build().to_string())
}

fn is_active(name: &str, active: Option<&str>) -> bool {
    active.map_or(false, |a| a == name || name.strip_suffix(".json") == Some(a))
}

fn join_components(components: &[ComponentType]) -> String {
    if components.is_empty() {
        return MISSING.to_string();
    }
    components
        .iter()
        .map(ComponentType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn to_csv(records: Vec<Vec<String>>) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .write_record(&record)
            .map_err(|e| CoreError::Internal(format!("Failed to write CSV: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV output is not UTF-8: {}", e)))
}

#[derive(Tabled)]
struct NetworkTableRow {
    #[tabled(rename = "Network")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
}

#[derive(Tabled)]
struct ComponentTableRow {
    #[tabled(rename = "Component")]
    component: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series() -> VaryingSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        VaryingSeries {
            snapshots: (0..3).map(|h| start + chrono::Duration::hours(h)).collect(),
            entities: vec![
                ("Gen1".to_string(), vec![Some(0.5), Some(0.8), None]),
                ("Gen2".to_string(), vec![Some(1.0), Some(1.0), Some(0.9)]),
            ],
        }
    }

    #[test]
    fn test_varying_csv_leaves_missing_empty() {
        let csv = render_varying_series(&series(), &OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "snapshot,Gen1,Gen2");
        assert_eq!(lines[1], "2024-01-01 00:00:00,0.5,1");
        assert_eq!(lines[3], "2024-01-01 02:00:00,,0.9");
    }

    #[test]
    fn test_varying_table_marks_missing() {
        let table = render_varying_series(&series(), &OutputFormat::Table).unwrap();
        assert!(table.contains("Gen1"));
        assert!(table.contains("2024-01-01 02:00:00"));
        assert!(table.contains(" - "));
    }

    #[test]
    fn test_varying_json_starts_with_snapshots() {
        let json = render_varying_series(&series(), &OutputFormat::Json).unwrap();
        let snapshots = json.find("\"snapshots\"").unwrap();
        let gen1 = json.find("\"Gen1\"").unwrap();
        assert!(snapshots < gen1);
        assert!(json.contains("null"));
    }

    #[test]
    fn test_static_table_csv() {
        let table = StaticTableView {
            columns: vec![
                (
                    "name".to_string(),
                    vec![CellValue::from("Gen1"), CellValue::from("Gen2")],
                ),
                (
                    "p_nom".to_string(),
                    vec![CellValue::Number(30.0), CellValue::Missing],
                ),
            ],
        };
        let csv = render_static_table(&table, &OutputFormat::Csv).unwrap();
        assert_eq!(csv, "name,p_nom\nGen1,30\nGen2,\n");

        let rendered = render_static_table(&table, &OutputFormat::Table).unwrap();
        assert!(rendered.contains("p_nom"));
        assert!(rendered.contains(" - "));
    }

    #[test]
    fn test_networks_marks_active() {
        let networks = NetworksResponse {
            networks: vec!["a.json".to_string(), "b.json".to_string()],
            active: Some("b".to_string()),
        };
        let csv = render_networks(&networks, &OutputFormat::Csv).unwrap();
        assert_eq!(csv, "name,active\na.json,false\nb.json,true\n");

        let empty = NetworksResponse {
            networks: vec![],
            active: None,
        };
        assert_eq!(
            render_networks(&empty, &OutputFormat::Table).unwrap(),
            "No saved networks found"
        );
    }

    #[test]
    fn test_json_failure_is_serialization_error() {
        let mut keyed = std::collections::HashMap::new();
        keyed.insert((1, 2), "not a string key");
        assert!(matches!(to_json(&keyed), Err(CoreError::Serialization(_))));
    }

    #[test]
    fn test_attributes_csv() {
        let attributes = ComponentAttributes {
            static_attributes: vec!["name".to_string(), "p_nom".to_string()],
            varying: vec!["p_max_pu".to_string()],
        };
        let csv = render_attributes("Generator", &attributes, &OutputFormat::Csv).unwrap();
        assert_eq!(csv, "attribute,kind\nname,static\np_nom,static\np_max_pu,varying\n");
    }
}
