//! Conversion of a parsed document into a [`NetworkModel`]

use crate::document::{
    parse_non_finite, to_f64s, ComponentDocument, NetworkDocument, OrderedMap, VaryingDocument,
};
use chrono::{NaiveDate, NaiveDateTime};
use netlens_core::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse one snapshot label; a bare date means midnight
pub fn parse_snapshot(text: &str) -> Option<Snapshot> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_index(network: &str, context: &str, labels: &[String]) -> LoadResult<Vec<Snapshot>> {
    labels
        .iter()
        .map(|label| {
            parse_snapshot(label).ok_or_else(|| {
                LoadError::invalid(network, format!("{}: unparseable snapshot '{}'", context, label))
            })
        })
        .collect()
}

/// Build the model described by `doc`
pub fn build_model(network: &str, doc: NetworkDocument) -> LoadResult<NetworkModel> {
    let mut schema = AttributeSchema::standard();
    schema.extend(doc.schema);

    let snapshots = parse_index(network, "snapshots", &doc.snapshots)?;
    let mut seen = HashSet::with_capacity(snapshots.len());
    if let Some(dup) = snapshots.iter().find(|s| !seen.insert(**s)) {
        return Err(LoadError::invalid(network, format!("duplicate snapshot {}", dup)));
    }

    let name = doc.name.unwrap_or_else(|| network.to_string());
    let mut model = NetworkModel::new(name, schema.clone()).with_snapshots(snapshots.clone());
    let mut resolved = HashSet::new();

    for (type_name, component) in doc.components.0 {
        let component_schema = schema
            .component(&type_name)
            .or_else(|| schema.by_list_name(&type_name))
            .ok_or_else(|| {
                LoadError::invalid(network, format!("unknown component type '{}'", type_name))
            })?;
        // a type may be keyed by its name or its list name, but only once
        if !resolved.insert(component_schema.name.clone()) {
            return Err(LoadError::invalid(
                network,
                format!("component type '{}' given twice", component_schema.name),
            ));
        }

        let ComponentDocument { entities, varying } = component;
        let table = build_static_table(network, component_schema, &entities)?;
        debug!(
            network,
            component = %component_schema.name,
            entities = table.len(),
            "Static table built"
        );

        if let Some(varying) = varying {
            let store = build_varying_store(network, component_schema, table.entities(), &snapshots, varying)?;
            model = model.with_varying(component_schema.name.clone(), store);
        }
        model = model.with_static(component_schema.name.clone(), table);
    }

    Ok(model)
}

fn build_static_table(
    network: &str,
    schema: &ComponentSchema,
    rows: &[OrderedMap<CellValue>],
) -> LoadResult<StaticTable> {
    let mut names = Vec::with_capacity(rows.len());
    for row in rows {
        let name = match row.get("name") {
            Some(CellValue::Text(name)) if !name.is_empty() => name.clone(),
            _ => {
                return Err(LoadError::invalid(
                    network,
                    format!("{} entity without a name", schema.name),
                ))
            }
        };
        if names.contains(&name) {
            return Err(LoadError::invalid(
                network,
                format!("duplicate {} entity '{}'", schema.name, name),
            ));
        }
        names.push(name);
    }

    for row in rows {
        for key in row.keys().filter(|k| schema.attribute(k).is_none()) {
            warn!(network, component = %schema.name, attribute = key, "Dropping undeclared attribute");
        }
    }

    // declared static attributes always get a column; varying ones only
    // when some row carries a static value for them
    let columns = schema.attributes.iter().filter(|a| {
        a.name != "name" && (!a.varying || rows.iter().any(|row| row.get(&a.name).is_some()))
    });

    let mut table = StaticTable::new(names);
    for attribute in columns {
        let fallback = attribute.default.clone().unwrap_or(CellValue::Missing);
        let values = rows
            .iter()
            .map(|row| {
                row.get(&attribute.name)
                    .map(|value| coerce(value, attribute.dtype))
                    .unwrap_or_else(|| fallback.clone())
            })
            .collect();
        table.insert_column(attribute.name.clone(), values);
    }
    Ok(table)
}

/// Bring a raw cell in line with the declared type
fn coerce(value: &CellValue, dtype: AttributeType) -> CellValue {
    match (dtype, value) {
        (AttributeType::Float | AttributeType::Int, CellValue::Text(text)) => parse_non_finite(text)
            .or_else(|| text.trim().parse::<f64>().ok())
            .map_or_else(|| value.clone(), CellValue::Number),
        (AttributeType::Bool, CellValue::Number(n)) => CellValue::Bool(*n != 0.0),
        (AttributeType::String, CellValue::Number(n)) => CellValue::Text(n.to_string()),
        _ => value.clone(),
    }
}

fn build_varying_store(
    network: &str,
    schema: &ComponentSchema,
    entities: &[String],
    snapshots: &[Snapshot],
    doc: VaryingDocument,
) -> LoadResult<VaryingStore> {
    let check_entity = |attribute: &str, entity: &str| -> LoadResult<()> {
        if entities.iter().any(|e| e == entity) {
            Ok(())
        } else {
            Err(LoadError::invalid(
                network,
                format!("{}.{} refers to unknown entity '{}'", schema.name, attribute, entity),
            ))
        }
    };
    let declared = |attribute: &str| {
        let known = schema.attribute(attribute).is_some();
        if !known {
            warn!(network, component = %schema.name, attribute, "Dropping undeclared varying attribute");
        }
        known
    };

    let store = match doc {
        VaryingDocument::Columnar { attributes } => {
            let mut store = ColumnarStore::new();
            for (attribute, series) in attributes.0 {
                if !declared(&attribute) {
                    continue;
                }
                for (entity, values) in series.0 {
                    check_entity(&attribute, &entity)?;
                    store = store.with_column(attribute.clone(), entity, to_f64s(&values));
                }
            }
            VaryingStore::from(store)
        }
        VaryingDocument::Keyed { attributes } => {
            let mut store = KeyedStore::new();
            for (attribute, frame) in attributes.0 {
                if !declared(&attribute) {
                    continue;
                }
                let index = match &frame.index {
                    Some(labels) => parse_index(network, &attribute, labels)?,
                    None if frame.values.0.is_empty() => Vec::new(),
                    None => snapshots.to_vec(),
                };
                let mut series = SeriesFrame::new(index);
                for (entity, values) in frame.values.0 {
                    check_entity(&attribute, &entity)?;
                    series = series.with_column(entity, to_f64s(&values));
                }
                store.insert(attribute, series);
            }
            VaryingStore::from(store)
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LoadResult<NetworkModel> {
        let doc: NetworkDocument = serde_json::from_str(json).unwrap();
        build_model("test.json", doc)
    }

    #[test]
    fn test_parse_snapshot_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(1, 0, 0).unwrap();
        assert_eq!(parse_snapshot("2024-01-01T01:00:00"), Some(expected));
        assert_eq!(parse_snapshot("2024-01-01 01:00:00"), Some(expected));
        assert_eq!(parse_snapshot("2024-01-01T01:00"), Some(expected));
        assert_eq!(parse_snapshot("2024-01-01").unwrap().to_string(), "2024-01-01 00:00:00");
        assert!(parse_snapshot("yesterday").is_none());
    }

    #[test]
    fn test_static_defaults_and_undeclared_attributes() {
        let model = parse(
            r#"{
                "components": {
                    "generators": {
                        "entities": [
                            {"name": "Gen1", "bus": "Bus1", "p_nom": "30", "colour": "red"},
                            {"name": "Gen2", "bus": "Bus2", "p_nom": "inf"}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(model.name(), "test.json");
        let table = model.static_table("Generator").unwrap();
        assert_eq!(table.entities(), ["Gen1".to_string(), "Gen2".to_string()]);
        assert!(table.column("colour").is_none());
        assert_eq!(table.column("p_nom").unwrap().values[0], CellValue::Number(30.0));
        assert_eq!(table.column("p_nom").unwrap().values[1], CellValue::Number(f64::INFINITY));
        assert_eq!(table.column("control").unwrap().values[0], CellValue::from("PQ"));
        assert!(table.column("p_max_pu").is_none());
    }

    #[test]
    fn test_structural_errors() {
        let unknown = parse(r#"{"components": {"Gizmo": {"entities": [{"name": "g"}]}}}"#);
        assert!(matches!(unknown, Err(LoadError::Invalid { .. })));

        let duplicate = parse(
            r#"{"components": {"Bus": {"entities": [{"name": "Bus1"}, {"name": "Bus1"}]}}}"#,
        );
        assert!(matches!(duplicate, Err(LoadError::Invalid { .. })));

        let snapshots = parse(r#"{"snapshots": ["2024-01-01", "2024-01-01T00:00:00"]}"#);
        assert!(matches!(snapshots, Err(LoadError::Invalid { .. })));

        let orphan = parse(
            r#"{"components": {"Load": {
                "entities": [{"name": "Load1"}],
                "varying": {"layout": "keyed", "attributes": {"p_set": {"values": {"Load9": [1]}}}}
            }}}"#,
        );
        assert!(matches!(orphan, Err(LoadError::Invalid { .. })));

        let aliased = parse(
            r#"{"components": {
                "Bus": {"entities": [{"name": "B1"}, {"name": "B2"}]},
                "buses": {"entities": [{"name": "B3"}]}
            }}"#,
        );
        match aliased {
            Err(LoadError::Invalid { message, .. }) => assert!(message.contains("given twice")),
            other => panic!("expected invalid network, got {:?}", other.map(|m| m.entity_count())),
        }
    }

    #[test]
    fn test_varying_layouts() {
        let model = parse(
            r#"{
                "snapshots": ["2024-01-01T00:00:00", "2024-01-01T01:00:00"],
                "components": {
                    "Generator": {
                        "entities": [{"name": "Gen1"}],
                        "varying": {"layout": "columnar", "attributes": {
                            "p_max_pu": {"Gen1": [0.5, "nan"]},
                            "made_up": {"Gen1": [1, 2]}
                        }}
                    },
                    "Load": {
                        "entities": [{"name": "Load1"}],
                        "varying": {"layout": "keyed", "attributes": {
                            "p_set": {"values": {"Load1": [10, 15]}},
                            "q_set": {"index": [], "values": {}}
                        }}
                    }
                }
            }"#,
        )
        .unwrap();

        match model.varying_store("Generator").unwrap() {
            VaryingStore::Columnar(store) => {
                assert_eq!(store.columns.len(), 1);
                assert!(store.columns[0].values[1].is_nan());
            }
            other => panic!("unexpected store: {:?}", other),
        }
        match model.varying_store("Load").unwrap() {
            VaryingStore::Keyed(store) => {
                assert_eq!(store.frame("p_set").unwrap().index, model.snapshots());
                assert!(store.frame("q_set").unwrap().is_empty());
            }
            other => panic!("unexpected store: {:?}", other),
        }
    }

    #[test]
    fn test_schema_extension() {
        let model = parse(
            r#"{
                "schema": [{"name": "Link", "list_name": "links", "attributes": [
                    {"name": "bus2", "dtype": "string"},
                    {"name": "efficiency2", "varying": true}
                ]}],
                "components": {"Link": {"entities": [{"name": "Link1", "bus2": "Bus3"}]}}
            }"#,
        )
        .unwrap();
        let link = model.schema().component("Link").unwrap();
        assert!(link.attribute("efficiency2").unwrap().varying);
        let table = model.static_table("Link").unwrap();
        assert_eq!(table.column("bus2").unwrap().values[0], CellValue::from("Bus3"));
    }
}
