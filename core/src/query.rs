//! Read-only queries over a loaded network model.
//!
//! Each function takes the model snapshot it should answer from, so a
//! caller that obtained the model from the session once gets a consistent
//! answer even if the session is replaced concurrently. Results are
//! sanitized: every non-finite number comes out as a missing value.

use crate::errors::{QueryError, QueryResult, StoreError};
use crate::model::NetworkModel;
use crate::series::{SeriesError, SeriesSource};
use crate::types::{sanitize_all, CellValue, ComponentType, Snapshot};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::{debug, warn};

/// Key under which the time index is emitted in a [`VaryingSeries`]
pub const SNAPSHOTS_KEY: &str = "snapshots";

/// Name of the leading column of a [`StaticTableView`]
pub const NAME_COLUMN: &str = "name";

/// Attribute names of one component type, split by time dependence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAttributes {
    #[serde(rename = "static")]
    pub static_attributes: Vec<String>,
    pub varying: Vec<String>,
}

/// Column-oriented static table, ready for serialization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticTableView {
    pub columns: Vec<(String, Vec<CellValue>)>,
}

impl StaticTableView {
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |(_, values)| values.len())
    }

    /// Values of row `index` across all columns
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns
            .iter()
            .filter_map(|(_, values)| values.get(index))
            .collect()
    }
}

impl Serialize for StaticTableView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in &self.columns {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StaticTableView {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = StaticTableView;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column name to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut columns = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, values)) = access.next_entry::<String, Vec<CellValue>>()? {
                    columns.push((name, values));
                }
                Ok(StaticTableView { columns })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// One varying attribute across all entities, aligned with the time index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VaryingSeries {
    pub snapshots: Vec<Snapshot>,
    pub entities: Vec<(String, Vec<Option<f64>>)>,
}

impl VaryingSeries {
    pub fn entity(&self, name: &str) -> Option<&[Option<f64>]> {
        self.entities
            .iter()
            .find(|(entity, _)| entity == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl Serialize for VaryingSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entities.len() + 1))?;
        map.serialize_entry(SNAPSHOTS_KEY, &self.snapshots)?;
        for (name, values) in &self.entities {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for VaryingSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SeriesVisitor;

        impl<'de> Visitor<'de> for SeriesVisitor {
            type Value = VaryingSeries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with a snapshots key and one key per entity")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut snapshots = None;
                let mut entities = Vec::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == SNAPSHOTS_KEY {
                        if snapshots.is_some() {
                            return Err(de::Error::duplicate_field(SNAPSHOTS_KEY));
                        }
                        snapshots = Some(access.next_value::<Vec<Snapshot>>()?);
                    } else {
                        entities.push((key, access.next_value::<Vec<Option<f64>>>()?));
                    }
                }
                let snapshots = snapshots.ok_or_else(|| de::Error::missing_field(SNAPSHOTS_KEY))?;
                Ok(VaryingSeries { snapshots, entities })
            }
        }

        deserializer.deserialize_map(SeriesVisitor)
    }
}

/// Component types whose static table holds at least one entity, in
/// schema declaration order
pub fn list_present_component_types(model: &NetworkModel) -> Vec<ComponentType> {
    model
        .schema()
        .components()
        .iter()
        .filter(|c| model.static_table(c.name.as_str()).is_some_and(|t| !t.is_empty()))
        .map(|c| c.name.clone())
        .collect()
}

/// Partition the declared attributes of `component` into static and varying
pub fn classify_attributes(model: &NetworkModel, component: &str) -> QueryResult<ComponentAttributes> {
    let schema = model
        .schema()
        .component(component)
        .ok_or_else(|| QueryError::UnknownComponentType(component.to_string()))?;

    Ok(ComponentAttributes {
        static_attributes: schema.static_attributes().map(|a| a.name.clone()).collect(),
        varying: schema.varying_attributes().map(|a| a.name.clone()).collect(),
    })
}

/// Sanitized static table of `component`, entity names first
pub fn static_table(model: &NetworkModel, component: &str) -> QueryResult<StaticTableView> {
    if !model.schema().contains(component) {
        return Err(QueryError::UnknownComponentType(component.to_string()));
    }
    let table = model
        .static_table(component)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| QueryError::NoStaticData(component.to_string()))?;

    let mut columns = Vec::with_capacity(table.columns().len() + 1);
    columns.push((
        NAME_COLUMN.to_string(),
        table.entities().iter().map(|e| CellValue::from(e.as_str())).collect(),
    ));

    for column in table.columns().iter().filter(|c| c.name != NAME_COLUMN) {
        if column.values.len() != table.len() {
            let err = StoreError::RaggedColumn {
                column: format!("{}.{}", component, column.name),
                expected: table.len(),
                found: column.values.len(),
            };
            warn!(component, error = %err, "Static table is inconsistent");
            return Err(err.into());
        }
        columns.push((
            column.name.clone(),
            column.values.iter().map(CellValue::sanitized).collect(),
        ));
    }

    debug!(component, rows = table.len(), columns = columns.len(), "Static table served");
    Ok(StaticTableView { columns })
}

/// One varying attribute of `component`, aligned with the model snapshots
pub fn varying_series(
    model: &NetworkModel,
    component: &str,
    attribute: &str,
) -> QueryResult<VaryingSeries> {
    if !model.schema().contains(component) {
        return Err(QueryError::UnknownComponentType(component.to_string()));
    }
    let store = model
        .varying_store(component)
        .ok_or_else(|| QueryError::NoVaryingData(component.to_string()))?;

    let series = store
        .resolve(attribute, model.snapshots())
        .map_err(|err| match err {
            SeriesError::NotFound => {
                debug!(component, attribute, available = ?store.attributes(), "Attribute has no varying data");
                QueryError::AttributeNotFound {
                    component: component.to_string(),
                    attribute: attribute.to_string(),
                }
            }
            SeriesError::Empty => QueryError::AttributeHasNoData {
                component: component.to_string(),
                attribute: attribute.to_string(),
            },
            SeriesError::Store(err) => {
                warn!(component, attribute, error = %err, "Varying data does not align with snapshots");
                err.into()
            }
        })?;

    if series.entities.iter().any(|(entity, _)| *entity == SNAPSHOTS_KEY) {
        return Err(QueryError::QueryFailed(format!(
            "entity name '{}' of {} collides with the time index key",
            SNAPSHOTS_KEY, component
        )));
    }

    debug!(component, attribute, entities = series.entities.len(), "Varying series served");
    Ok(VaryingSeries {
        snapshots: model.snapshots().to_vec(),
        entities: series
            .entities
            .into_iter()
            .map(|(entity, values)| (entity.to_string(), sanitize_all(values)))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColumnarStore, KeyedStore, SeriesFrame, StaticTable};
    use crate::schema::AttributeSchema;
    use chrono::NaiveDate;

    fn hours(n: u32) -> Vec<Snapshot> {
        (0..n)
            .map(|h| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(h, 0, 0).unwrap())
            .collect()
    }

    fn network() -> NetworkModel {
        NetworkModel::new("simple", AttributeSchema::standard())
            .with_snapshots(hours(3))
            .with_static("Carrier", StaticTable::new(["AC"]).with_column("co2_emissions", [0.0]))
            .with_static(
                "Bus",
                StaticTable::new(["Bus1", "Bus2", "Bus3"]).with_column("v_nom", [1.0, 1.0, f64::INFINITY]),
            )
            .with_static(
                "Generator",
                StaticTable::new(["Gen1", "Gen2"])
                    .with_column("bus", ["Bus1", "Bus2"])
                    .with_column("p_nom", [30.0, 40.0])
                    .with_column("marginal_cost", [50.0, f64::NAN]),
            )
            .with_static(
                "Link",
                StaticTable::new(["Link1", "Link2"]).with_column("p_nom", [100.0, 100.0]),
            )
            .with_static("Load", StaticTable::default())
            .with_varying(
                "Generator",
                ColumnarStore::new().with_column("p_max_pu", "Gen1", vec![0.5, 0.8, f64::NAN]),
            )
            .with_varying("Link", KeyedStore::new())
            .with_varying(
                "Load",
                KeyedStore::new()
                    .with_frame("p_set", SeriesFrame::new(hours(3)).with_column("Load1", vec![10.0, 15.0, 20.0]))
                    .with_frame("q_set", SeriesFrame::new(Vec::new())),
            )
    }

    #[test]
    fn test_catalog_skips_empty_and_absent_types() {
        let present = list_present_component_types(&network());
        let names: Vec<&str> = present.iter().map(ComponentType::as_str).collect();
        assert_eq!(names, vec!["Bus", "Carrier", "Link", "Generator"]);
    }

    #[test]
    fn test_every_listed_type_has_static_rows() {
        let model = network();
        for component in list_present_component_types(&model) {
            let table = static_table(&model, component.as_str()).unwrap();
            assert!(table.row_count() > 0, "{} listed without rows", component);
        }
    }

    #[test]
    fn test_classifier_is_disjoint_and_exhaustive() {
        let model = network();
        for component in model.schema().components() {
            let attrs = classify_attributes(&model, component.name.as_str()).unwrap();
            assert!(attrs.static_attributes.iter().all(|a| !attrs.varying.contains(a)));
            assert_eq!(
                attrs.static_attributes.len() + attrs.varying.len(),
                component.attributes.len()
            );
        }

        let generator = classify_attributes(&model, "Generator").unwrap();
        assert_eq!(generator.static_attributes[0], "name");
        assert!(generator.varying.contains(&"p_max_pu".to_string()));
    }

    #[test]
    fn test_classifier_unknown_type() {
        let err = classify_attributes(&network(), "Gizmo").unwrap_err();
        assert_eq!(err, QueryError::UnknownComponentType("Gizmo".into()));
    }

    #[test]
    fn test_component_attributes_json_uses_static_key() {
        let attrs = ComponentAttributes {
            static_attributes: vec!["name".into()],
            varying: vec!["p".into()],
        };
        assert_eq!(serde_json::to_string(&attrs).unwrap(), r#"{"static":["name"],"varying":["p"]}"#);
    }

    #[test]
    fn test_static_table_sanitizes_and_leads_with_names() {
        let view = static_table(&network(), "Generator").unwrap();
        assert_eq!(view.headers(), vec!["name", "bus", "p_nom", "marginal_cost"]);
        assert_eq!(view.row_count(), 2);
        assert_eq!(
            view.column("marginal_cost").unwrap(),
            &[CellValue::Number(50.0), CellValue::Missing][..]
        );

        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(
            json,
            r#"{"name":["Gen1","Gen2"],"bus":["Bus1","Bus2"],"p_nom":[30.0,40.0],"marginal_cost":[50.0,null]}"#
        );
    }

    #[test]
    fn test_static_table_without_entities() {
        let model = network();
        assert_eq!(static_table(&model, "Load").unwrap_err(), QueryError::NoStaticData("Load".into()));
        assert_eq!(static_table(&model, "Store").unwrap_err(), QueryError::NoStaticData("Store".into()));
        assert!(matches!(
            static_table(&model, "Gizmo").unwrap_err(),
            QueryError::UnknownComponentType(_)
        ));
    }

    #[test]
    fn test_static_table_ragged_column_fails() {
        let model = NetworkModel::new("bad", AttributeSchema::standard())
            .with_static("Bus", StaticTable::new(["Bus1", "Bus2"]).with_column("v_nom", [1.0]));
        let err = static_table(&model, "Bus").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::QueryFailed);
    }

    #[test]
    fn test_varying_series_columnar_with_nan() {
        let series = varying_series(&network(), "Generator", "p_max_pu").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.entity("Gen1").unwrap(), &[Some(0.5), Some(0.8), None][..]);

        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(
            json,
            r#"{"snapshots":["2024-01-01T00:00:00","2024-01-01T01:00:00","2024-01-01T02:00:00"],"Gen1":[0.5,0.8,null]}"#
        );
    }

    #[test]
    fn test_varying_series_keyed() {
        let series = varying_series(&network(), "Load", "p_set").unwrap();
        assert_eq!(series.entity_names(), vec!["Load1"]);
        for (_, values) in &series.entities {
            assert_eq!(values.len(), series.snapshots.len());
        }
    }

    #[test]
    fn test_varying_series_errors() {
        let model = network();
        assert_eq!(
            varying_series(&model, "Link", "efficiency2").unwrap_err(),
            QueryError::AttributeNotFound {
                component: "Link".into(),
                attribute: "efficiency2".into()
            }
        );
        assert_eq!(
            varying_series(&model, "Load", "q_set").unwrap_err(),
            QueryError::AttributeHasNoData {
                component: "Load".into(),
                attribute: "q_set".into()
            }
        );
        assert_eq!(
            varying_series(&model, "Bus", "p").unwrap_err(),
            QueryError::NoVaryingData("Bus".into())
        );
        assert_eq!(
            varying_series(&model, "Gizmo", "p").unwrap_err(),
            QueryError::UnknownComponentType("Gizmo".into())
        );
    }

    #[test]
    fn test_misaligned_store_degrades_to_query_failed() {
        let model = NetworkModel::new("bad", AttributeSchema::standard())
            .with_snapshots(hours(3))
            .with_varying("Load", KeyedStore::new().with_frame(
                "p_set",
                SeriesFrame::new(hours(2)).with_column("Load1", vec![1.0, 2.0]),
            ));
        let err = varying_series(&model, "Load", "p_set").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::QueryFailed);
    }

    #[test]
    fn test_entity_named_snapshots_is_rejected() {
        let model = NetworkModel::new("odd", AttributeSchema::standard())
            .with_snapshots(hours(1))
            .with_varying("Generator", ColumnarStore::new().with_column("p", "snapshots", vec![1.0]));
        assert!(matches!(
            varying_series(&model, "Generator", "p").unwrap_err(),
            QueryError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_results_deserialize_in_order() {
        let series: VaryingSeries = serde_json::from_str(
            r#"{"Gen2":[1.0],"snapshots":["2024-01-01T00:00:00"],"Gen1":[null]}"#,
        )
        .unwrap();
        assert_eq!(series.entity_names(), vec!["Gen2", "Gen1"]);
        assert_eq!(series.entity("Gen1").unwrap(), &[None][..]);

        let missing: Result<VaryingSeries, _> = serde_json::from_str(r#"{"Gen1":[1.0]}"#);
        assert!(missing.is_err());

        let table: StaticTableView =
            serde_json::from_str(r#"{"name":["Bus1"],"v_nom":[1.0],"carrier":["AC"]}"#).unwrap();
        assert_eq!(table.headers(), vec!["name", "v_nom", "carrier"]);
        assert_eq!(table.row(0), vec![&CellValue::from("Bus1"), &CellValue::Number(1.0), &CellValue::from("AC")]);
    }
}
