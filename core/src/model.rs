//! In-memory network model: static tables, varying stores and the shared
//! time index.
//!
//! A model is built once by a loader and then only read. Nothing here
//! checks that tables line up with the time index; the query layer does
//! that on every read.

use crate::schema::AttributeSchema;
use crate::types::{CellValue, ComponentType, Snapshot};
use std::collections::HashMap;

/// One named column of static values
#[derive(Debug, Clone, PartialEq)]
pub struct StaticColumn {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Static attributes of one component type, one row per entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticTable {
    entities: Vec<String>,
    columns: Vec<StaticColumn>,
}

impl StaticTable {
    /// Create a table for the given entities, in insertion order
    pub fn new<I, S>(entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entities: entities.into_iter().map(Into::into).collect(),
            columns: Vec::new(),
        }
    }

    /// Add (or replace) an attribute column
    pub fn with_column<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.insert_column(name, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn insert_column(&mut self, name: impl Into<String>, values: Vec<CellValue>) {
        let name = name.into();
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(StaticColumn { name, values }),
        }
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn columns(&self) -> &[StaticColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&StaticColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// A numeric time series for one entity
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesColumn {
    pub entity: String,
    pub values: Vec<f64>,
}

impl SeriesColumn {
    pub fn new(entity: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            entity: entity.into(),
            values,
        }
    }
}

/// A time-indexed frame: rows are snapshots, columns are entities
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesFrame {
    pub index: Vec<Snapshot>,
    pub columns: Vec<SeriesColumn>,
}

impl SeriesFrame {
    pub fn new(index: Vec<Snapshot>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, entity: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push(SeriesColumn::new(entity, values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// One column of a columnar store, keyed by (attribute, entity)
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarColumn {
    pub attribute: String,
    pub entity: String,
    pub values: Vec<f64>,
}

/// Varying data held as a single table.
///
/// Columns are keyed by attribute and entity; the time dimension is
/// implicit and shared with the model, so row `i` belongs to snapshot `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnarStore {
    pub columns: Vec<ColumnarColumn>,
}

impl ColumnarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(
        mut self,
        attribute: impl Into<String>,
        entity: impl Into<String>,
        values: Vec<f64>,
    ) -> Self {
        self.columns.push(ColumnarColumn {
            attribute: attribute.into(),
            entity: entity.into(),
            values,
        });
        self
    }
}

/// Varying data held as one frame per attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyedStore {
    pub frames: Vec<(String, SeriesFrame)>,
}

impl KeyedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the frame of an attribute
    pub fn with_frame(mut self, attribute: impl Into<String>, frame: SeriesFrame) -> Self {
        self.insert(attribute, frame);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, frame: SeriesFrame) {
        let attribute = attribute.into();
        match self.frames.iter_mut().find(|(name, _)| *name == attribute) {
            Some((_, existing)) => *existing = frame,
            None => self.frames.push((attribute, frame)),
        }
    }

    pub fn frame(&self, attribute: &str) -> Option<&SeriesFrame> {
        self.frames
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, frame)| frame)
    }
}

/// Time-varying data of one component type in either storage shape
#[derive(Debug, Clone, PartialEq)]
pub enum VaryingStore {
    Columnar(ColumnarStore),
    Keyed(KeyedStore),
}

impl From<ColumnarStore> for VaryingStore {
    fn from(store: ColumnarStore) -> Self {
        VaryingStore::Columnar(store)
    }
}

impl From<KeyedStore> for VaryingStore {
    fn from(store: KeyedStore) -> Self {
        VaryingStore::Keyed(store)
    }
}

/// A fully populated network
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkModel {
    name: String,
    schema: AttributeSchema,
    snapshots: Vec<Snapshot>,
    static_tables: HashMap<ComponentType, StaticTable>,
    varying: HashMap<ComponentType, VaryingStore>,
}

impl NetworkModel {
    /// Create an empty network using the given schema
    pub fn new(name: impl Into<String>, schema: AttributeSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            snapshots: Vec::new(),
            static_tables: HashMap::new(),
            varying: HashMap::new(),
        }
    }

    /// Set the time index
    pub fn with_snapshots(mut self, snapshots: Vec<Snapshot>) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Attach the static table of a component type
    pub fn with_static(mut self, component: impl Into<ComponentType>, table: StaticTable) -> Self {
        self.static_tables.insert(component.into(), table);
        self
    }

    /// Attach the varying store of a component type
    pub fn with_varying(
        mut self,
        component: impl Into<ComponentType>,
        store: impl Into<VaryingStore>,
    ) -> Self {
        self.varying.insert(component.into(), store.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn static_table(&self, component: &str) -> Option<&StaticTable> {
        self.static_tables.get(component)
    }

    pub fn varying_store(&self, component: &str) -> Option<&VaryingStore> {
        self.varying.get(component)
    }

    /// Total number of entities across all component types
    pub fn entity_count(&self) -> usize {
        self.static_tables.values().map(StaticTable::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_table_builder_replaces_columns() {
        let table = StaticTable::new(["Gen1", "Gen2"])
            .with_column("p_nom", [30.0, 40.0])
            .with_column("bus", ["Bus1", "Bus2"])
            .with_column("p_nom", [35.0, 45.0]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.columns()[0].name, "p_nom");
        assert_eq!(table.column("p_nom").unwrap().values[0], CellValue::Number(35.0));
    }

    #[test]
    fn test_keyed_store_keeps_insertion_order() {
        let store = KeyedStore::new()
            .with_frame("p_set", SeriesFrame::default())
            .with_frame("q_set", SeriesFrame::default())
            .with_frame("p_set", SeriesFrame::new(Vec::new()).with_column("Load1", vec![]));

        let names: Vec<&str> = store.frames.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["p_set", "q_set"]);
        assert_eq!(store.frame("p_set").unwrap().columns.len(), 1);
    }

    #[test]
    fn test_model_lookups() {
        let model = NetworkModel::new("test", AttributeSchema::standard())
            .with_static("Bus", StaticTable::new(["Bus1"]))
            .with_varying("Load", KeyedStore::new());

        assert_eq!(model.name(), "test");
        assert!(model.static_table("Bus").is_some());
        assert!(model.static_table("Load").is_none());
        assert!(matches!(model.varying_store("Load"), Some(VaryingStore::Keyed(_))));
        assert_eq!(model.entity_count(), 1);
    }
}
