//! Resolution of one varying attribute out of either storage shape.
//!
//! [`SeriesSource`] is the only place that knows how a store is laid out.
//! Callers hand it the model's time index and get back per-entity slices
//! that are guaranteed to line up with that index, or a typed error.

use crate::errors::StoreError;
use crate::model::{ColumnarStore, KeyedStore, VaryingStore};
use crate::types::Snapshot;
use thiserror::Error;

/// Per-entity values of one attribute, aligned with the model snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries<'a> {
    pub entities: Vec<(&'a str, &'a [f64])>,
}

/// Failure to resolve an attribute from a store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("attribute not present in store")]
    NotFound,

    #[error("attribute holds no rows or no entity columns")]
    Empty,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Capability shared by every varying-data layout
pub trait SeriesSource {
    /// Attribute names present in the store, in store order
    fn attributes(&self) -> Vec<&str>;

    /// Extract `attribute` aligned with `snapshots`
    fn resolve<'a>(
        &'a self,
        attribute: &str,
        snapshots: &[Snapshot],
    ) -> Result<AlignedSeries<'a>, SeriesError>;
}

impl SeriesSource for ColumnarStore {
    fn attributes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for column in &self.columns {
            if !names.contains(&column.attribute.as_str()) {
                names.push(&column.attribute);
            }
        }
        names
    }

    fn resolve<'a>(
        &'a self,
        attribute: &str,
        snapshots: &[Snapshot],
    ) -> Result<AlignedSeries<'a>, SeriesError> {
        let mut entities = Vec::new();
        for column in self.columns.iter().filter(|c| c.attribute == attribute) {
            // time is implicit here, so length is the only thing to check
            if column.values.len() != snapshots.len() {
                return Err(StoreError::Misaligned {
                    context: format!("{}.{}", attribute, column.entity),
                    expected: snapshots.len(),
                    found: column.values.len(),
                }
                .into());
            }
            entities.push((column.entity.as_str(), column.values.as_slice()));
        }

        if entities.is_empty() {
            return Err(SeriesError::NotFound);
        }
        Ok(AlignedSeries { entities })
    }
}

impl SeriesSource for KeyedStore {
    fn attributes(&self) -> Vec<&str> {
        self.frames.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn resolve<'a>(
        &'a self,
        attribute: &str,
        snapshots: &[Snapshot],
    ) -> Result<AlignedSeries<'a>, SeriesError> {
        let frame = self.frame(attribute).ok_or(SeriesError::NotFound)?;
        if frame.is_empty() || frame.columns.is_empty() {
            return Err(SeriesError::Empty);
        }

        if frame.index.len() != snapshots.len() {
            return Err(StoreError::Misaligned {
                context: attribute.to_string(),
                expected: snapshots.len(),
                found: frame.index.len(),
            }
            .into());
        }
        if let Some(position) = frame
            .index
            .iter()
            .zip(snapshots)
            .position(|(row, snapshot)| row != snapshot)
        {
            return Err(StoreError::IndexMismatch {
                context: attribute.to_string(),
                position,
            }
            .into());
        }

        let mut entities = Vec::with_capacity(frame.columns.len());
        for column in &frame.columns {
            if column.values.len() != frame.index.len() {
                return Err(StoreError::RaggedColumn {
                    column: format!("{}.{}", attribute, column.entity),
                    expected: frame.index.len(),
                    found: column.values.len(),
                }
                .into());
            }
            entities.push((column.entity.as_str(), column.values.as_slice()));
        }
        Ok(AlignedSeries { entities })
    }
}

impl SeriesSource for VaryingStore {
    fn attributes(&self) -> Vec<&str> {
        match self {
            VaryingStore::Columnar(store) => store.attributes(),
            VaryingStore::Keyed(store) => store.attributes(),
        }
    }

    fn resolve<'a>(
        &'a self,
        attribute: &str,
        snapshots: &[Snapshot],
    ) -> Result<AlignedSeries<'a>, SeriesError> {
        match self {
            VaryingStore::Columnar(store) => store.resolve(attribute, snapshots),
            VaryingStore::Keyed(store) => store.resolve(attribute, snapshots),
        }
    }
}
