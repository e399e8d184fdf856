//! # NetLens Core
//!
//! Core types, traits, and the query layer for inspecting energy network
//! models. A [`NetworkSession`] holds the active network; the functions in
//! [`query`] answer component, attribute, static-table and time-series
//! questions about it. Stores and presentation adapters plug in through the
//! traits in [`traits`].

pub mod errors;
pub mod model;
pub mod query;
pub mod schema;
pub mod series;
pub mod service;
pub mod session;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use errors::{CoreError, ErrorKind, LoadError, QueryError};
pub use model::NetworkModel;
pub use schema::AttributeSchema;
pub use service::NetworkInspector;
pub use session::NetworkSession;
pub use traits::{NetworkService, NetworkStore, PresentationAdapter};
pub use types::{CellValue, ComponentType, Snapshot};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::model::*;
    pub use crate::query::{ComponentAttributes, StaticTableView, VaryingSeries};
    pub use crate::schema::*;
    pub use crate::traits::*;
    pub use crate::types::*;
    pub use async_trait::async_trait;
    pub use chrono::NaiveDateTime;
}
