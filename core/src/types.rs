//! Core data types for NetLens

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A point of the network's time index
pub type Snapshot = NaiveDateTime;

/// Identifier of one category of entity in a network (e.g. "Generator")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentType(pub String);

impl ComponentType {
    /// Create a new ComponentType
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::borrow::Borrow<str> for ComponentType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for ComponentType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A single static attribute value
///
/// `Missing` serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Replace non-finite numbers with [`CellValue::Missing`]
    pub fn sanitized(&self) -> CellValue {
        match self {
            CellValue::Number(v) => sanitize(*v).map_or(CellValue::Missing, CellValue::Number),
            other => other.clone(),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Missing => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Sanitize one numeric value: infinities and NaN become `None`
pub fn sanitize(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Sanitize a whole numeric column, keeping its length
pub fn sanitize_all(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(sanitize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_component_type_display() {
        let ct = ComponentType::new("Generator");
        assert_eq!(ct.to_string(), "Generator");
        assert_eq!(ct.as_str(), "Generator");
        assert_eq!(serde_json::to_string(&ct).unwrap(), "\"Generator\"");
    }

    #[test]
    fn test_non_finite_cells_become_missing() {
        assert_eq!(CellValue::Number(f64::NAN).sanitized(), CellValue::Missing);
        assert_eq!(CellValue::Number(f64::INFINITY).sanitized(), CellValue::Missing);
        assert_eq!(CellValue::Number(f64::NEG_INFINITY).sanitized(), CellValue::Missing);
        assert_eq!(CellValue::Number(30.0).sanitized(), CellValue::Number(30.0));
        assert_eq!(CellValue::from("AC").sanitized(), CellValue::from("AC"));
    }

    #[test]
    fn test_cell_value_json() {
        let cells = vec![
            CellValue::Missing,
            CellValue::Bool(true),
            CellValue::Number(1.5),
            CellValue::from("Bus1"),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[null,true,1.5,"Bus1"]"#);

        let back: Vec<CellValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cells);
    }

    #[test]
    fn test_sanitize_all_keeps_length() {
        let out = sanitize_all(&[0.5, 0.8, f64::NAN]);
        assert_eq!(out, vec![Some(0.5), Some(0.8), None]);
    }

    proptest! {
        #[test]
        fn sanitize_is_identity_on_finite(v in proptest::num::f64::NORMAL | proptest::num::f64::ZERO | proptest::num::f64::SUBNORMAL) {
            prop_assert_eq!(sanitize(v), Some(v));
        }

        #[test]
        fn sanitize_maps_non_finite_to_missing(v in proptest::num::f64::ANY) {
            let out = sanitize(v);
            if v.is_finite() {
                prop_assert_eq!(out, Some(v));
            } else {
                prop_assert_eq!(out, None);
            }
        }

        #[test]
        fn sanitize_all_is_identity_without_non_finite(values in proptest::collection::vec(-1.0e12f64..1.0e12, 0..64)) {
            let out = sanitize_all(&values);
            let expected: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
            prop_assert_eq!(out, expected);
        }
    }
}
