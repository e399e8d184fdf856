//! On-disk layout of a saved network.
//!
//! Maps are read through [`OrderedMap`] so entity, attribute and column
//! order survive parsing. Numbers in series may be written as `null`,
//! `"nan"`, `"inf"` or `"-inf"`.

use netlens_core::schema::ComponentSchema;
use netlens_core::types::CellValue;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;

/// A JSON object read as a list of entries in file order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if entries.iter().any(|(k, _)| *k == key) {
                        return Err(de::Error::custom(format_args!("duplicate key `{}`", key)));
                    }
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// A series value that tolerates missing and non-finite spellings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LenientF64(pub f64);

/// Parse the textual spellings of non-finite numbers
pub fn parse_non_finite(text: &str) -> Option<f64> {
    match text.trim().to_ascii_lowercase().as_str() {
        "nan" | "null" | "" => Some(f64::NAN),
        "inf" | "+inf" | "infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for LenientF64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LenientVisitor;

        impl<'de> Visitor<'de> for LenientVisitor {
            type Value = LenientF64;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, null, \"nan\", \"inf\" or \"-inf\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(LenientF64(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(LenientF64(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(LenientF64(v as f64))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(LenientF64(f64::NAN))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(LenientF64(f64::NAN))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                parse_non_finite(v)
                    .or_else(|| v.trim().parse::<f64>().ok())
                    .map(LenientF64)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(LenientVisitor)
    }
}

/// Unwrap a series of lenient values
pub fn to_f64s(values: &[LenientF64]) -> Vec<f64> {
    values.iter().map(|v| v.0).collect()
}

/// Top-level saved network
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub snapshots: Vec<String>,
    /// Extra component types and attributes merged into the standard schema
    #[serde(default)]
    pub schema: Vec<ComponentSchema>,
    #[serde(default)]
    pub components: OrderedMap<ComponentDocument>,
}

/// Data of one component type
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentDocument {
    #[serde(default)]
    pub entities: Vec<OrderedMap<CellValue>>,
    #[serde(default)]
    pub varying: Option<VaryingDocument>,
}

/// Varying data in one of the two storage layouts
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum VaryingDocument {
    /// attribute -> entity -> values, rows follow the network snapshots
    Columnar {
        attributes: OrderedMap<OrderedMap<Vec<LenientF64>>>,
    },
    /// attribute -> frame with its own index
    Keyed { attributes: OrderedMap<FrameDocument> },
}

/// A time-indexed frame; a missing index means the network snapshots
#[derive(Debug, Clone, Deserialize)]
pub struct FrameDocument {
    #[serde(default)]
    pub index: Option<Vec<String>>,
    #[serde(default)]
    pub values: OrderedMap<Vec<LenientF64>>,
}
