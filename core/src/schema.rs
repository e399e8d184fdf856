//! Attribute schema: which attributes each component type declares and
//! whether they are static or time-varying.
//!
//! The schema is plain data. Component types keep their declaration order,
//! and so do the attributes of each type; every listing produced by the
//! query layer follows that order.

use crate::types::{CellValue, ComponentType};
use serde::{Deserialize, Serialize};

/// Data type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    #[default]
    Float,
    Int,
    Bool,
    String,
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::Float => write!(f, "float"),
            AttributeType::Int => write!(f, "int"),
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::String => write!(f, "string"),
        }
    }
}

/// Metadata for one attribute of a component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub name: String,
    /// One value per entity per snapshot when true
    #[serde(default)]
    pub varying: bool,
    #[serde(default)]
    pub dtype: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>, dtype: AttributeType) -> Self {
        Self {
            name: name.into(),
            varying: false,
            dtype,
            unit: None,
            default: None,
            description: None,
        }
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Float)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Int)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::String)
    }

    /// Mark the attribute as time-varying
    pub fn varying(mut self) -> Self {
        self.varying = true;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<CellValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Declared attributes of one component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSchema {
    pub name: ComponentType,
    /// Plural table name, e.g. "generators"
    pub list_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

impl ComponentSchema {
    pub fn new(name: impl Into<String>, list_name: impl Into<String>) -> Self {
        Self {
            name: ComponentType::new(name),
            list_name: list_name.into(),
            description: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append an attribute declaration
    pub fn with(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn static_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|a| !a.varying)
    }

    pub fn varying_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|a| a.varying)
    }

    /// Add attributes not yet declared, keep existing declarations
    fn merge(&mut self, other: ComponentSchema) {
        for attribute in other.attributes {
            if self.attribute(&attribute.name).is_none() {
                self.attributes.push(attribute);
            }
        }
    }
}

/// Schema of every component type a network can hold
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttributeSchema {
    components: Vec<ComponentSchema>,
}

impl AttributeSchema {
    pub fn new(components: Vec<ComponentSchema>) -> Self {
        Self { components }
    }

    /// Component types in declaration order
    pub fn components(&self) -> &[ComponentSchema] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&ComponentSchema> {
        self.components.iter().find(|c| c.name.as_str() == name)
    }

    /// Look up a component type by its list name ("generators")
    pub fn by_list_name(&self, list_name: &str) -> Option<&ComponentSchema> {
        self.components.iter().find(|c| c.list_name == list_name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.component(name).is_some()
    }

    /// Merge extra declarations into this schema.
    ///
    /// Unknown component types are appended after the existing ones; known
    /// types gain the attributes they did not declare yet.
    pub fn extend(&mut self, extra: impl IntoIterator<Item = ComponentSchema>) {
        for component in extra {
            match self
                .components
                .iter_mut()
                .find(|c| c.name == component.name)
            {
                Some(existing) => existing.merge(component),
                None => self.components.push(component),
            }
        }
    }

    /// The built-in schema for power-system networks
    pub fn standard() -> Self {
        Self::new(vec![
            sub_network(),
            bus(),
            carrier(),
            global_constraint(),
            line(),
            transformer(),
            shunt_impedance(),
            link(),
            load(),
            generator(),
            storage_unit(),
            store(),
        ])
    }
}

fn name_attr() -> AttributeSpec {
    AttributeSpec::string("name").with_description("Unique name")
}

fn sub_network() -> ComponentSchema {
    ComponentSchema::new("SubNetwork", "sub_networks")
        .with_description("Connected subsets of the network")
        .with(name_attr())
        .with(AttributeSpec::string("carrier").with_default(""))
        .with(AttributeSpec::string("slack_bus").with_default(""))
}

fn bus() -> ComponentSchema {
    ComponentSchema::new("Bus", "buses")
        .with_description("Electrically fundamental node of the network")
        .with(name_attr())
        .with(AttributeSpec::float("v_nom").with_unit("kV").with_default(1.0))
        .with(AttributeSpec::string("type").with_default(""))
        .with(AttributeSpec::float("x").with_default(0.0))
        .with(AttributeSpec::float("y").with_default(0.0))
        .with(AttributeSpec::string("carrier").with_default("AC"))
        .with(AttributeSpec::string("unit").with_default("None"))
        .with(AttributeSpec::float("v_mag_pu_set").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("v_mag_pu_min").with_unit("per unit").with_default(0.0))
        .with(AttributeSpec::float("v_mag_pu_max").with_unit("per unit").with_default(f64::INFINITY))
        .with(AttributeSpec::float("p").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("q").with_unit("MVar").with_default(0.0).varying())
        .with(AttributeSpec::float("v_mag_pu").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("v_ang").with_unit("radians").with_default(0.0).varying())
        .with(AttributeSpec::float("marginal_price").with_unit("currency/MWh").with_default(0.0).varying())
}

fn carrier() -> ComponentSchema {
    ComponentSchema::new("Carrier", "carriers")
        .with_description("Energy carrier, such as AC, DC or water")
        .with(name_attr())
        .with(AttributeSpec::float("co2_emissions").with_unit("t/MWh").with_default(0.0))
        .with(AttributeSpec::string("color").with_default(""))
        .with(AttributeSpec::string("nice_name").with_default(""))
        .with(AttributeSpec::float("max_growth").with_unit("MW").with_default(f64::INFINITY))
}

fn global_constraint() -> ComponentSchema {
    ComponentSchema::new("GlobalConstraint", "global_constraints")
        .with_description("Constraints spanning several components")
        .with(name_attr())
        .with(AttributeSpec::string("type").with_default("primary_energy"))
        .with(AttributeSpec::string("carrier_attribute").with_default("co2_emissions"))
        .with(AttributeSpec::string("sense").with_default("<="))
        .with(AttributeSpec::float("constant").with_default(0.0))
        .with(AttributeSpec::float("mu").with_default(0.0))
}

fn line() -> ComponentSchema {
    ComponentSchema::new("Line", "lines")
        .with_description("Lines include distribution and transmission lines, overhead lines and cables")
        .with(name_attr())
        .with(AttributeSpec::string("bus0").with_default(""))
        .with(AttributeSpec::string("bus1").with_default(""))
        .with(AttributeSpec::string("type").with_default(""))
        .with(AttributeSpec::float("x").with_unit("Ohm").with_default(0.0))
        .with(AttributeSpec::float("r").with_unit("Ohm").with_default(0.0))
        .with(AttributeSpec::float("s_nom").with_unit("MVA").with_default(0.0))
        .with(AttributeSpec::boolean("s_nom_extendable").with_default(false))
        .with(AttributeSpec::float("s_max_pu").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("capital_cost").with_unit("currency/MVA").with_default(0.0))
        .with(AttributeSpec::float("length").with_unit("km").with_default(0.0))
        .with(AttributeSpec::float("p0").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("p1").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("q0").with_unit("MVar").with_default(0.0).varying())
        .with(AttributeSpec::float("q1").with_unit("MVar").with_default(0.0).varying())
}

fn transformer() -> ComponentSchema {
    ComponentSchema::new("Transformer", "transformers")
        .with_description("2-winding transformer")
        .with(name_attr())
        .with(AttributeSpec::string("bus0").with_default(""))
        .with(AttributeSpec::string("bus1").with_default(""))
        .with(AttributeSpec::string("type").with_default(""))
        .with(AttributeSpec::float("x").with_unit("per unit").with_default(0.0))
        .with(AttributeSpec::float("r").with_unit("per unit").with_default(0.0))
        .with(AttributeSpec::float("s_nom").with_unit("MVA").with_default(0.0))
        .with(AttributeSpec::float("tap_ratio").with_unit("per unit").with_default(1.0))
        .with(AttributeSpec::float("s_max_pu").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("p0").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("p1").with_unit("MW").with_default(0.0).varying())
}

fn shunt_impedance() -> ComponentSchema {
    ComponentSchema::new("ShuntImpedance", "shunt_impedances")
        .with_description("Shunt impedance connected to a bus")
        .with(name_attr())
        .with(AttributeSpec::string("bus").with_default(""))
        .with(AttributeSpec::float("g").with_unit("Siemens").with_default(0.0))
        .with(AttributeSpec::float("b").with_unit("Siemens").with_default(0.0))
        .with(AttributeSpec::float("p").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("q").with_unit("MVar").with_default(0.0).varying())
}

fn link() -> ComponentSchema {
    ComponentSchema::new("Link", "links")
        .with_description("Controllable directed flow between two or more buses")
        .with(name_attr())
        .with(AttributeSpec::string("bus0").with_default(""))
        .with(AttributeSpec::string("bus1").with_default(""))
        .with(AttributeSpec::string("type").with_default(""))
        .with(AttributeSpec::string("carrier").with_default(""))
        .with(AttributeSpec::float("efficiency").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("p_nom").with_unit("MW").with_default(0.0))
        .with(AttributeSpec::boolean("p_nom_extendable").with_default(false))
        .with(AttributeSpec::float("p_set").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("p_min_pu").with_unit("per unit").with_default(0.0).varying())
        .with(AttributeSpec::float("p_max_pu").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("capital_cost").with_unit("currency/MW").with_default(0.0))
        .with(AttributeSpec::float("marginal_cost").with_unit("currency/MWh").with_default(0.0).varying())
        .with(AttributeSpec::boolean("committable").with_default(false))
        .with(AttributeSpec::int("min_up_time").with_unit("snapshots").with_default(0.0))
        .with(AttributeSpec::float("p0").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("p1").with_unit("MW").with_default(0.0).varying())
}

fn load() -> ComponentSchema {
    ComponentSchema::new("Load", "loads")
        .with_description("PQ power consumer")
        .with(name_attr())
        .with(AttributeSpec::string("bus").with_default(""))
        .with(AttributeSpec::string("carrier").with_default(""))
        .with(AttributeSpec::string("type").with_default(""))
        .with(AttributeSpec::float("p_set").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("q_set").with_unit("MVar").with_default(0.0).varying())
        .with(AttributeSpec::float("sign").with_default(-1.0))
        .with(AttributeSpec::float("p").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("q").with_unit("MVar").with_default(0.0).varying())
}

fn generator() -> ComponentSchema {
    ComponentSchema::new("Generator", "generators")
        .with_description("Power generator")
        .with(name_attr())
        .with(AttributeSpec::string("bus").with_default(""))
        .with(AttributeSpec::string("control").with_default("PQ"))
        .with(AttributeSpec::string("type").with_default(""))
        .with(AttributeSpec::float("p_nom").with_unit("MW").with_default(0.0))
        .with(AttributeSpec::boolean("p_nom_extendable").with_default(false))
        .with(AttributeSpec::float("p_min_pu").with_unit("per unit").with_default(0.0).varying())
        .with(AttributeSpec::float("p_max_pu").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("p_set").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("q_set").with_unit("MVar").with_default(0.0).varying())
        .with(AttributeSpec::float("sign").with_default(1.0))
        .with(AttributeSpec::string("carrier").with_default(""))
        .with(AttributeSpec::float("marginal_cost").with_unit("currency/MWh").with_default(0.0).varying())
        .with(AttributeSpec::float("capital_cost").with_unit("currency/MW").with_default(0.0))
        .with(AttributeSpec::float("efficiency").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::boolean("committable").with_default(false))
        .with(AttributeSpec::int("min_up_time").with_unit("snapshots").with_default(0.0))
        .with(AttributeSpec::int("min_down_time").with_unit("snapshots").with_default(0.0))
        .with(AttributeSpec::float("p").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("q").with_unit("MVar").with_default(0.0).varying())
        .with(AttributeSpec::boolean("status").with_default(true).varying())
}

fn storage_unit() -> ComponentSchema {
    ComponentSchema::new("StorageUnit", "storage_units")
        .with_description("Storage unit with fixed nominal energy-to-power ratio")
        .with(name_attr())
        .with(AttributeSpec::string("bus").with_default(""))
        .with(AttributeSpec::string("carrier").with_default(""))
        .with(AttributeSpec::float("p_nom").with_unit("MW").with_default(0.0))
        .with(AttributeSpec::float("p_min_pu").with_unit("per unit").with_default(-1.0).varying())
        .with(AttributeSpec::float("p_max_pu").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("max_hours").with_unit("hours").with_default(1.0))
        .with(AttributeSpec::float("state_of_charge_initial").with_unit("MWh").with_default(0.0))
        .with(AttributeSpec::boolean("cyclic_state_of_charge").with_default(false))
        .with(AttributeSpec::float("efficiency_store").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("efficiency_dispatch").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("inflow").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("p").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("state_of_charge").with_unit("MWh").with_default(f64::NAN).varying())
}

fn store() -> ComponentSchema {
    ComponentSchema::new("Store", "stores")
        .with_description("Generic energy store")
        .with(name_attr())
        .with(AttributeSpec::string("bus").with_default(""))
        .with(AttributeSpec::string("carrier").with_default(""))
        .with(AttributeSpec::float("e_nom").with_unit("MWh").with_default(0.0))
        .with(AttributeSpec::float("e_min_pu").with_unit("per unit").with_default(0.0).varying())
        .with(AttributeSpec::float("e_max_pu").with_unit("per unit").with_default(1.0).varying())
        .with(AttributeSpec::float("e_initial").with_unit("MWh").with_default(0.0))
        .with(AttributeSpec::boolean("e_initial_per_period").with_default(false))
        .with(AttributeSpec::boolean("e_cyclic").with_default(false))
        .with(AttributeSpec::boolean("e_cyclic_per_period").with_default(true))
        .with(AttributeSpec::float("p_set").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("p").with_unit("MW").with_default(0.0).varying())
        .with(AttributeSpec::float("e").with_unit("MWh").with_default(0.0).varying())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema_order() {
        let schema = AttributeSchema::standard();
        let names: Vec<&str> = schema.components().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"SubNetwork"));
        assert!(names.contains(&"Generator"));
        let link = names.iter().position(|n| *n == "Link").unwrap();
        let load = names.iter().position(|n| *n == "Load").unwrap();
        assert!(link < load);
    }

    #[test]
    fn test_lookup_by_name_and_list_name() {
        let schema = AttributeSchema::standard();
        assert_eq!(schema.component("Generator").unwrap().list_name, "generators");
        assert_eq!(schema.by_list_name("storage_units").unwrap().name.as_str(), "StorageUnit");
        assert!(schema.component("Gizmo").is_none());
    }

    #[test]
    fn test_every_standard_component_declares_name_first() {
        for component in AttributeSchema::standard().components() {
            assert_eq!(component.attributes[0].name, "name", "{}", component.name);
            assert!(!component.attributes[0].varying);
        }
    }

    #[test]
    fn test_extend_appends_new_types_and_attributes() {
        let mut schema = AttributeSchema::standard();
        let before = schema.components().len();
        schema.extend(vec![
            ComponentSchema::new("Link", "links")
                .with(AttributeSpec::string("bus2").with_default(""))
                .with(AttributeSpec::float("efficiency2").varying())
                .with(AttributeSpec::float("p_nom")),
            ComponentSchema::new("Dam", "dams").with(AttributeSpec::string("name")),
        ]);

        assert_eq!(schema.components().len(), before + 1);
        assert_eq!(schema.components().last().unwrap().name.as_str(), "Dam");

        let link = schema.component("Link").unwrap();
        assert!(link.attribute("efficiency2").unwrap().varying);
        assert_eq!(link.attributes.iter().filter(|a| a.name == "p_nom").count(), 1);
    }

    #[test]
    fn test_attribute_spec_deserializes_with_defaults() {
        let spec: AttributeSpec = serde_json::from_str(r#"{"name": "inflow", "varying": true}"#).unwrap();
        assert!(spec.varying);
        assert_eq!(spec.dtype, AttributeType::Float);
        assert!(spec.default.is_none());
    }
}
