//! Component Catalog
//!
//! Definitions describe what can be placed: the kind of element, the pin
//! layout in the local frame, and a default value. Placed components only
//! keep the definition id; consumers such as the netlist exporter resolve
//! it back through a [`ComponentCatalog`].
//!
//! Synthetic definitions (the stage probe, test fixtures) are built with
//! [`DefinitionBuilder`] like any other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::board::PinInstance;
use crate::grid::GridPosition;

/// Electrical role of a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Inductor,
    VoltageSource,
    CurrentSource,
    /// Measurement point; has no element in the netlist
    Probe,
}

impl ComponentKind {
    /// SPICE element letter, if the kind produces an element
    pub fn spice_prefix(&self) -> Option<char> {
        match self {
            ComponentKind::Resistor => Some('R'),
            ComponentKind::Capacitor => Some('C'),
            ComponentKind::Inductor => Some('L'),
            ComponentKind::VoltageSource => Some('V'),
            ComponentKind::CurrentSource => Some('I'),
            ComponentKind::Probe => None,
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, ComponentKind::VoltageSource | ComponentKind::CurrentSource)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKind::Resistor => write!(f, "Resistor"),
            ComponentKind::Capacitor => write!(f, "Capacitor"),
            ComponentKind::Inductor => write!(f, "Inductor"),
            ComponentKind::VoltageSource => write!(f, "Voltage Source"),
            ComponentKind::CurrentSource => write!(f, "Current Source"),
            ComponentKind::Probe => write!(f, "Probe"),
        }
    }
}

/// A pin in a definition's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinTemplate {
    pub name: String,
    pub offset: GridPosition,
}

/// Something that can be placed on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: String,
    pub kind: ComponentKind,
    pub display_name: String,
    pub pins: Vec<PinTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
}

impl ComponentDefinition {
    pub fn builder(id: impl Into<String>, kind: ComponentKind) -> DefinitionBuilder {
        DefinitionBuilder::new(id, kind)
    }

    /// Standard horizontal two-terminal part with pins either side of its origin
    pub fn two_terminal(
        id: impl Into<String>,
        kind: ComponentKind,
        pin_names: [&str; 2],
        default_value: f64,
    ) -> Self {
        let id = id.into();
        Self::builder(id.clone(), kind)
            .display_name(kind.to_string())
            .pin(pin_names[0], -1, 0)
            .pin(pin_names[1], 1, 0)
            .default_value(default_value)
            .build()
    }

    /// Single-pin measurement point used by stages to mark observed nodes
    pub fn probe() -> Self {
        Self::builder("probe", ComponentKind::Probe)
            .display_name("Probe")
            .pin("in", 0, 0)
            .build()
    }

    /// Fresh, unbound pins for a new placement
    pub fn instantiate_pins(&self) -> Vec<PinInstance> {
        self.pins
            .iter()
            .enumerate()
            .map(|(index, template)| PinInstance::new(index, template.name.clone(), template.offset))
            .collect()
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }
}

pub struct DefinitionBuilder {
    id: String,
    kind: ComponentKind,
    display_name: Option<String>,
    pins: Vec<PinTemplate>,
    default_value: Option<f64>,
}

impl DefinitionBuilder {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
            display_name: None,
            pins: Vec::new(),
            default_value: None,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn pin(mut self, name: impl Into<String>, x: i32, y: i32) -> Self {
        self.pins.push(PinTemplate {
            name: name.into(),
            offset: GridPosition::new(x, y),
        });
        self
    }

    pub fn default_value(mut self, value: f64) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn build(self) -> ComponentDefinition {
        let display_name = self.display_name.unwrap_or_else(|| self.id.clone());
        ComponentDefinition {
            id: self.id,
            kind: self.kind,
            display_name,
            pins: self.pins,
            default_value: self.default_value,
        }
    }
}

/// Definition id -> definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentCatalog {
    definitions: BTreeMap<String, ComponentDefinition>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parts every stage can use
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(ComponentDefinition::two_terminal(
            "resistor",
            ComponentKind::Resistor,
            ["1", "2"],
            1_000.0,
        ));
        catalog.register(ComponentDefinition::two_terminal(
            "capacitor",
            ComponentKind::Capacitor,
            ["1", "2"],
            1e-6,
        ));
        catalog.register(ComponentDefinition::two_terminal(
            "inductor",
            ComponentKind::Inductor,
            ["1", "2"],
            1e-3,
        ));
        catalog.register(ComponentDefinition::two_terminal(
            "voltage_source",
            ComponentKind::VoltageSource,
            ["+", "-"],
            5.0,
        ));
        catalog.register(ComponentDefinition::two_terminal(
            "current_source",
            ComponentKind::CurrentSource,
            ["+", "-"],
            1e-3,
        ));
        catalog.register(ComponentDefinition::probe());
        catalog
    }

    /// Add or replace a definition
    pub fn register(&mut self, definition: ComponentDefinition) -> Option<ComponentDefinition> {
        self.definitions.insert(definition.id.clone(), definition)
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDefinition> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentDefinition> {
        self.definitions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ComponentCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        let resistor = catalog.get("resistor").unwrap();
        assert_eq!(resistor.kind, ComponentKind::Resistor);
        assert_eq!(resistor.pin_count(), 2);
        assert_eq!(resistor.default_value, Some(1_000.0));
        assert!(catalog.get("transistor").is_none());
    }

    #[test]
    fn test_probe_factory() {
        let probe = ComponentDefinition::probe();
        assert_eq!(probe.id, "probe");
        assert_eq!(probe.kind, ComponentKind::Probe);
        assert_eq!(probe.pins.len(), 1);
        assert_eq!(probe.pins[0].offset, GridPosition::ORIGIN);
        assert!(probe.kind.spice_prefix().is_none());
    }

    #[test]
    fn test_instantiate_pins_are_unbound() {
        let source = ComponentCatalog::builtin()
            .get("voltage_source")
            .cloned()
            .unwrap();
        let pins = source.instantiate_pins();
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[0].pin_name, "+");
        assert_eq!(pins[1].pin_index, 1);
        assert_eq!(pins[1].local_position, GridPosition::new(1, 0));
        assert!(pins.iter().all(|p| !p.is_connected()));
    }

    #[test]
    fn test_builder_defaults_display_name_to_id() {
        let def = ComponentDefinition::builder("led", ComponentKind::Resistor)
            .pin("a", 0, 0)
            .build();
        assert_eq!(def.display_name, "led");
        assert!(def.default_value.is_none());
    }
}
