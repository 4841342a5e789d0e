//! Netlist Export
//!
//! Flattens a board into two-terminal elements with named nodes, ready
//! for an external numeric solver. Ground nets become node "0".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;
use thiserror::Error;

use crate::board::{BoardGraph, InstanceId, Net, NetId, PlacedComponent};
use crate::catalog::{ComponentCatalog, ComponentKind};

/// Node name used for every ground net
pub const GROUND_NODE: &str = "0";

#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("component {instance} uses unknown definition '{definition_id}'")]
    UnknownDefinition {
        instance: InstanceId,
        definition_id: String,
    },

    #[error("component {instance} ({kind}) has {pin_count} pins, expected 2")]
    UnsupportedPinCount {
        instance: InstanceId,
        kind: ComponentKind,
        pin_count: usize,
    },
}

/// One solver element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetlistElement {
    /// Element name, e.g. "R1", "V2"
    pub name: String,
    pub kind: ComponentKind,
    pub instance_id: InstanceId,
    pub node_a: String,
    pub node_b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// A probed node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetlistProbe {
    pub instance_id: InstanceId,
    pub node: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Netlist {
    pub elements: Vec<NetlistElement>,
    pub probes: Vec<NetlistProbe>,
}

impl Netlist {
    pub fn element(&self, name: &str) -> Option<&NetlistElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Distinct node names used by elements, ground excluded
    pub fn nodes(&self) -> Vec<&str> {
        let mut nodes: Vec<&str> = self
            .elements
            .iter()
            .flat_map(|e| [e.node_a.as_str(), e.node_b.as_str()])
            .filter(|n| *n != GROUND_NODE)
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }

    /// Render as a SPICE-style deck
    pub fn to_spice(&self, title: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "* {}", title);
        for element in &self.elements {
            match element.value {
                Some(value) => {
                    let _ = writeln!(
                        out,
                        "{} {} {} {}",
                        element.name, element.node_a, element.node_b, value
                    );
                }
                None => {
                    let _ = writeln!(out, "{} {} {}", element.name, element.node_a, element.node_b);
                }
            }
        }
        for probe in &self.probes {
            let _ = writeln!(out, "* probe {}", probe.node);
        }
        out.push_str(".end\n");
        out
    }
}

/// Build the netlist for a board, resolving definitions through `catalog`
pub fn export_netlist(board: &BoardGraph, catalog: &ComponentCatalog) -> Result<Netlist, NetlistError> {
    let node_names = node_names(board);
    let node_of = |component: &PlacedComponent, pin_index: usize| -> String {
        component
            .pin(pin_index)
            .and_then(|p| p.connected_net_id)
            .and_then(|net_id| node_names.get(&net_id).cloned())
            .unwrap_or_else(|| format!("NC_{}_{}", component.instance_id, pin_index))
    };

    let mut netlist = Netlist::default();
    let mut counters: HashMap<char, usize> = HashMap::new();

    for component in board.components() {
        let definition = catalog.get(&component.definition_id).ok_or_else(|| {
            NetlistError::UnknownDefinition {
                instance: component.instance_id,
                definition_id: component.definition_id.clone(),
            }
        })?;

        let Some(prefix) = definition.kind.spice_prefix() else {
            for pin in &component.pins {
                netlist.probes.push(NetlistProbe {
                    instance_id: component.instance_id,
                    node: node_of(component, pin.pin_index),
                });
            }
            continue;
        };

        if component.pins.len() != 2 {
            return Err(NetlistError::UnsupportedPinCount {
                instance: component.instance_id,
                kind: definition.kind,
                pin_count: component.pins.len(),
            });
        }

        let counter = counters.entry(prefix).or_insert(0);
        *counter += 1;

        netlist.elements.push(NetlistElement {
            name: format!("{}{}", prefix, counter),
            kind: definition.kind,
            instance_id: component.instance_id,
            node_a: node_of(component, component.pins[0].pin_index),
            node_b: node_of(component, component.pins[1].pin_index),
            value: component.custom_value.or(definition.default_value),
        });
    }

    tracing::debug!(
        elements = netlist.elements.len(),
        probes = netlist.probes.len(),
        "exported netlist"
    );
    Ok(netlist)
}

/// Node name per net. Duplicate or empty names get the net id appended so
/// that distinct nets never share a node.
fn node_names(board: &BoardGraph) -> HashMap<NetId, String> {
    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for net in board.nets().filter(|n| !n.is_ground()) {
        *name_counts.entry(net.name.as_str()).or_insert(0) += 1;
    }

    board
        .nets()
        .map(|net: &Net| {
            let name = if net.is_ground() {
                GROUND_NODE.to_string()
            } else if net.name.is_empty() {
                format!("N{}", net.net_id)
            } else if name_counts.get(net.name.as_str()).copied().unwrap_or(0) > 1 {
                format!("{}_{}", net.name, net.net_id)
            } else {
                net.name.clone()
            };
            (net.net_id, name)
        })
        .collect()
}
