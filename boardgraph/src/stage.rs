//! Stage Loading
//!
//! A stage is a declarative JSON description of a board: playfield size,
//! named nets, placed parts with their pin bindings, and pre-drawn traces.
//! Loading replays it through the ordinary board mutators, so a loaded
//! board obeys exactly the same invariants as one built by hand.
//!
//! ```json
//! {
//!   "name": "Voltage divider",
//!   "bounds": { "min_x": 0, "min_y": 0, "max_x": 8, "max_y": 4 },
//!   "nets": ["VIN", "GND", "VOUT"],
//!   "components": [
//!     { "definition": "voltage_source", "x": 0, "y": 0, "value": 9.0,
//!       "fixed": true, "pins": { "0": "VIN", "1": "GND" } }
//!   ],
//!   "traces": [ { "net": "VIN", "from": { "x": 1, "y": 0 }, "to": { "x": 2, "y": 0 } } ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::board::{BoardError, BoardGraph, NetId};
use crate::catalog::ComponentCatalog;
use crate::grid::{Bounds, GridPosition};

#[derive(Debug, Error)]
pub enum StageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stage JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown component definition '{0}'")]
    UnknownDefinition(String),

    #[error("Net '{0}' is not declared by the stage")]
    UnknownNet(String),

    #[error("Net '{0}' is declared more than once")]
    DuplicateNet(String),

    #[error("Board rejected stage data: {0}")]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,

    /// Suggested playfield; defaults to the board default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,

    #[serde(default)]
    pub nets: Vec<String>,

    #[serde(default)]
    pub components: Vec<StageComponent>,

    #[serde(default)]
    pub traces: Vec<StageTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageComponent {
    pub definition: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default)]
    pub fixed: bool,
    /// Pin index -> net name
    #[serde(default)]
    pub pins: BTreeMap<usize, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    pub net: String,
    pub from: GridPosition,
    pub to: GridPosition,
}

impl StageSpec {
    pub fn from_json(content: &str) -> Result<Self, StageError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, StageError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Build a board from a stage, resolving definitions through `catalog`
pub fn load_stage(spec: &StageSpec, catalog: &ComponentCatalog) -> Result<BoardGraph, StageError> {
    let mut board = match spec.bounds {
        Some(bounds) => BoardGraph::with_bounds(bounds),
        None => BoardGraph::default(),
    };

    let mut nets: HashMap<&str, NetId> = HashMap::new();
    for name in &spec.nets {
        if nets.contains_key(name.as_str()) {
            return Err(StageError::DuplicateNet(name.clone()));
        }
        let net_id = board.create_net(name.clone()).net_id;
        nets.insert(name.as_str(), net_id);
    }
    let net_for = |name: &str| -> Result<NetId, StageError> {
        nets.get(name)
            .copied()
            .ok_or_else(|| StageError::UnknownNet(name.to_string()))
    };

    for entry in &spec.components {
        let definition = catalog
            .get(&entry.definition)
            .ok_or_else(|| StageError::UnknownDefinition(entry.definition.clone()))?;
        let instance_id = board
            .place_definition(
                definition,
                GridPosition::new(entry.x, entry.y),
                entry.rotation,
                entry.value,
                entry.fixed,
            )?
            .instance_id;

        for (&pin_index, net_name) in &entry.pins {
            let net_id = net_for(net_name)?;
            let pin = board
                .pin_ref(instance_id, pin_index)
                .ok_or(BoardError::UnknownPin {
                    component: instance_id,
                    pin_index,
                })?;
            board.connect_pin_to_net(net_id, &pin)?;
        }
    }

    for trace in &spec.traces {
        let net_id = net_for(&trace.net)?;
        board.add_manhattan_trace(net_id, trace.from, trace.to)?;
    }

    let stats = board.stats();
    info!(
        stage = %spec.name,
        components = stats.component_count,
        nets = stats.net_count,
        traces = stats.trace_count,
        "loaded stage"
    );
    Ok(board)
}

/// Read and load a stage file in one step
pub fn load_stage_file(path: &Path, catalog: &ComponentCatalog) -> Result<(StageSpec, BoardGraph), StageError> {
    let spec = StageSpec::from_path(path)?;
    let board = load_stage(&spec, catalog)?;
    Ok((spec, board))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIVIDER: &str = r#"{
        "name": "divider",
        "bounds": { "min_x": 0, "min_y": 0, "max_x": 8, "max_y": 4 },
        "nets": ["VIN", "GND", "VOUT"],
        "components": [
            { "definition": "voltage_source", "x": 0, "y": 0, "value": 9.0, "fixed": true,
              "pins": { "0": "VIN", "1": "GND" } },
            { "definition": "resistor", "x": 3, "y": 0, "pins": { "0": "VIN", "1": "VOUT" } },
            { "definition": "resistor", "x": 6, "y": 0, "pins": { "0": "VOUT", "1": "GND" } }
        ],
        "traces": [ { "net": "VIN", "from": { "x": 1, "y": 0 }, "to": { "x": 2, "y": 0 } } ]
    }"#;

    #[test]
    fn test_load_divider() {
        let spec = StageSpec::from_json(DIVIDER).unwrap();
        let board = load_stage(&spec, &ComponentCatalog::builtin()).unwrap();

        assert_eq!(board.component_count(), 3);
        assert_eq!(board.net_count(), 3);
        assert_eq!(board.trace_count(), 1);
        for name in ["VIN", "GND", "VOUT"] {
            assert_eq!(board.net_by_name(name).unwrap().pin_count(), 2, "net {}", name);
        }
        assert!(board.component_at(GridPosition::ORIGIN).unwrap().is_fixed);
        assert_eq!(board.config().suggested_bounds, Bounds::new(0, 0, 8, 4));
    }

    #[test]
    fn test_minimal_stage_uses_defaults() {
        let spec = StageSpec::from_json(r#"{ "name": "empty" }"#).unwrap();
        let board = load_stage(&spec, &ComponentCatalog::builtin()).unwrap();
        assert_eq!(board.component_count(), 0);
        assert_eq!(board.compute_content_bounds(), Bounds::default());
    }

    #[test]
    fn test_unknown_definition() {
        let spec = StageSpec::from_json(
            r#"{ "name": "bad", "components": [ { "definition": "tube", "x": 0, "y": 0 } ] }"#,
        )
        .unwrap();
        let err = load_stage(&spec, &ComponentCatalog::builtin()).unwrap_err();
        assert!(matches!(err, StageError::UnknownDefinition(ref d) if d == "tube"));
    }

    #[test]
    fn test_undeclared_net() {
        let spec = StageSpec::from_json(
            r#"{ "name": "bad", "components": [
                { "definition": "resistor", "x": 0, "y": 0, "pins": { "0": "NOPE" } } ] }"#,
        )
        .unwrap();
        let err = load_stage(&spec, &ComponentCatalog::builtin()).unwrap_err();
        assert!(matches!(err, StageError::UnknownNet(ref n) if n == "NOPE"));
    }

    #[test]
    fn test_duplicate_net_and_overlap() {
        let spec = StageSpec::from_json(r#"{ "name": "dup", "nets": ["A", "A"] }"#).unwrap();
        assert!(matches!(
            load_stage(&spec, &ComponentCatalog::builtin()),
            Err(StageError::DuplicateNet(_))
        ));

        let spec = StageSpec::from_json(
            r#"{ "name": "overlap", "components": [
                { "definition": "resistor", "x": 1, "y": 1 },
                { "definition": "capacitor", "x": 1, "y": 1 } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            load_stage(&spec, &ComponentCatalog::builtin()),
            Err(StageError::Board(BoardError::PositionOccupied { .. }))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(StageSpec::from_json("{ not json"), Err(StageError::Json(_))));
    }
}
