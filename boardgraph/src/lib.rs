//! BoardGraph - connectivity model for grid-based circuit boards
//!
//! Components are placed on an integer grid, their pins are bound to nets,
//! and nets own rectilinear trace segments. The [`BoardGraph`] keeps all of
//! this consistent (occupancy, net membership, cascading deletes) and tells
//! registered listeners about every change.
//!
//! # Quick Start
//!
//! ```
//! use boardgraph::prelude::*;
//!
//! let catalog = ComponentCatalog::builtin();
//! let mut board = BoardGraph::default();
//! let vin = board.create_net("VIN").net_id;
//!
//! let resistor = catalog.get("resistor").unwrap();
//! let r1 = board
//!     .place_definition(resistor, GridPosition::new(3, 0), 0, None, false)
//!     .unwrap()
//!     .instance_id;
//!
//! let pin = board.pin_ref(r1, 0).unwrap();
//! board.connect_pin_to_net(vin, &pin).unwrap();
//! assert_eq!(board.net(vin).unwrap().pin_count(), 1);
//! ```
//!
//! # Consumers
//!
//! - **Netlist export**: flat two-terminal element list for a solver
//! - **Design-rule checks**: shorted / unconnected pins and board sanity
//! - **Stages**: declarative JSON boards replayed through the mutators

pub mod board;
pub mod catalog;
pub mod connectivity;
pub mod core;
pub mod drc;
pub mod grid;
pub mod netlist;
pub mod stage;

// Re-export main types
pub use board::{
    BoardConfig, BoardError, BoardEvent, BoardGraph, BoardListener, BoardSnapshot, BoardStats,
    InstanceId, ListenerId, Net, NetId, PinInstance, PinReference, PlacedComponent, SegmentId,
    TraceSegment,
};
pub use catalog::{ComponentCatalog, ComponentDefinition, ComponentKind};
pub use core::{BoardCheck, BoardGraphError, CheckOptions, CheckResult, IssueStats};
pub use drc::{DesignRuleChecker, Issue, Severity};
pub use grid::{Bounds, GridPosition};
pub use netlist::{export_netlist, Netlist};
pub use stage::{load_stage, StageError, StageSpec};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BoardCheck, BoardError, BoardEvent, BoardGraph, Bounds, CheckOptions, ComponentCatalog,
        ComponentDefinition, GridPosition, InstanceId, Issue, NetId, PinInstance, PinReference,
        SegmentId, Severity,
    };
}
