//! Board Graph
//!
//! The owning structure for everything placed on a board: components and
//! their pins, nets, and trace segments. All entities are created and
//! destroyed here, identifiers come from per-board counters, and every
//! mutation runs its cascades to completion before listeners are told.
//!
//! Cascades:
//! - removing a component unbinds its pins and deletes every trace that
//!   ends on one of them
//! - a net left with no pins and no traces is deleted
//! - removing the last trace of a net unbinds all of its pins and deletes
//!   the net, even if those pins were bound without a drawn trace

pub mod component;
pub mod error;
pub mod events;
pub mod ids;
pub mod net;
pub mod trace;

pub use component::{PinInstance, PlacedComponent};
pub use error::BoardError;
pub use events::{BoardEvent, BoardListener, ListenerId};
pub use ids::{IdCounter, InstanceId, NetId, SegmentId};
pub use net::{Net, PinReference};
pub use trace::TraceSegment;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::catalog::ComponentDefinition;
use crate::grid::{manhattan_path, Bounds, GridPosition};
use events::ListenerRegistry;

/// Board-level settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Designer-specified playfield, independent of actual content
    pub suggested_bounds: Bounds,
}

/// Counts describing a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStats {
    pub component_count: usize,
    pub fixed_component_count: usize,
    pub net_count: usize,
    pub trace_count: usize,
    pub connected_pin_count: usize,
    pub unconnected_pin_count: usize,
}

/// Detached, serializable copy of a board's contents in id order
#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub config: BoardConfig,
    pub content_bounds: Bounds,
    pub components: Vec<PlacedComponent>,
    pub nets: Vec<Net>,
    pub traces: Vec<TraceSegment>,
}

#[derive(Debug)]
pub struct BoardGraph {
    config: BoardConfig,

    components: HashMap<InstanceId, PlacedComponent>,

    /// Occupied cell -> component at that cell
    positions: HashMap<GridPosition, InstanceId>,

    nets: HashMap<NetId, Net>,

    traces: HashMap<SegmentId, TraceSegment>,

    instance_ids: IdCounter,
    net_ids: IdCounter,
    segment_ids: IdCounter,

    listeners: ListenerRegistry,

    /// Size of the registry while it is detached for delivery
    dispatching: usize,

    /// Events queued by the mutation in progress
    pending: Vec<BoardEvent>,
}

impl BoardGraph {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            components: HashMap::new(),
            positions: HashMap::new(),
            nets: HashMap::new(),
            traces: HashMap::new(),
            instance_ids: IdCounter::new(),
            net_ids: IdCounter::new(),
            segment_ids: IdCounter::new(),
            listeners: ListenerRegistry::default(),
            dispatching: 0,
            pending: Vec::new(),
        }
    }

    pub fn with_bounds(suggested_bounds: Bounds) -> Self {
        Self::new(BoardConfig { suggested_bounds })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    // ----- listeners -----

    /// Register a callback for every subsequent board event
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&BoardGraph, &BoardEvent) + 'static,
    {
        self.listeners.subscribe(Box::new(callback))
    }

    pub fn subscribe_listener<L>(&mut self, mut listener: L) -> ListenerId
    where
        L: BoardListener + 'static,
    {
        self.subscribe(move |board, event| listener.on_event(board, event))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Registered listeners, including while events are being delivered
    pub fn listener_count(&self) -> usize {
        self.listeners.len() + self.dispatching
    }

    // ----- components -----

    /// Place a component on a free cell.
    ///
    /// The pins are copied; any net binding they carry is dropped, bindings
    /// are only made through [`BoardGraph::connect_pin_to_net`].
    pub fn place_component(
        &mut self,
        definition_id: impl Into<String>,
        position: GridPosition,
        rotation: i32,
        pins: &[PinInstance],
        custom_value: Option<f64>,
        is_fixed: bool,
    ) -> Result<&PlacedComponent, BoardError> {
        if let Some(&occupant) = self.positions.get(&position) {
            warn!(%position, %occupant, "rejected placement on occupied cell");
            return Err(BoardError::PositionOccupied { position, occupant });
        }

        let instance_id = InstanceId(self.instance_ids.allocate());
        let pins = pins
            .iter()
            .cloned()
            .map(|mut pin| {
                pin.connected_net_id = None;
                pin
            })
            .collect();

        let component = PlacedComponent {
            instance_id,
            definition_id: definition_id.into(),
            position,
            rotation,
            pins,
            custom_value,
            is_fixed,
        };
        debug!(
            instance = %instance_id,
            definition = %component.definition_id,
            %position,
            rotation,
            "placed component"
        );

        self.positions.insert(position, instance_id);
        self.components.insert(instance_id, component.clone());
        self.pending.push(BoardEvent::ComponentPlaced(component));
        self.flush_events();

        Ok(&self.components[&instance_id])
    }

    /// Place an instance of a catalog definition, instantiating its pins
    pub fn place_definition(
        &mut self,
        definition: &ComponentDefinition,
        position: GridPosition,
        rotation: i32,
        custom_value: Option<f64>,
        is_fixed: bool,
    ) -> Result<&PlacedComponent, BoardError> {
        let pins = definition.instantiate_pins();
        self.place_component(
            definition.id.clone(),
            position,
            rotation,
            &pins,
            custom_value,
            is_fixed,
        )
    }

    /// Remove a component together with its bindings and the traces that
    /// end on its pins. Returns false for unknown or fixed components.
    pub fn remove_component(&mut self, instance_id: InstanceId) -> bool {
        let Some(component) = self.components.get(&instance_id) else {
            debug!(instance = %instance_id, "remove_component: no such component");
            return false;
        };
        if component.is_fixed {
            warn!(instance = %instance_id, "refusing to remove fixed component");
            return false;
        }

        let pin_positions: Vec<GridPosition> =
            component.pin_world_positions().map(|(_, p)| p).collect();
        let bound_pins: Vec<(usize, NetId)> = component
            .pins
            .iter()
            .filter_map(|p| p.connected_net_id.map(|net_id| (p.pin_index, net_id)))
            .collect();

        for (pin_index, net_id) in bound_pins {
            self.unbind_pin(instance_id, pin_index, net_id);
        }

        let mut touching: Vec<SegmentId> = self
            .traces
            .values()
            .filter(|t| pin_positions.iter().any(|&p| t.touches(p)))
            .map(|t| t.segment_id)
            .collect();
        touching.sort();
        for segment_id in touching {
            self.remove_trace_inner(segment_id);
        }

        if let Some(component) = self.components.remove(&instance_id) {
            self.positions.remove(&component.position);
        }
        debug!(instance = %instance_id, "removed component");

        self.pending.push(BoardEvent::ComponentRemoved(instance_id));
        self.flush_events();
        true
    }

    pub fn component(&self, instance_id: InstanceId) -> Option<&PlacedComponent> {
        self.components.get(&instance_id)
    }

    pub fn component_at(&self, position: GridPosition) -> Option<&PlacedComponent> {
        self.positions
            .get(&position)
            .and_then(|id| self.components.get(id))
    }

    pub fn is_position_occupied(&self, position: GridPosition) -> bool {
        self.positions.contains_key(&position)
    }

    /// Resolve a pin of a live component
    pub fn pin_ref(&self, instance_id: InstanceId, pin_index: usize) -> Option<PinReference> {
        self.components
            .get(&instance_id)
            .and_then(|c| c.pin_ref(pin_index))
    }

    /// All components in instance-id order
    pub fn components(&self) -> impl Iterator<Item = &PlacedComponent> + '_ {
        sorted_by_id(&self.components)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    // ----- nets -----

    pub fn create_net(&mut self, name: impl Into<String>) -> &Net {
        let net_id = NetId(self.net_ids.allocate());
        let net = Net::new(net_id, name);
        debug!(net = %net_id, name = %net.name, "created net");

        self.nets.insert(net_id, net.clone());
        self.pending.push(BoardEvent::NetCreated(net));
        self.flush_events();

        &self.nets[&net_id]
    }

    /// Bind a pin to a net, moving it off any other net it was bound to.
    ///
    /// Binding is idempotent. When the net goes from one pin to two a
    /// [`BoardEvent::PinsConnected`] is emitted.
    pub fn connect_pin_to_net(&mut self, net_id: NetId, pin: &PinReference) -> Result<(), BoardError> {
        if !self.nets.contains_key(&net_id) {
            warn!(net = %net_id, "connect_pin_to_net: unknown net");
            return Err(BoardError::UnknownNet(net_id));
        }
        let Some(component) = self.components.get(&pin.component) else {
            warn!(instance = %pin.component, "connect_pin_to_net: unknown component");
            return Err(BoardError::UnknownComponent(pin.component));
        };
        let resolved = component
            .pin_ref(pin.pin_index)
            .ok_or(BoardError::UnknownPin {
                component: pin.component,
                pin_index: pin.pin_index,
            })?;
        let previous = component
            .pin(pin.pin_index)
            .and_then(|p| p.connected_net_id);

        if let Some(previous) = previous.filter(|&prev| prev != net_id) {
            debug!(
                instance = %resolved.component,
                pin = resolved.pin_index,
                from = %previous,
                to = %net_id,
                "moving pin between nets"
            );
            self.unbind_pin(resolved.component, resolved.pin_index, previous);
        }

        if let Some(p) = self
            .components
            .get_mut(&resolved.component)
            .and_then(|c| c.pin_mut(resolved.pin_index))
        {
            p.connected_net_id = Some(net_id);
        }

        if let Some(net) = self.nets.get_mut(&net_id) {
            let before = net.pin_count();
            if net.insert_pin(resolved.clone()) {
                debug!(
                    net = %net_id,
                    instance = %resolved.component,
                    pin = resolved.pin_index,
                    "bound pin"
                );
                if before == 1 {
                    let first = net.pins()[0].clone();
                    self.pending.push(BoardEvent::PinsConnected {
                        net_id,
                        first,
                        second: resolved,
                    });
                }
            }
        }

        self.flush_events();
        Ok(())
    }

    /// Unbind a pin from whatever net it is on. Returns false if the pin
    /// does not resolve or was not bound.
    pub fn disconnect_pin(&mut self, pin: &PinReference) -> bool {
        let Some(net_id) = self
            .components
            .get(&pin.component)
            .and_then(|c| c.pin(pin.pin_index))
            .and_then(|p| p.connected_net_id)
        else {
            return false;
        };

        self.unbind_pin(pin.component, pin.pin_index, net_id);
        self.flush_events();
        true
    }

    pub fn net(&self, net_id: NetId) -> Option<&Net> {
        self.nets.get(&net_id)
    }

    /// First net (lowest id) with the given name
    pub fn net_by_name(&self, name: &str) -> Option<&Net> {
        self.nets
            .values()
            .filter(|n| n.name == name)
            .min_by_key(|n| n.net_id)
    }

    /// All nets in net-id order
    pub fn nets(&self) -> impl Iterator<Item = &Net> + '_ {
        sorted_by_id(&self.nets)
    }

    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    // ----- traces -----

    /// Add a segment to a net. Geometry is taken as given.
    pub fn add_trace(
        &mut self,
        net_id: NetId,
        start: GridPosition,
        end: GridPosition,
    ) -> Result<&TraceSegment, BoardError> {
        let segment_id = self.add_trace_inner(net_id, start, end)?;
        self.flush_events();
        Ok(&self.traces[&segment_id])
    }

    /// Route `start` to `end` as axis-aligned legs and add each leg to the net
    pub fn add_manhattan_trace(
        &mut self,
        net_id: NetId,
        start: GridPosition,
        end: GridPosition,
    ) -> Result<Vec<SegmentId>, BoardError> {
        if !self.nets.contains_key(&net_id) {
            warn!(net = %net_id, "add_manhattan_trace: unknown net");
            return Err(BoardError::UnknownNet(net_id));
        }

        let mut segment_ids = Vec::new();
        for (leg_start, leg_end) in manhattan_path(start, end) {
            segment_ids.push(self.add_trace_inner(net_id, leg_start, leg_end)?);
        }
        self.flush_events();
        Ok(segment_ids)
    }

    /// Remove a segment. Removing the last segment of a net dissolves the
    /// net and unbinds every pin that was on it.
    pub fn remove_trace(&mut self, segment_id: SegmentId) -> bool {
        let removed = self.remove_trace_inner(segment_id);
        if removed {
            self.flush_events();
        }
        removed
    }

    pub fn trace(&self, segment_id: SegmentId) -> Option<&TraceSegment> {
        self.traces.get(&segment_id)
    }

    /// Segments owned by a net, in id order; empty for an unknown net
    pub fn traces_for_net(&self, net_id: NetId) -> Vec<&TraceSegment> {
        match self.nets.get(&net_id) {
            Some(net) => net
                .segment_ids()
                .filter_map(|id| self.traces.get(&id))
                .collect(),
            None => Vec::new(),
        }
    }

    /// All segments in segment-id order
    pub fn traces(&self) -> impl Iterator<Item = &TraceSegment> + '_ {
        sorted_by_id(&self.traces)
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }

    // ----- whole-board queries -----

    /// The suggested bounds widened to enclose every component origin, pin
    /// and trace endpoint
    pub fn compute_content_bounds(&self) -> Bounds {
        let mut bounds = self.config.suggested_bounds;
        for component in self.components.values() {
            bounds.include(component.position);
            for (_, pin_position) in component.pin_world_positions() {
                bounds.include(pin_position);
            }
        }
        for trace in self.traces.values() {
            bounds.include(trace.start);
            bounds.include(trace.end);
        }
        bounds
    }

    pub fn stats(&self) -> BoardStats {
        let connected_pin_count = self
            .components
            .values()
            .map(|c| c.connected_pin_count())
            .sum();
        let total_pins: usize = self.components.values().map(|c| c.pins.len()).sum();

        BoardStats {
            component_count: self.components.len(),
            fixed_component_count: self.components.values().filter(|c| c.is_fixed).count(),
            net_count: self.nets.len(),
            trace_count: self.traces.len(),
            connected_pin_count,
            unconnected_pin_count: total_pins - connected_pin_count,
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            config: self.config,
            content_bounds: self.compute_content_bounds(),
            components: self.components().cloned().collect(),
            nets: self.nets().cloned().collect(),
            traces: self.traces().cloned().collect(),
        }
    }

    // ----- internals -----

    fn add_trace_inner(
        &mut self,
        net_id: NetId,
        start: GridPosition,
        end: GridPosition,
    ) -> Result<SegmentId, BoardError> {
        let Some(net) = self.nets.get_mut(&net_id) else {
            warn!(net = %net_id, "add_trace: unknown net");
            return Err(BoardError::UnknownNet(net_id));
        };

        let segment_id = SegmentId(self.segment_ids.allocate());
        net.insert_segment(segment_id);

        let trace = TraceSegment {
            segment_id,
            net_id,
            start,
            end,
        };
        debug!(segment = %segment_id, net = %net_id, %start, %end, "added trace");

        self.traces.insert(segment_id, trace.clone());
        self.pending.push(BoardEvent::TraceAdded(trace));
        Ok(segment_id)
    }

    fn remove_trace_inner(&mut self, segment_id: SegmentId) -> bool {
        let Some(trace) = self.traces.remove(&segment_id) else {
            debug!(segment = %segment_id, "remove_trace: no such segment");
            return false;
        };
        debug!(segment = %segment_id, net = %trace.net_id, "removed trace");
        self.pending.push(BoardEvent::TraceRemoved(segment_id));

        let was_last = match self.nets.get_mut(&trace.net_id) {
            Some(net) => {
                net.remove_segment(segment_id);
                net.trace_count() == 0
            }
            None => false,
        };
        if was_last {
            debug!(net = %trace.net_id, "last trace removed, dissolving net");
            self.delete_net(trace.net_id);
        }
        true
    }

    /// Take a pin off a net, deleting the net if that leaves it orphaned
    fn unbind_pin(&mut self, instance_id: InstanceId, pin_index: usize, net_id: NetId) {
        if let Some(pin) = self
            .components
            .get_mut(&instance_id)
            .and_then(|c| c.pin_mut(pin_index))
        {
            if pin.connected_net_id == Some(net_id) {
                pin.connected_net_id = None;
            }
        }

        let orphaned = match self.nets.get_mut(&net_id) {
            Some(net) => {
                net.remove_pin(instance_id, pin_index);
                net.is_orphaned()
            }
            None => false,
        };
        if orphaned {
            self.delete_net(net_id);
        }
    }

    /// Delete a net and clear the binding of every pin still on it
    fn delete_net(&mut self, net_id: NetId) {
        let Some(mut net) = self.nets.remove(&net_id) else {
            return;
        };
        for pin in net.take_pins() {
            if let Some(p) = self
                .components
                .get_mut(&pin.component)
                .and_then(|c| c.pin_mut(pin.pin_index))
            {
                if p.connected_net_id == Some(net_id) {
                    p.connected_net_id = None;
                }
            }
        }
        debug!(net = %net_id, name = %net.name, "deleted net");
        self.pending.push(BoardEvent::NetRemoved(net_id));
    }

    /// Deliver queued events. Listeners get the board read-only.
    fn flush_events(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.pending);
        if self.listeners.is_empty() {
            return;
        }

        let mut listeners = std::mem::take(&mut self.listeners);
        self.dispatching = listeners.len();
        for event in &events {
            listeners.dispatch(self, event);
        }
        self.dispatching = 0;
        self.listeners = listeners;
    }
}

impl Default for BoardGraph {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

fn sorted_by_id<K: Ord, V>(map: &HashMap<K, V>) -> impl Iterator<Item = &V> + '_ {
    let mut entries: Vec<(&K, &V)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries.into_iter().map(|(_, value)| value)
}
