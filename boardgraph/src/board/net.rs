//! Nets and the pin references they hold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use super::ids::{InstanceId, NetId, SegmentId};
use crate::grid::GridPosition;

/// Weak pointer to a pin on a placed component.
///
/// Identity is `(component, pin_index)`; `world_position` is a cached copy
/// taken when the reference was resolved and is not part of equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinReference {
    pub component: InstanceId,
    pub pin_index: usize,
    pub world_position: GridPosition,
}

impl PinReference {
    pub fn new(component: InstanceId, pin_index: usize, world_position: GridPosition) -> Self {
        Self {
            component,
            pin_index,
            world_position,
        }
    }

    pub fn refers_to(&self, component: InstanceId, pin_index: usize) -> bool {
        self.component == component && self.pin_index == pin_index
    }
}

impl PartialEq for PinReference {
    fn eq(&self, other: &Self) -> bool {
        self.refers_to(other.component, other.pin_index)
    }
}

impl Eq for PinReference {}

impl Hash for PinReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.component.hash(state);
        self.pin_index.hash(state);
    }
}

/// An electrical node: the pins bound to it and the trace segments it owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub net_id: NetId,
    pub name: String,

    /// Bound pins, in binding order
    connected_pins: Vec<PinReference>,

    segments: BTreeSet<SegmentId>,
}

impl Net {
    pub(crate) fn new(net_id: NetId, name: impl Into<String>) -> Self {
        Self {
            net_id,
            name: name.into(),
            connected_pins: Vec::new(),
            segments: BTreeSet::new(),
        }
    }

    pub fn pins(&self) -> &[PinReference] {
        &self.connected_pins
    }

    pub fn pin_count(&self) -> usize {
        self.connected_pins.len()
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.segments.iter().copied()
    }

    pub fn trace_count(&self) -> usize {
        self.segments.len()
    }

    pub fn contains_pin(&self, component: InstanceId, pin_index: usize) -> bool {
        self.connected_pins
            .iter()
            .any(|p| p.refers_to(component, pin_index))
    }

    /// Ground nets are named "GND" or "0"
    pub fn is_ground(&self) -> bool {
        self.name == "GND" || self.name == "0"
    }

    /// Power nets are named "V..." (VIN, VCC, V5, ...)
    pub fn is_power(&self) -> bool {
        self.name.starts_with('V')
    }

    /// No pins and no traces: such a net must not outlive the operation
    /// that emptied it.
    pub fn is_orphaned(&self) -> bool {
        self.connected_pins.is_empty() && self.segments.is_empty()
    }

    /// Returns false if the pin was already a member
    pub(crate) fn insert_pin(&mut self, pin: PinReference) -> bool {
        if self.connected_pins.contains(&pin) {
            return false;
        }
        self.connected_pins.push(pin);
        true
    }

    pub(crate) fn remove_pin(&mut self, component: InstanceId, pin_index: usize) -> bool {
        let before = self.connected_pins.len();
        self.connected_pins
            .retain(|p| !p.refers_to(component, pin_index));
        self.connected_pins.len() != before
    }

    pub(crate) fn take_pins(&mut self) -> Vec<PinReference> {
        std::mem::take(&mut self.connected_pins)
    }

    pub(crate) fn insert_segment(&mut self, segment_id: SegmentId) {
        self.segments.insert(segment_id);
    }

    pub(crate) fn remove_segment(&mut self, segment_id: SegmentId) -> bool {
        self.segments.remove(&segment_id)
    }
}
