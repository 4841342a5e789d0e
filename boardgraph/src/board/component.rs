//! Placed components and their pins.

use serde::{Deserialize, Serialize};

use super::ids::{InstanceId, NetId};
use super::net::PinReference;
use crate::grid::GridPosition;

/// A pin on a component, positioned in the component's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinInstance {
    /// Index of the pin within its component
    pub pin_index: usize,

    /// Pin name (e.g., "1", "+", "in")
    pub pin_name: String,

    /// Offset from the component origin before rotation
    pub local_position: GridPosition,

    /// Net this pin is bound to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_net_id: Option<NetId>,
}

impl PinInstance {
    pub fn new(pin_index: usize, pin_name: impl Into<String>, local_position: GridPosition) -> Self {
        Self {
            pin_index,
            pin_name: pin_name.into(),
            local_position,
            connected_net_id: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected_net_id.is_some()
    }
}

/// An instance of a catalog definition placed on the board grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedComponent {
    pub instance_id: InstanceId,

    /// Opaque reference into the component catalog
    pub definition_id: String,

    pub position: GridPosition,

    /// Rotation in degrees; callers use 0, 90, 180 or 270
    pub rotation: i32,

    pub pins: Vec<PinInstance>,

    /// Overrides the definition's default value (ohms, volts, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_value: Option<f64>,

    /// Fixed placements cannot be removed by ordinary edits
    #[serde(default)]
    pub is_fixed: bool,
}

impl PlacedComponent {
    pub fn pin(&self, pin_index: usize) -> Option<&PinInstance> {
        self.pins.iter().find(|p| p.pin_index == pin_index)
    }

    pub(crate) fn pin_mut(&mut self, pin_index: usize) -> Option<&mut PinInstance> {
        self.pins.iter_mut().find(|p| p.pin_index == pin_index)
    }

    pub fn world_position_of(&self, pin: &PinInstance) -> GridPosition {
        self.position + pin.local_position.rotated(self.rotation)
    }

    pub fn pin_world_position(&self, pin_index: usize) -> Option<GridPosition> {
        self.pin(pin_index).map(|p| self.world_position_of(p))
    }

    /// World position of every pin, in pin order
    pub fn pin_world_positions(&self) -> impl Iterator<Item = (usize, GridPosition)> + '_ {
        self.pins
            .iter()
            .map(move |p| (p.pin_index, self.world_position_of(p)))
    }

    /// Resolve a reference to one of this component's pins
    pub fn pin_ref(&self, pin_index: usize) -> Option<PinReference> {
        self.pin_world_position(pin_index)
            .map(|world| PinReference::new(self.instance_id, pin_index, world))
    }

    pub fn connected_pin_count(&self) -> usize {
        self.pins.iter().filter(|p| p.is_connected()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resistor_at(x: i32, y: i32, rotation: i32) -> PlacedComponent {
        PlacedComponent {
            instance_id: InstanceId(1),
            definition_id: "resistor".to_string(),
            position: GridPosition::new(x, y),
            rotation,
            pins: vec![
                PinInstance::new(0, "1", GridPosition::new(-1, 0)),
                PinInstance::new(1, "2", GridPosition::new(1, 0)),
            ],
            custom_value: None,
            is_fixed: false,
        }
    }

    #[test]
    fn test_pin_world_positions_unrotated() {
        let r = resistor_at(4, 2, 0);
        let positions: Vec<_> = r.pin_world_positions().collect();
        assert_eq!(
            positions,
            vec![(0, GridPosition::new(3, 2)), (1, GridPosition::new(5, 2))]
        );
    }

    #[test]
    fn test_pin_world_positions_rotated() {
        let r = resistor_at(4, 2, 90);
        assert_eq!(r.pin_world_position(0), Some(GridPosition::new(4, 1)));
        assert_eq!(r.pin_world_position(1), Some(GridPosition::new(4, 3)));
        assert_eq!(r.pin_world_position(2), None);
    }

    #[test]
    fn test_pin_ref_carries_world_position() {
        let r = resistor_at(0, 0, 180);
        let pin = r.pin_ref(0).unwrap();
        assert_eq!(pin.component, InstanceId(1));
        assert_eq!(pin.pin_index, 0);
        assert_eq!(pin.world_position, GridPosition::new(1, 0));
        assert!(r.pin_ref(9).is_none());
    }
}
