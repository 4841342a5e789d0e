use thiserror::Error;

use super::ids::{InstanceId, NetId};
use crate::grid::GridPosition;

/// Errors raised by board mutators. A failed call leaves the board unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("position {position} is already occupied by component {occupant}")]
    PositionOccupied {
        position: GridPosition,
        occupant: InstanceId,
    },

    #[error("unknown net {0}")]
    UnknownNet(NetId),

    #[error("unknown component {0}")]
    UnknownComponent(InstanceId),

    #[error("component {component} has no pin {pin_index}")]
    UnknownPin {
        component: InstanceId,
        pin_index: usize,
    },
}
