use serde::{Deserialize, Serialize};

use super::ids::{NetId, SegmentId};
use crate::grid::GridPosition;

/// A straight wire run between two grid points, owned by one net
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSegment {
    pub segment_id: SegmentId,
    pub net_id: NetId,
    pub start: GridPosition,
    pub end: GridPosition,
}

impl TraceSegment {
    pub fn is_axis_aligned(&self) -> bool {
        self.start.x == self.end.x || self.start.y == self.end.y
    }

    pub fn length(&self) -> u32 {
        self.start.manhattan_distance(&self.end)
    }

    /// True if `position` is one of the two endpoints
    pub fn touches(&self, position: GridPosition) -> bool {
        self.start == position || self.end == position
    }

    pub fn endpoints(&self) -> [GridPosition; 2] {
        [self.start, self.end]
    }
}
