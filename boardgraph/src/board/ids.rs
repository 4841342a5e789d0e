//! Typed identifiers and the per-board counters that hand them out.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! board_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn as_u32(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

board_id!(
    /// Identifier of a placed component instance
    InstanceId
);
board_id!(
    /// Identifier of a net
    NetId
);
board_id!(
    /// Identifier of a trace segment
    SegmentId
);

/// Monotonic counter starting at 1. Values are never handed out twice.
#[derive(Debug, Clone)]
pub struct IdCounter {
    next: u32,
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The value the next call to `allocate` will return
    pub fn peek(&self) -> u32 {
        self.next
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_at_one_and_increases() {
        let mut counter = IdCounter::new();
        assert_eq!(counter.peek(), 1);
        assert_eq!(counter.allocate(), 1);
        assert_eq!(counter.allocate(), 2);
        assert_eq!(counter.allocate(), 3);
        assert_eq!(counter.peek(), 4);
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&NetId(7)).unwrap();
        assert_eq!(json, "7");
        let id: InstanceId = serde_json::from_str("12").unwrap();
        assert_eq!(id, InstanceId(12));
        assert_eq!(SegmentId(3).to_string(), "3");
    }
}
