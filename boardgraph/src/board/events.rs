//! Board Notifications
//!
//! Every mutation that changes the board queues one or more [`BoardEvent`]s.
//! They are delivered synchronously, in subscription order, once the
//! mutation and all of its cascades have completed. Listeners see the board
//! read-only and stay registered until explicitly unsubscribed.

use serde::Serialize;
use std::fmt;

use super::component::PlacedComponent;
use super::ids::{InstanceId, NetId, SegmentId};
use super::net::{Net, PinReference};
use super::trace::TraceSegment;
use super::BoardGraph;

/// A change to the board
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum BoardEvent {
    ComponentPlaced(PlacedComponent),
    ComponentRemoved(InstanceId),
    NetCreated(Net),
    /// A net was deleted because it was left without pins or traces
    NetRemoved(NetId),
    TraceAdded(TraceSegment),
    TraceRemoved(SegmentId),
    /// A net went from one bound pin to two: a new electrical connection
    PinsConnected {
        net_id: NetId,
        first: PinReference,
        second: PinReference,
    },
}

impl BoardEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            BoardEvent::ComponentPlaced(_) => "component_placed",
            BoardEvent::ComponentRemoved(_) => "component_removed",
            BoardEvent::NetCreated(_) => "net_created",
            BoardEvent::NetRemoved(_) => "net_removed",
            BoardEvent::TraceAdded(_) => "trace_added",
            BoardEvent::TraceRemoved(_) => "trace_removed",
            BoardEvent::PinsConnected { .. } => "pins_connected",
        }
    }
}

/// Handle returned by `subscribe`, used to detach the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u32);

/// Observer of board changes
pub trait BoardListener {
    fn on_event(&mut self, board: &BoardGraph, event: &BoardEvent);
}

type Callback = Box<dyn FnMut(&BoardGraph, &BoardEvent)>;

/// Ordered set of board observers
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u32,
    entries: Vec<(ListenerId, Callback)>,
}

impl ListenerRegistry {
    pub(crate) fn subscribe(&mut self, callback: Callback) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn dispatch(&mut self, board: &BoardGraph, event: &BoardEvent) {
        for (_, callback) in self.entries.iter_mut() {
            callback(board, event);
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .finish()
    }
}
