//! Connectivity Graph
//!
//! A bipartite petgraph view of a board: one node per component, one node
//! per net, and one edge per bound pin. Built on demand from a finished
//! board and used for neighbourhood queries, path finding and island
//! detection.

use petgraph::algo::{astar, connected_components};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::board::{BoardGraph, InstanceId, NetId};

/// Node in the connectivity graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectivityNode {
    Component(InstanceId),
    Net(NetId),
}

/// Edge in the connectivity graph: a pin bound to a net
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinEdge {
    pub pin_index: usize,
    pub pin_name: String,
}

#[derive(Debug, Clone)]
pub struct ConnectivityGraph {
    graph: UnGraph<ConnectivityNode, PinEdge>,

    component_indices: HashMap<InstanceId, NodeIndex>,

    net_indices: HashMap<NetId, NodeIndex>,
}

impl ConnectivityGraph {
    pub fn from_board(board: &BoardGraph) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut component_indices = HashMap::new();
        let mut net_indices = HashMap::new();

        // Pass 1: nodes
        for component in board.components() {
            let idx = graph.add_node(ConnectivityNode::Component(component.instance_id));
            component_indices.insert(component.instance_id, idx);
        }
        for net in board.nets() {
            let idx = graph.add_node(ConnectivityNode::Net(net.net_id));
            net_indices.insert(net.net_id, idx);
        }

        // Pass 2: one edge per bound pin
        for component in board.components() {
            let comp_idx = component_indices[&component.instance_id];
            for pin in &component.pins {
                let Some(net_idx) = pin.connected_net_id.and_then(|id| net_indices.get(&id)) else {
                    continue;
                };
                graph.add_edge(
                    comp_idx,
                    *net_idx,
                    PinEdge {
                        pin_index: pin.pin_index,
                        pin_name: pin.pin_name.clone(),
                    },
                );
            }
        }

        Self {
            graph,
            component_indices,
            net_indices,
        }
    }

    /// Distinct nets a component touches, in id order
    pub fn nets_for_component(&self, instance_id: InstanceId) -> Vec<NetId> {
        let Some(&idx) = self.component_indices.get(&instance_id) else {
            return Vec::new();
        };
        self.neighbours(idx)
            .filter_map(|node| match node {
                ConnectivityNode::Net(id) => Some(id),
                ConnectivityNode::Component(_) => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct components with at least one pin on the net, in id order
    pub fn components_on_net(&self, net_id: NetId) -> Vec<InstanceId> {
        let Some(&idx) = self.net_indices.get(&net_id) else {
            return Vec::new();
        };
        self.neighbours(idx)
            .filter_map(|node| match node {
                ConnectivityNode::Component(id) => Some(id),
                ConnectivityNode::Net(_) => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Pins by which a component is bound to a net
    pub fn pins_between(&self, instance_id: InstanceId, net_id: NetId) -> Vec<&PinEdge> {
        let (Some(&comp_idx), Some(&net_idx)) = (
            self.component_indices.get(&instance_id),
            self.net_indices.get(&net_id),
        ) else {
            return Vec::new();
        };
        self.graph
            .edges_connecting(comp_idx, net_idx)
            .map(|e| e.weight())
            .collect()
    }

    /// Shortest alternating component/net path between two components
    pub fn find_path(&self, from: InstanceId, to: InstanceId) -> Option<Vec<ConnectivityNode>> {
        let from_idx = *self.component_indices.get(&from)?;
        let to_idx = *self.component_indices.get(&to)?;

        astar(&self.graph, from_idx, |n| n == to_idx, |_| 1, |_| 0).map(|(_, path)| {
            path.into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).copied())
                .collect()
        })
    }

    /// Number of electrically separate groups (unbound components and
    /// trace-only nets count as their own group)
    pub fn island_count(&self) -> usize {
        connected_components(&self.graph)
    }

    pub fn component_count(&self) -> usize {
        self.component_indices.len()
    }

    pub fn net_count(&self) -> usize {
        self.net_indices.len()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn neighbours(&self, idx: NodeIndex) -> impl Iterator<Item = ConnectivityNode> + '_ {
        self.graph
            .neighbors(idx)
            .filter_map(|n| self.graph.node_weight(n).copied())
    }
}
