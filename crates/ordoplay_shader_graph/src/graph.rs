// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::{Connection, ConnectionId};
use crate::kind::NodeKind;
use crate::node::{Node, NodeId};
use crate::port::{PortDirection, PortId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A shader graph.
///
/// Built by the authoring tool and handed to the compiler, which only reads
/// it. Every input port has at most one incoming connection; the compiler
/// pulls values by asking [`Graph::find_edge`] for the driver of an input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Input port -> driving connection
    #[serde(skip)]
    drivers: HashMap<PortId, ConnectionId>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            drivers: HashMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.reindex();
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes whose kind matches `predicate`
    pub fn find_nodes<'a>(
        &'a self,
        predicate: impl Fn(&NodeKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| predicate(&n.kind))
    }

    /// Add a connection between ports
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        let source_node = self
            .nodes
            .get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self
            .nodes
            .get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        let source_port = source_node
            .port(&from_port)
            .ok_or(ConnectionError::PortNotFound(from_port))?;
        let target_port = target_node
            .port(&to_port)
            .ok_or(ConnectionError::PortNotFound(to_port))?;

        if !source_port.can_connect(target_port) {
            return Err(ConnectionError::IncompatiblePorts);
        }

        if self.drivers.contains_key(&to_port) {
            return Err(ConnectionError::PortAlreadyConnected(to_port));
        }

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        let connection = Connection::new(from_node, from_port, to_node, to_port);
        let id = connection.id;
        self.drivers.insert(to_port, id);
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Connect two ports looked up by name
    pub fn connect_by_name(
        &mut self,
        from_node: NodeId,
        from_port: &str,
        to_node: NodeId,
        to_port: &str,
    ) -> Result<ConnectionId, ConnectionError> {
        let from = self
            .output_port(from_node, from_port)
            .ok_or_else(|| ConnectionError::PortNameNotFound(from_node, from_port.to_string()))?;
        let to = self
            .input_port(to_node, to_port)
            .ok_or_else(|| ConnectionError::PortNameNotFound(to_node, to_port.to_string()))?;
        self.connect(from_node, from, to_node, to)
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(&connection_id)?;
        self.drivers.remove(&connection.to_port);
        Some(connection)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The connection driving an input port, if any
    pub fn find_edge(&self, input: PortId) -> Option<&Connection> {
        self.drivers
            .get(&input)
            .and_then(|id| self.connections.get(id))
    }

    /// Connections leaving an output port
    pub fn edges_from(&self, output: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_port == output)
    }

    /// Input port of a node by name
    pub fn input_port(&self, node_id: NodeId, name: &str) -> Option<PortId> {
        self.nodes.get(&node_id)?.input(name).map(|p| p.id)
    }

    /// Output port of a node by name
    pub fn output_port(&self, node_id: NodeId, name: &str) -> Option<PortId> {
        self.nodes.get(&node_id)?.output(name).map(|p| p.id)
    }

    /// Check that every connection joins existing ports in the right
    /// direction and that no cycle exists outside loop nodes.
    ///
    /// Loop nodes feed their counter back into their own body, so edges
    /// leaving a loop node are not followed.
    pub fn validate(&self) -> Result<(), GraphError> {
        for connection in self.connections.values() {
            let from = self
                .nodes
                .get(&connection.from_node)
                .and_then(|n| n.port(&connection.from_port));
            let to = self
                .nodes
                .get(&connection.to_node)
                .and_then(|n| n.port(&connection.to_port));
            match (from, to) {
                (Some(from), Some(to))
                    if from.direction == PortDirection::Output
                        && to.direction == PortDirection::Input => {}
                _ => return Err(GraphError::DanglingConnection(connection.id)),
            }
        }

        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        for node_id in self.nodes.keys() {
            self.visit(*node_id, &mut visited, &mut temp_mark)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
    ) -> Result<(), CycleError> {
        if visited.contains(&node_id) {
            return Ok(());
        }
        if !temp_mark.insert(node_id) {
            return Err(CycleError { node: node_id });
        }

        for connection in self.connections.values().filter(|c| c.to_node == node_id) {
            let is_loop = self
                .nodes
                .get(&connection.from_node)
                .is_some_and(|n| n.kind.is_loop());
            if !is_loop {
                self.visit(connection.from_node, visited, temp_mark)?;
            }
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        Ok(())
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, GraphIoError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Deserialize from RON and rebuild the driver index
    pub fn from_ron(source: &str) -> Result<Self, GraphIoError> {
        let mut graph: Self = ron::from_str(source)?;
        graph.reindex();
        Ok(graph)
    }

    fn reindex(&mut self) {
        self.drivers = self
            .connections
            .values()
            .map(|c| (c.to_port, c.id))
            .collect();
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Named port not found on a node
    #[error("Node {0:?} has no port named '{1}'")]
    PortNameNotFound(NodeId, String),

    /// Source is not an output or target is not an input
    #[error("Incompatible port directions")]
    IncompatiblePorts,

    /// Port is already connected
    #[error("Port already connected: {0:?}")]
    PortAlreadyConnected(PortId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}

/// Error when graph contains a cycle
#[derive(Debug, thiserror::Error)]
#[error("Graph contains a cycle through node {node:?}")]
pub struct CycleError {
    /// A node on the cycle
    pub node: NodeId,
}

/// Structural problem found by [`Graph::validate`]
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Connection references a missing node or port, or joins the wrong directions
    #[error("Connection {0:?} does not join an output to an input")]
    DanglingConnection(ConnectionId),

    /// Dependency cycle outside of loop nodes
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// Error reading or writing a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphIoError {
    /// RON encoding failed
    #[error("Failed to encode graph: {0}")]
    Encode(#[from] ron::Error),

    /// RON decoding failed
    #[error("Failed to decode graph: {0}")]
    Decode(#[from] ron::error::SpannedError),
}
