// SPDX-License-Identifier: MIT OR Apache-2.0
//! The context: one graph document holding nodes and connections.
//!
//! All mutation goes through the context so that every write follows the same
//! path: store the value, notify subscribers, then either recompute the owning
//! node (input writes) or push the value into every connected input (output
//! writes). Propagation is depth-first and synchronous; a node reachable
//! through several changed paths is simply recomputed several times.

use crate::connection::{Connection, ConnectionId};
use crate::error::{ConnectionRejection, GraphError, Result};
use crate::events::{EventBus, GraphEvent, SubscriptionId, SubscriptionTarget};
use crate::node::{Node, NodeData, NodeId, NodeRegistry};
use crate::port::{Port, PortDirection, PortId};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub Uuid);

impl ContextId {
    /// Create a new random context ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A reactive node graph
pub struct Context {
    id: ContextId,
    registry: Arc<NodeRegistry>,
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
    port_owners: HashMap<PortId, NodeId>,
    events: EventBus,
}

impl Context {
    /// Create an empty context using the built-in node catalog
    pub fn new() -> Self {
        Self::with_registry(Arc::new(NodeRegistry::builtin()))
    }

    /// Create an empty context using a custom registry
    pub fn with_registry(registry: Arc<NodeRegistry>) -> Self {
        Self::with_id(ContextId::new(), registry)
    }

    pub(crate) fn with_id(id: ContextId, registry: Arc<NodeRegistry>) -> Self {
        Self {
            id,
            registry,
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            port_owners: HashMap::new(),
            events: EventBus::default(),
        }
    }

    /// Context ID
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Node types this context can instantiate
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Instantiate a node of a registered kind and compute it once
    pub fn create_node(&mut self, kind: &str) -> Result<NodeId> {
        self.create_node_with_data(kind, NodeData::default())
    }

    /// Instantiate a node with view metadata
    pub fn create_node_with_data(&mut self, kind: &str, data: NodeData) -> Result<NodeId> {
        let node_type = self
            .registry
            .get(kind)
            .ok_or_else(|| GraphError::UnknownNodeKind(kind.to_string()))?;
        let node = Node::new(node_type).with_data(data);
        self.add_node(node)
    }

    /// Register a node and run its first compute.
    ///
    /// Fails without touching the context when the node's ID, or the ID of
    /// any of its ports, is already in use.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let mut seen = HashSet::new();
        for port in node.ports() {
            if self.port_owners.contains_key(&port.id()) || !seen.insert(port.id()) {
                return Err(GraphError::DuplicatePort(port.id()));
            }
        }
        for port in node.ports() {
            self.port_owners.insert(port.id(), id);
        }
        tracing::debug!(node = %id, kind = node.kind(), "node added");
        self.nodes.insert(id, node);
        self.events.emit(&GraphEvent::NodeAdded(id));
        self.recompute(id);
        Ok(id)
    }

    /// Remove a node and destroy every connection touching its ports.
    ///
    /// Inputs that were fed by the node fall back to their defaults, and the
    /// reset cascades downstream.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node> {
        let node = self
            .nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let ports: Vec<PortId> = node.ports().map(Port::id).collect();
        for port in &ports {
            self.port_owners.remove(port);
        }
        tracing::debug!(node = %node_id, kind = node.kind(), "node removed");
        self.events.emit(&GraphEvent::NodeRemoved(node_id));
        self.events.forget_node(node_id, &ports);

        let touching: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.involves_node(node_id))
            .map(|c| c.id)
            .collect();
        for connection_id in touching {
            self.destroy_connection(connection_id)?;
        }
        Ok(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Replace a node's view metadata
    pub fn set_node_data(&mut self, node_id: NodeId, data: NodeData) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.data = data;
        Ok(())
    }

    /// Recompute a node and push its outputs downstream
    pub fn compute_node(&mut self, node_id: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }
        self.recompute(node_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ports
    // ------------------------------------------------------------------

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        let node_id = self.port_owners.get(&port_id)?;
        self.nodes.get(node_id)?.port(port_id)
    }

    /// ID of a named input port
    pub fn input(&self, node_id: NodeId, name: &str) -> Result<PortId> {
        self.named_port(node_id, PortDirection::Input, name)
    }

    /// ID of a named output port
    pub fn output(&self, node_id: NodeId, name: &str) -> Result<PortId> {
        self.named_port(node_id, PortDirection::Output, name)
    }

    fn named_port(&self, node_id: NodeId, direction: PortDirection, name: &str) -> Result<PortId> {
        let node = self.node(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        let port = match direction {
            PortDirection::Input => node.input(name),
            PortDirection::Output => node.output(name),
        };
        port.map(Port::id).ok_or_else(|| GraphError::PortNameNotFound {
            node: node_id,
            name: name.to_string(),
        })
    }

    /// Current value of a port
    pub fn value(&self, port_id: PortId) -> Option<&Value> {
        self.port(port_id).map(Port::value)
    }

    /// Current value of a named output
    pub fn output_value(&self, node_id: NodeId, name: &str) -> Option<&Value> {
        self.node(node_id)?.output(name).map(Port::value)
    }

    /// Current value of a named input
    pub fn input_value(&self, node_id: NodeId, name: &str) -> Option<&Value> {
        self.node(node_id)?.input(name).map(Port::value)
    }

    /// Write an unconnected input and cascade the change
    pub fn set_input(&mut self, port_id: PortId, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let port = self.port(port_id).ok_or(GraphError::PortNotFound(port_id))?;
        if port.direction() != PortDirection::Input {
            return Err(GraphError::OutputNotWritable(port_id));
        }
        if !port.value_type().accepts(value.value_type()) {
            return Err(GraphError::TypeMismatch {
                expected: port.value_type(),
                found: value.value_type(),
            });
        }
        if !port.validate(&value) {
            return Err(GraphError::InvalidValue(port_id));
        }
        if self.incoming(port_id).is_some() {
            return Err(GraphError::PortConnected(port_id));
        }
        let node_id = port.node();
        self.assign_input(node_id, port_id, value);
        Ok(())
    }

    /// Write a named input of a node
    pub fn set_input_value(
        &mut self,
        node_id: NodeId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let port_id = self.input(node_id, name)?;
        self.set_input(port_id, value)
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Connect an output to an input.
    ///
    /// On success the input immediately takes the output's value and mirrors
    /// it from then on. On failure nothing changes.
    pub fn create_connection(&mut self, from: PortId, to: PortId) -> Result<ConnectionId> {
        self.create_connection_with_id(ConnectionId::new(), from, to)
    }

    pub(crate) fn create_connection_with_id(
        &mut self,
        id: ConnectionId,
        from: PortId,
        to: PortId,
    ) -> Result<ConnectionId> {
        let source = self.port(from).ok_or(GraphError::PortNotFound(from))?;
        let target = self.port(to).ok_or(GraphError::PortNotFound(to))?;

        if source.direction() != PortDirection::Output
            || target.direction() != PortDirection::Input
        {
            return Err(ConnectionRejection::DirectionMismatch.into());
        }
        let (from_node, to_node) = (source.node(), target.node());
        if from_node == to_node {
            return Err(ConnectionRejection::SelfLoop.into());
        }
        if self.incoming(to).is_some() {
            return Err(ConnectionRejection::InputOccupied.into());
        }
        if !target.value_type().accepts(source.value_type()) {
            return Err(ConnectionRejection::TypeMismatch.into());
        }
        if !target.validate(source.value()) {
            return Err(ConnectionRejection::ValidatorRejected.into());
        }
        if self.reaches(to_node, from_node) {
            return Err(GraphError::CyclicConnection {
                from: from_node,
                to: to_node,
            });
        }

        let value = source.value().clone();
        let connection = Connection::with_id(id, from_node, from, to_node, to);
        tracing::debug!(connection = %id, from = %from_node, to = %to_node, "connection added");
        self.connections.insert(id, connection);
        self.events.emit(&GraphEvent::ConnectionAdded(id));
        self.assign_input(to_node, to, value);
        Ok(id)
    }

    /// Destroy a connection, resetting its input to the default value
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> Result<Connection> {
        self.destroy_connection(connection_id)
    }

    fn destroy_connection(&mut self, connection_id: ConnectionId) -> Result<Connection> {
        let connection = self
            .connections
            .shift_remove(&connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))?;
        tracing::debug!(connection = %connection_id, "connection removed");
        self.events.emit(&GraphEvent::ConnectionRemoved(connection_id));

        // The target may already be gone when its own node is being removed
        let reset = self
            .port(connection.to_port)
            .map(|port| port.default_value().clone());
        if let Some(default) = reset {
            self.assign_input(connection.to_node, connection.to_port, default);
        }
        Ok(connection)
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

    /// Get connections from a specific port
    pub fn connections_from(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_port == port_id)
    }

    /// The connection feeding an input, if any
    pub fn incoming(&self, port_id: PortId) -> Option<&Connection> {
        self.connections.values().find(|c| c.to_port == port_id)
    }

    /// Connections involving a port, in either direction
    pub fn port_connections(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_port(port_id))
    }

    /// Whether any connection involves a port
    pub fn is_connected(&self, port_id: PortId) -> bool {
        self.port_connections(port_id).next().is_some()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Re-run the target validator against the current source value.
    ///
    /// A connection can become invalid after creation when its source value
    /// changes; it is flagged here, never removed automatically.
    pub fn connection_is_valid(&self, connection_id: ConnectionId) -> Result<bool> {
        let connection = self
            .connection(connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))?;
        let source = self
            .port(connection.from_port)
            .ok_or(GraphError::PortNotFound(connection.from_port))?;
        let target = self
            .port(connection.to_port)
            .ok_or(GraphError::PortNotFound(connection.to_port))?;
        Ok(target.validate(source.value()))
    }

    /// Get nodes in dependency order, producers first
    pub fn topological_order(&self) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());
        for node_id in self.nodes.keys() {
            self.visit(*node_id, &mut visited, &mut order);
        }
        order
    }

    fn visit(&self, node_id: NodeId, visited: &mut HashSet<NodeId>, order: &mut Vec<NodeId>) {
        if !visited.insert(node_id) {
            return;
        }
        // Producers first
        for connection in self.connections_for_node(node_id) {
            if connection.to_node == node_id {
                self.visit(connection.from_node, visited, order);
            }
        }
        order.push(node_id);
    }

    /// Whether `goal` is reachable from `start` following connections forward
    fn reaches(&self, start: NodeId, goal: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            if current == goal {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            queue.extend(
                self.connections
                    .values()
                    .filter(|c| c.from_node == current)
                    .map(|c| c.to_node),
            );
        }
        false
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a callback for changes to the whole graph, a node, or a port
    pub fn subscribe(
        &mut self,
        target: SubscriptionTarget,
        callback: impl FnMut(&GraphEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(target, callback)
    }

    /// Remove a subscription; false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.events.len()
    }

    // ------------------------------------------------------------------
    // Propagation
    // ------------------------------------------------------------------

    fn assign_input(&mut self, node_id: NodeId, port_id: PortId, value: Value) {
        let Some(port) = self
            .nodes
            .get_mut(&node_id)
            .and_then(|node| node.port_mut(port_id))
        else {
            return;
        };
        port.set_value(value.clone());
        self.events.emit(&GraphEvent::ValueChanged {
            node: node_id,
            port: port_id,
            direction: PortDirection::Input,
            value,
        });
        self.recompute(node_id);
    }

    fn recompute(&mut self, node_id: NodeId) {
        let Some(node) = self.nodes.get_mut(&node_id) else {
            return;
        };
        let written = node.compute();
        tracing::trace!(node = %node_id, kind = node.kind(), outputs = written.len(), "recomputed");

        for (port_id, value) in written {
            self.events.emit(&GraphEvent::ValueChanged {
                node: node_id,
                port: port_id,
                direction: PortDirection::Output,
                value: value.clone(),
            });
            let targets: Vec<(NodeId, PortId)> = self
                .connections_from(port_id)
                .map(|c| (c.to_node, c.to_port))
                .collect();
            for (target_node, target_port) in targets {
                self.assign_input(target_node, target_port, value.clone());
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("nodes", &self.nodes)
            .field("connections", &self.connections)
            .field("subscriptions", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl Port {
    /// Connections referencing this port
    pub fn connections<'a>(&self, context: &'a Context) -> Vec<&'a Connection> {
        context.port_connections(self.id()).collect()
    }

    /// Whether any connection references this port
    pub fn is_connected(&self, context: &Context) -> bool {
        context.is_connected(self.id())
    }
}
