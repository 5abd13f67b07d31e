// SPDX-License-Identifier: MIT OR Apache-2.0
//! Restartable text snapshots of a context.
//!
//! A snapshot is plain data decoded by serde; rebuilding a context looks up
//! each node's kind in a [`NodeRegistry`] and re-links connections by port ID.
//! Nodes are always rebuilt before any connection.

use crate::connection::ConnectionId;
use crate::context::{Context, ContextId};
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeData, NodeId, NodeRegistry};
use crate::port::{Port, PortDirection, PortId};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// A whole graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Context ID
    pub id: ContextId,
    /// Node records
    pub nodes: Vec<NodeRecord>,
    /// Connection records
    pub connections: Vec<ConnectionRecord>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// One node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node ID
    pub id: NodeId,
    /// Kind discriminant
    pub kind: String,
    /// Input ports by name
    pub input_ports: IndexMap<String, PortRecord>,
    /// Output ports by name
    pub output_ports: IndexMap<String, PortRecord>,
    /// View metadata
    #[serde(default)]
    pub data: NodeData,
}

/// One port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    /// Port ID
    pub id: PortId,
    /// Value at save time
    pub value: Value,
    /// Value restored on disconnect
    pub default_value: Value,
}

/// One connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    /// Connection ID
    pub id: ConnectionId,
    /// Source output port
    pub from_port_id: PortId,
    /// Target input port
    pub to_port_id: PortId,
}

impl PortRecord {
    fn of(port: &Port) -> Self {
        Self {
            id: port.id(),
            value: port.value().clone(),
            default_value: port.default_value().clone(),
        }
    }
}

impl NodeRecord {
    /// Record of a node's current state
    pub fn of(node: &Node) -> Self {
        let ports = |ports: &IndexMap<String, Port>| {
            ports
                .iter()
                .map(|(name, port)| (name.clone(), PortRecord::of(port)))
                .collect()
        };
        Self {
            id: node.id(),
            kind: node.kind().to_string(),
            input_ports: ports(node.inputs()),
            output_ports: ports(node.outputs()),
            data: node.data.clone(),
        }
    }
}

impl Context {
    /// Capture the graph as plain data
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            version: SNAPSHOT_VERSION,
            id: self.id(),
            nodes: self.nodes().map(NodeRecord::of).collect(),
            connections: self
                .connections()
                .map(|c| ConnectionRecord {
                    id: c.id,
                    from_port_id: c.from_port,
                    to_port_id: c.to_port,
                })
                .collect(),
        }
    }

    /// Serialize to the default text format (pretty RON)
    pub fn serialize(&self) -> Result<String> {
        self.to_ron()
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(false)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(&self.snapshot(), config)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Rebuild a context from RON text using the built-in catalog
    pub fn from_ron(text: &str) -> Result<Self> {
        let snapshot: ContextSnapshot = ron::from_str(text)?;
        Self::load(snapshot)
    }

    /// Rebuild a context from JSON text using the built-in catalog
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: ContextSnapshot = serde_json::from_str(text)?;
        Self::load(snapshot)
    }

    /// Rebuild a context using the built-in catalog
    pub fn load(snapshot: ContextSnapshot) -> Result<Self> {
        Self::load_with_registry(snapshot, Arc::new(NodeRegistry::builtin()))
    }

    /// Rebuild a context.
    ///
    /// Either the whole snapshot loads or an error is returned; a partially
    /// built context is never handed out.
    pub fn load_with_registry(
        snapshot: ContextSnapshot,
        registry: Arc<NodeRegistry>,
    ) -> Result<Self> {
        rebuild(snapshot, registry).inspect_err(|err| {
            tracing::warn!(error = %err, "snapshot rejected");
        })
    }
}

fn malformed(message: impl Into<String>) -> GraphError {
    GraphError::MalformedSnapshot(message.into())
}

fn rebuild(snapshot: ContextSnapshot, registry: Arc<NodeRegistry>) -> Result<Context> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(malformed(format!(
            "snapshot version {} is newer than supported version {}",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }

    let mut context = Context::with_id(snapshot.id, Arc::clone(&registry));
    let mut node_ids = HashSet::new();
    let mut port_ids = HashSet::new();

    for record in snapshot.nodes {
        if !node_ids.insert(record.id) {
            return Err(malformed(format!("duplicate node id {}", record.id)));
        }
        let node_type = registry
            .get(&record.kind)
            .ok_or_else(|| malformed(format!("unknown node kind {:?}", record.kind)))?;

        let mut node = Node::with_id(node_type, record.id).with_data(record.data);
        for (direction, ports) in [
            (PortDirection::Input, record.input_ports),
            (PortDirection::Output, record.output_ports),
        ] {
            for (name, saved) in ports {
                if !port_ids.insert(saved.id) {
                    return Err(malformed(format!("duplicate port id {}", saved.id)));
                }
                restore_port(&mut node, direction, &name, saved)?;
            }
        }
        // Ports the record does not mention keep their fresh IDs and defaults
        context
            .add_node(node)
            .map_err(|err| malformed(format!("node {}: {err}", record.id)))?;
    }

    let mut connection_ids = HashSet::new();
    for record in snapshot.connections {
        if !connection_ids.insert(record.id) {
            return Err(malformed(format!("duplicate connection id {}", record.id)));
        }
        context
            .create_connection_with_id(record.id, record.from_port_id, record.to_port_id)
            .map_err(|err| malformed(format!("connection {}: {err}", record.id)))?;
    }

    tracing::debug!(
        context = %context.id(),
        nodes = context.node_count(),
        connections = context.connection_count(),
        "snapshot loaded"
    );
    Ok(context)
}

fn restore_port(
    node: &mut Node,
    direction: PortDirection,
    name: &str,
    saved: PortRecord,
) -> Result<()> {
    let kind = node.kind();
    let port = node
        .port_by_name_mut(direction, name)
        .ok_or_else(|| malformed(format!("{kind} has no {direction:?} port {name:?}")))?;
    for value in [&saved.value, &saved.default_value] {
        if !port.value_type().accepts(value.value_type()) {
            return Err(malformed(format!(
                "{kind}.{name} holds {} but expects {}",
                value.value_type(),
                port.value_type()
            )));
        }
        if !port.validate(value) {
            return Err(malformed(format!("{kind}.{name} rejects {value}")));
        }
    }
    port.set_id(saved.id);
    port.set_default_value(saved.default_value);
    port.set_value(saved.value);
    Ok(())
}
