// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and the node type registry.

use crate::port::{Port, PortDirection, PortId, PortSpec};
use crate::value::{Mat3, Value, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Value sources (constants, sliders, vectors)
    Input,
    /// Scalar math
    Math,
    /// Matrix construction and algebra
    Matrix,
    /// Decompositions and measurements
    Analysis,
    /// Geometric objects
    Geometry,
}

/// How the view shows a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Ports and values visible
    #[default]
    Expanded,
    /// Header only
    Collapsed,
    /// Not drawn on the canvas
    Hidden,
}

/// View metadata attached to a node. Stored and serialized, never read by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Size override
    pub size: Option<[f32; 2]>,
    /// Custom color
    pub color: Option<[u8; 3]>,
    /// Display mode
    pub display: DisplayMode,
    /// Custom title
    pub label: Option<String>,
}

impl NodeData {
    /// Data placed at a canvas position
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: [x, y],
            ..Self::default()
        }
    }
}

/// Pure recomputation of a node's outputs from its inputs
pub type ComputeFn = fn(&NodeInputs<'_>, &mut NodeOutputs);

/// Read access to a node's input values during compute.
///
/// Missing or mistyped inputs read as NaN so a compute function stays total.
pub struct NodeInputs<'a> {
    ports: &'a IndexMap<String, Port>,
}

impl<'a> NodeInputs<'a> {
    /// Raw value of an input
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.ports.get(name).map(Port::value)
    }

    /// Number input
    pub fn number(&self, name: &str) -> f64 {
        self.value(name).and_then(Value::as_number).unwrap_or(f64::NAN)
    }

    /// Vector input
    pub fn vector(&self, name: &str) -> Vec3 {
        self.value(name).and_then(Value::as_vector).unwrap_or([f64::NAN; 3])
    }

    /// Matrix input
    pub fn matrix(&self, name: &str) -> Mat3 {
        self.value(name).and_then(Value::as_matrix).unwrap_or([[f64::NAN; 3]; 3])
    }

    /// Opaque input, empty when absent
    pub fn opaque(&self, name: &str) -> &'a str {
        self.value(name).and_then(Value::as_opaque).unwrap_or_default()
    }
}

/// Values produced by one compute step
#[derive(Debug, Default)]
pub struct NodeOutputs {
    values: Vec<(&'static str, Value)>,
}

impl NodeOutputs {
    /// Set an output value
    pub fn set(&mut self, name: &'static str, value: impl Into<Value>) {
        self.values.push((name, value.into()));
    }
}

/// Node type definition
#[derive(Debug, Clone)]
pub struct NodeType {
    /// Kind discriminant, stored in snapshots
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: &'static str,
    /// Input ports
    pub inputs: Vec<PortSpec>,
    /// Output ports
    pub outputs: Vec<PortSpec>,
    /// Compute step
    pub compute: ComputeFn,
}

/// A node instance
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    kind: &'static str,
    inputs: IndexMap<String, Port>,
    outputs: IndexMap<String, Port>,
    /// View metadata
    pub data: NodeData,
    compute: ComputeFn,
}

impl Node {
    /// Create a node with fresh IDs from a type definition.
    ///
    /// Outputs hold their defaults until the node is computed.
    pub fn new(node_type: &NodeType) -> Self {
        Self::with_id(node_type, NodeId::new())
    }

    pub(crate) fn with_id(node_type: &NodeType, id: NodeId) -> Self {
        let build = |specs: &[PortSpec], direction| {
            specs
                .iter()
                .map(|spec| {
                    let port = Port::from_spec(PortId::new(), id, direction, spec);
                    (spec.name.to_string(), port)
                })
                .collect::<IndexMap<_, _>>()
        };

        Self {
            id,
            kind: node_type.id,
            inputs: build(&node_type.inputs, PortDirection::Input),
            outputs: build(&node_type.outputs, PortDirection::Output),
            data: NodeData::default(),
            compute: node_type.compute,
        }
    }

    /// Set the view metadata
    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    /// Node ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Kind discriminant
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Input ports by name
    pub fn inputs(&self) -> &IndexMap<String, Port> {
        &self.inputs
    }

    /// Output ports by name
    pub fn outputs(&self) -> &IndexMap<String, Port> {
        &self.outputs
    }

    /// Get an input port by name
    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.get(name)
    }

    /// Get an output port by name
    pub fn output(&self, name: &str) -> Option<&Port> {
        self.outputs.get(name)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports().find(|p| p.id() == port_id)
    }

    pub(crate) fn port_mut(&mut self, port_id: PortId) -> Option<&mut Port> {
        self.inputs
            .values_mut()
            .chain(self.outputs.values_mut())
            .find(|p| p.id() == port_id)
    }

    pub(crate) fn port_by_name_mut(
        &mut self,
        direction: PortDirection,
        name: &str,
    ) -> Option<&mut Port> {
        match direction {
            PortDirection::Input => self.inputs.get_mut(name),
            PortDirection::Output => self.outputs.get_mut(name),
        }
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.values().chain(self.outputs.values())
    }

    /// Recompute every output from the current inputs.
    ///
    /// Returns the written `(port, value)` pairs in output order. This only
    /// touches this node; [`Context::compute_node`](crate::Context::compute_node)
    /// also pushes the results downstream.
    pub fn compute(&mut self) -> Vec<(PortId, Value)> {
        let mut produced = NodeOutputs::default();
        (self.compute)(&NodeInputs { ports: &self.inputs }, &mut produced);

        let mut written = Vec::with_capacity(produced.values.len());
        for (name, value) in produced.values {
            let Some(port) = self.outputs.get_mut(name) else {
                tracing::warn!(kind = self.kind, port = name, "compute wrote an undeclared output");
                continue;
            };
            if !port.value_type().accepts(value.value_type()) {
                tracing::warn!(kind = self.kind, port = name, "compute wrote a mistyped output");
                continue;
            }
            port.set_value(value.clone());
            written.push((port.id(), value));
        }
        written
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Registry of available node types
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    types: IndexMap<&'static str, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in catalog
    pub fn builtin() -> Self {
        crate::catalog::create_registry()
    }

    /// Register a node type, replacing any type with the same ID
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id, node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types by category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeType> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
