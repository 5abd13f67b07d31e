// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::node::NodeId;
use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Predicate a value must satisfy before it may feed an input
pub type Validator = fn(&Value) -> bool;

/// Declaration of a port on a node type
#[derive(Debug, Clone)]
pub struct PortSpec {
    /// Port name, unique per direction on a node
    pub name: &'static str,
    /// Data type
    pub value_type: ValueType,
    /// Value the port holds when nothing drives it
    pub default_value: Value,
    /// Optional value check
    pub validator: Option<Validator>,
}

impl PortSpec {
    /// Port defaulting to the zero value of its type
    pub fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            default_value: value_type.default_value(),
            validator: None,
        }
    }

    /// Number port
    pub fn number(name: &'static str) -> Self {
        Self::new(name, ValueType::Number)
    }

    /// Vector port
    pub fn vector(name: &'static str) -> Self {
        Self::new(name, ValueType::Vector3)
    }

    /// Matrix port
    pub fn matrix(name: &'static str) -> Self {
        Self::new(name, ValueType::Matrix3)
    }

    /// Opaque port
    pub fn opaque(name: &'static str) -> Self {
        Self::new(name, ValueType::Opaque)
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    /// Attach a validator
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// A port on a node
#[derive(Clone)]
pub struct Port {
    id: PortId,
    node: NodeId,
    name: String,
    direction: PortDirection,
    value_type: ValueType,
    value: Value,
    default_value: Value,
    validator: Option<Validator>,
}

impl Port {
    /// Instantiate a port from its spec
    pub(crate) fn from_spec(
        id: PortId,
        node: NodeId,
        direction: PortDirection,
        spec: &PortSpec,
    ) -> Self {
        Self {
            id,
            node,
            name: spec.name.to_string(),
            direction,
            value_type: spec.value_type,
            value: spec.default_value.clone(),
            default_value: spec.default_value.clone(),
            validator: spec.validator,
        }
    }

    /// Port ID
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Owning node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Port name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Port direction
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Data type
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Current value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Value restored when the port is disconnected
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Whether this port carries a validator
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Check a value against the validator; true when there is none
    pub fn validate(&self, value: &Value) -> bool {
        self.validator.map_or(true, |check| check(value))
    }

    /// Check the type tag and validator for a value about to be written
    pub fn accepts(&self, value: &Value) -> bool {
        self.value_type.accepts(value.value_type()) && self.validate(value)
    }

    pub(crate) fn set_id(&mut self, id: PortId) {
        self.id = id;
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub(crate) fn set_default_value(&mut self, value: Value) {
        self.default_value = value;
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("value_type", &self.value_type)
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_negative(value: &Value) -> bool {
        value.as_number().is_some_and(|x| x >= 0.0)
    }

    #[test]
    fn test_spec_defaults() {
        let spec = PortSpec::vector("origin");
        assert_eq!(spec.default_value, Value::Vector3([0.0; 3]));

        let spec = PortSpec::number("x").with_default(5.0);
        assert_eq!(spec.default_value, Value::Number(5.0));
    }

    #[test]
    fn test_port_from_spec() {
        let spec = PortSpec::number("x").with_default(2.0);
        let port = Port::from_spec(PortId::new(), NodeId::new(), PortDirection::Input, &spec);
        assert_eq!(port.name(), "x");
        assert_eq!(port.value(), &Value::Number(2.0));
        assert_eq!(port.default_value(), &Value::Number(2.0));
        assert!(!port.has_validator());
    }

    #[test]
    fn test_validator() {
        let spec = PortSpec::number("t").with_validator(non_negative);
        let port = Port::from_spec(PortId::new(), NodeId::new(), PortDirection::Input, &spec);
        assert!(port.validate(&Value::Number(1.0)));
        assert!(!port.validate(&Value::Number(-1.0)));
        assert!(!port.accepts(&Value::Vector3([0.0; 3])));
    }
}
