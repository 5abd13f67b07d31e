// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar nodes: constants, operators and sliders.

use super::kinds;
use crate::node::{NodeCategory, NodeInputs, NodeOutputs, NodeRegistry, NodeType};
use crate::port::PortSpec;
use crate::value::Value;
use std::str::FromStr;

/// Operators of the unary operator node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `x²`
    Square,
    /// `√x`, NaN for negative `x`
    Sqrt,
    /// `x³`
    Cube,
    /// `sin x`
    Sin,
    /// `cos x`
    Cos,
    /// `tan x`
    Tan,
}

impl UnaryOperator {
    /// Every operator
    pub const ALL: [Self; 6] = [
        Self::Square,
        Self::Sqrt,
        Self::Cube,
        Self::Sin,
        Self::Cos,
        Self::Tan,
    ];

    /// Name stored in the operator port
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Sqrt => "sqrt",
            Self::Cube => "cube",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
        }
    }

    /// Apply the operator
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Square => x * x,
            Self::Sqrt => x.sqrt(),
            Self::Cube => x * x * x,
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
        }
    }
}

impl FromStr for UnaryOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|op| op.as_str() == s).ok_or(())
    }
}

impl From<UnaryOperator> for Value {
    fn from(op: UnaryOperator) -> Self {
        Value::Opaque(op.as_str().to_string())
    }
}

/// Operators of the binary operator node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `x + y`
    Add,
    /// `x - y`
    Sub,
    /// `x * y`
    Mul,
    /// `x / y`
    Div,
    /// Remainder of `x / y`, sign of `x`
    Mod,
}

impl BinaryOperator {
    /// Every operator
    pub const ALL: [Self; 5] = [Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Mod];

    /// Name stored in the operator port
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
        }
    }

    /// Apply the operator with IEEE-754 semantics
    pub fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Add => x + y,
            Self::Sub => x - y,
            Self::Mul => x * y,
            Self::Div => x / y,
            Self::Mod => x % y,
        }
    }
}

impl FromStr for BinaryOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|op| op.as_str() == s).ok_or(())
    }
}

impl From<BinaryOperator> for Value {
    fn from(op: BinaryOperator) -> Self {
        Value::Opaque(op.as_str().to_string())
    }
}

fn is_unary_operator(value: &Value) -> bool {
    value.as_opaque().is_some_and(|s| s.parse::<UnaryOperator>().is_ok())
}

fn is_binary_operator(value: &Value) -> bool {
    value.as_opaque().is_some_and(|s| s.parse::<BinaryOperator>().is_ok())
}

fn is_unit_interval(value: &Value) -> bool {
    value.as_number().is_some_and(|t| (0.0..=1.0).contains(&t))
}

fn constant(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    outputs.set("result", inputs.number("x"));
}

fn unary_operator(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let x = inputs.number("x");
    let result = inputs
        .opaque("operator")
        .parse::<UnaryOperator>()
        .map_or(f64::NAN, |op| op.apply(x));
    outputs.set("result", result);
}

fn binary_operator(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let (x, y) = (inputs.number("x"), inputs.number("y"));
    let result = inputs
        .opaque("operator")
        .parse::<BinaryOperator>()
        .map_or(f64::NAN, |op| op.apply(x, y));
    outputs.set("result", result);
}

fn slider(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let (min, max, t) = (inputs.number("min"), inputs.number("max"), inputs.number("t"));
    outputs.set("result", min + t * (max - min));
}

pub(super) fn register(registry: &mut NodeRegistry) {
    registry.register(NodeType {
        id: kinds::CONSTANT,
        name: "Constant",
        category: NodeCategory::Input,
        description: "Constant number",
        inputs: vec![PortSpec::number("x")],
        outputs: vec![PortSpec::number("result")],
        compute: constant,
    });

    registry.register(NodeType {
        id: kinds::UNARY_OPERATOR,
        name: "Unary Operator",
        category: NodeCategory::Math,
        description: "square, sqrt, cube, sin, cos or tan of a number",
        inputs: vec![
            PortSpec::number("x"),
            PortSpec::opaque("operator")
                .with_default(UnaryOperator::Square)
                .with_validator(is_unary_operator),
        ],
        outputs: vec![PortSpec::number("result")],
        compute: unary_operator,
    });

    registry.register(NodeType {
        id: kinds::BINARY_OPERATOR,
        name: "Binary Operator",
        category: NodeCategory::Math,
        description: "add, sub, mul, div or mod of two numbers",
        inputs: vec![
            PortSpec::number("x"),
            PortSpec::number("y"),
            PortSpec::opaque("operator")
                .with_default(BinaryOperator::Add)
                .with_validator(is_binary_operator),
        ],
        outputs: vec![PortSpec::number("result")],
        compute: binary_operator,
    });

    registry.register(NodeType {
        id: kinds::SLIDER,
        name: "Slider",
        category: NodeCategory::Input,
        description: "Number between min and max at position t",
        inputs: vec![
            PortSpec::number("min"),
            PortSpec::number("max").with_default(1.0),
            PortSpec::number("t").with_validator(is_unit_interval),
        ],
        outputs: vec![PortSpec::number("result")],
        compute: slider,
    });
}
