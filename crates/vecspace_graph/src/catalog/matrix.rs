// SPDX-License-Identifier: MIT OR Apache-2.0
//! Matrix construction and algebra nodes.

use super::kinds;
use super::vector::{from_na, to_na};
use crate::node::{NodeCategory, NodeInputs, NodeOutputs, NodeRegistry, NodeType};
use crate::port::PortSpec;
use crate::value::{Mat3, IDENTITY};
use nalgebra::Matrix3;

pub(super) fn mat_to_na(m: Mat3) -> Matrix3<f64> {
    Matrix3::from_fn(|row, col| m[row][col])
}

pub(super) fn mat_from_na(m: Matrix3<f64>) -> Mat3 {
    std::array::from_fn(|row| std::array::from_fn(|col| m[(row, col)]))
}

fn matrix(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    outputs.set("result", [inputs.vector("m1"), inputs.vector("m2"), inputs.vector("m3")]);
}

fn transform(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let product = mat_to_na(inputs.matrix("matrix")) * to_na(inputs.vector("vector"));
    outputs.set("result", from_na(product));
}

fn transpose(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    outputs.set("result", mat_from_na(mat_to_na(inputs.matrix("matrix")).transpose()));
}

fn matrix_multiplication(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let product = mat_to_na(inputs.matrix("m1")) * mat_to_na(inputs.matrix("m2"));
    outputs.set("result", mat_from_na(product));
}

pub(super) fn register(registry: &mut NodeRegistry) {
    registry.register(NodeType {
        id: kinds::MATRIX,
        name: "Matrix",
        category: NodeCategory::Matrix,
        description: "3x3 matrix from three row vectors",
        inputs: vec![
            PortSpec::vector("m1").with_default(IDENTITY[0]),
            PortSpec::vector("m2").with_default(IDENTITY[1]),
            PortSpec::vector("m3").with_default(IDENTITY[2]),
        ],
        outputs: vec![PortSpec::matrix("result").with_default(IDENTITY)],
        compute: matrix,
    });

    registry.register(NodeType {
        id: kinds::TRANSFORM,
        name: "Transform",
        category: NodeCategory::Matrix,
        description: "Matrix applied to a vector",
        inputs: vec![PortSpec::matrix("matrix").with_default(IDENTITY), PortSpec::vector("vector")],
        outputs: vec![PortSpec::vector("result")],
        compute: transform,
    });

    registry.register(NodeType {
        id: kinds::TRANSPOSE,
        name: "Transpose",
        category: NodeCategory::Matrix,
        description: "Matrix transpose",
        inputs: vec![PortSpec::matrix("matrix").with_default(IDENTITY)],
        outputs: vec![PortSpec::matrix("result").with_default(IDENTITY)],
        compute: transpose,
    });

    registry.register(NodeType {
        id: kinds::MATRIX_MULTIPLICATION,
        name: "Matrix Multiplication",
        category: NodeCategory::Matrix,
        description: "Product m1 * m2",
        inputs: vec![
            PortSpec::matrix("m1").with_default(IDENTITY),
            PortSpec::matrix("m2").with_default(IDENTITY),
        ],
        outputs: vec![PortSpec::matrix("result").with_default(IDENTITY)],
        compute: matrix_multiplication,
    });
}
