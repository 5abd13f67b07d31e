// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector nodes.

use super::kinds;
use crate::node::{NodeCategory, NodeInputs, NodeOutputs, NodeRegistry, NodeType};
use crate::port::PortSpec;
use crate::value::Vec3;
use nalgebra::Vector3;

pub(super) fn to_na(v: Vec3) -> Vector3<f64> {
    Vector3::from(v)
}

pub(super) fn from_na(v: Vector3<f64>) -> Vec3 {
    v.into()
}

fn vector(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    outputs.set("result", [inputs.number("x"), inputs.number("y"), inputs.number("z")]);
    outputs.set("origin", inputs.vector("origin"));
}

fn norm(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    outputs.set("result", to_na(inputs.vector("vector")).norm());
}

fn vector_scaling(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let scaled = to_na(inputs.vector("vector")) * inputs.number("scalar");
    outputs.set("result", from_na(scaled));
}

fn plane(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    // Parallel spanning vectors give a zero cross product and a NaN normal
    let normal = to_na(inputs.vector("v1")).cross(&to_na(inputs.vector("v2"))).normalize();
    outputs.set("normal", from_na(normal));
    outputs.set("offset", normal.dot(&to_na(inputs.vector("point"))));
}

pub(super) fn register(registry: &mut NodeRegistry) {
    registry.register(NodeType {
        id: kinds::VECTOR,
        name: "Vector",
        category: NodeCategory::Input,
        description: "3D vector from its components; origin is where the view anchors it",
        inputs: vec![
            PortSpec::number("x"),
            PortSpec::number("y"),
            PortSpec::number("z"),
            PortSpec::vector("origin"),
        ],
        outputs: vec![PortSpec::vector("result"), PortSpec::vector("origin")],
        compute: vector,
    });

    registry.register(NodeType {
        id: kinds::NORM,
        name: "Norm",
        category: NodeCategory::Analysis,
        description: "Euclidean length of a vector",
        inputs: vec![PortSpec::vector("vector")],
        outputs: vec![PortSpec::number("result")],
        compute: norm,
    });

    registry.register(NodeType {
        id: kinds::VECTOR_SCALING,
        name: "Vector Scaling",
        category: NodeCategory::Math,
        description: "Vector multiplied by a scalar",
        inputs: vec![PortSpec::vector("vector"), PortSpec::number("scalar").with_default(1.0)],
        outputs: vec![PortSpec::vector("result")],
        compute: vector_scaling,
    });

    registry.register(NodeType {
        id: kinds::PLANE,
        name: "Plane",
        category: NodeCategory::Geometry,
        description: "Plane spanned by two vectors through a point",
        inputs: vec![
            PortSpec::vector("v1").with_default([1.0, 0.0, 0.0]),
            PortSpec::vector("v2").with_default([0.0, 1.0, 0.0]),
            PortSpec::vector("point"),
        ],
        outputs: vec![PortSpec::vector("normal"), PortSpec::number("offset")],
        compute: plane,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::{out, run};
    use crate::value::Value;

    #[test]
    fn test_vector() {
        let node = run(
            kinds::VECTOR,
            &[
                ("x", Value::Number(1.0)),
                ("y", Value::Number(2.0)),
                ("z", Value::Number(3.0)),
                ("origin", Value::Vector3([1.0, 1.0, 1.0])),
            ],
        );
        assert_eq!(out(&node, "result"), Value::Vector3([1.0, 2.0, 3.0]));
        assert_eq!(out(&node, "origin"), Value::Vector3([1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_norm() {
        let node = run(kinds::NORM, &[("vector", Value::Vector3([3.0, 4.0, 12.0]))]);
        assert_eq!(out(&node, "result"), Value::Number(13.0));
    }

    #[test]
    fn test_vector_scaling() {
        let node = run(
            kinds::VECTOR_SCALING,
            &[("vector", Value::Vector3([1.0, -2.0, 0.5])), ("scalar", Value::Number(4.0))],
        );
        assert_eq!(out(&node, "result"), Value::Vector3([4.0, -8.0, 2.0]));
    }

    #[test]
    fn test_plane_defaults_to_xy() {
        let node = run(kinds::PLANE, &[("point", Value::Vector3([5.0, 5.0, 2.0]))]);
        assert_eq!(out(&node, "normal"), Value::Vector3([0.0, 0.0, 1.0]));
        assert_eq!(out(&node, "offset"), Value::Number(2.0));
    }

    #[test]
    fn test_parallel_plane_is_nan() {
        let node = run(
            kinds::PLANE,
            &[("v1", Value::Vector3([1.0, 0.0, 0.0])), ("v2", Value::Vector3([2.0, 0.0, 0.0]))],
        );
        let normal = out(&node, "normal").as_vector().unwrap();
        assert!(normal.iter().all(|c| c.is_nan()));
    }
}
