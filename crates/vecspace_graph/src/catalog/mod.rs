// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in node kinds.
//!
//! Every kind is a pure function of its inputs. Numeric domain problems
//! (division by zero, square roots of negatives, non-finite matrices) come out
//! as NaN or infinity, never as errors.

mod eigen;
mod matrix;
mod scalar;
mod vector;

pub use scalar::{BinaryOperator, UnaryOperator};

use crate::node::NodeRegistry;

/// Kind discriminants of the built-in catalog
pub mod kinds {
    /// `result = x`
    pub const CONSTANT: &str = "ConstantNode";
    /// `result = (x, y, z)`
    pub const VECTOR: &str = "VectorNode";
    /// Rows `m1, m2, m3` stacked into a matrix
    pub const MATRIX: &str = "MatrixNode";
    /// One-argument operator
    pub const UNARY_OPERATOR: &str = "UnaryOperatorNode";
    /// Two-argument operator
    pub const BINARY_OPERATOR: &str = "BinaryOperatorNode";
    /// Euclidean norm
    pub const NORM: &str = "NormNode";
    /// Matrix-vector product
    pub const TRANSFORM: &str = "TransformNode";
    /// Matrix transpose
    pub const TRANSPOSE: &str = "TransposeNode";
    /// Matrix product
    pub const MATRIX_MULTIPLICATION: &str = "MatrixMultiplicationNode";
    /// Vector times scalar
    pub const VECTOR_SCALING: &str = "VectorScalingNode";
    /// Eigenvalues sorted by magnitude of the real part
    pub const EIGENVALUES: &str = "EigenvaluesNode";
    /// Eigenvectors in eigenvalue order
    pub const EIGENVECTORS: &str = "EigenvectorsNode";
    /// Linear interpolation between `min` and `max`
    pub const SLIDER: &str = "SliderNode";
    /// Plane spanned by two vectors
    pub const PLANE: &str = "PlaneNode";
}

/// Create the registry holding every built-in kind
pub fn create_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    scalar::register(&mut registry);
    vector::register(&mut registry);
    matrix::register(&mut registry);
    eigen::register(&mut registry);
    registry
}
