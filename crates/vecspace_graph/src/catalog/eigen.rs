// SPDX-License-Identifier: MIT OR Apache-2.0
//! Eigenvalue and eigenvector nodes.
//!
//! Eigenvalues come from the real Schur form and are ordered by descending
//! absolute real part. The sort is stable, so values with equal magnitude keep
//! the order the decomposition produced; nothing stronger is promised for ties.
//!
//! Each eigenvector is the null vector of `A - λI` taken from a complex SVD.
//! Repeated eigenvalues take successive right-singular vectors so they span
//! the eigenspace instead of repeating one direction. Vectors are unit length
//! with their largest component rotated onto the positive real axis; for
//! complex eigenvalues the output is the real part of that vector.

use super::kinds;
use super::matrix::mat_to_na;
use crate::node::{NodeCategory, NodeInputs, NodeOutputs, NodeRegistry, NodeType};
use crate::port::PortSpec;
use crate::value::{Mat3, Vec3, IDENTITY};
use nalgebra::{Complex, Matrix3, Vector3};

const MAX_ITERATIONS: usize = 1_000;
/// Eigenvalues closer than this, relative to the matrix norm, count as equal
const TIE_TOLERANCE: f64 = 1e-9;

fn tie_tolerance(m: Mat3) -> f64 {
    TIE_TOLERANCE * mat_to_na(m).norm().max(1.0)
}

/// Eigenvalues sorted by descending `|re|`, or `None` for non-finite input
fn sorted_eigenvalues(m: Mat3) -> Option<[Complex<f64>; 3]> {
    if m.iter().flatten().any(|x| !x.is_finite()) {
        return None;
    }
    let schur = mat_to_na(m).try_schur(f64::EPSILON, MAX_ITERATIONS)?;
    let values = schur.complex_eigenvalues();
    let mut sorted = [values[0], values[1], values[2]];
    sorted.sort_by(|a, b| b.re.abs().total_cmp(&a.re.abs()));
    Some(sorted)
}

fn eigenvector(m: Mat3, lambda: Complex<f64>, rank: usize) -> Option<Vec3> {
    let a: Matrix3<Complex<f64>> = mat_to_na(m).map(|x| Complex::new(x, 0.0));
    let shifted = a - Matrix3::from_diagonal_element(lambda);
    let svd = shifted.try_svd(false, true, f64::EPSILON, MAX_ITERATIONS)?;
    let v_t = svd.v_t?;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| svd.singular_values[i].total_cmp(&svd.singular_values[j]));
    let row = order[rank.min(2)];
    let v: Vector3<Complex<f64>> = v_t.row(row).adjoint();

    let pivot = (0..3).max_by(|&i, &j| v[i].norm().total_cmp(&v[j].norm()))?;
    let scale = v[pivot].norm();
    if scale == 0.0 {
        return None;
    }
    let phase = v[pivot].conj() / scale;
    let real = v.map(|c| (c * phase).re);
    let unit = real.normalize();
    Some(unit.into())
}

fn eigenvalues(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let nan = Complex::new(f64::NAN, f64::NAN);
    let values = sorted_eigenvalues(inputs.matrix("matrix")).unwrap_or([nan; 3]);
    for (name, value) in ["e1", "e2", "e3"].into_iter().zip(&values) {
        outputs.set(name, value.re);
    }
    for (name, value) in ["i1", "i2", "i3"].into_iter().zip(&values) {
        outputs.set(name, value.im);
    }
}

fn eigenvectors(inputs: &NodeInputs<'_>, outputs: &mut NodeOutputs) {
    let m = inputs.matrix("matrix");
    let values = sorted_eigenvalues(m);
    let tolerance = tie_tolerance(m);
    for (i, name) in ["v1", "v2", "v3"].into_iter().enumerate() {
        let vector = values.and_then(|values| {
            // Count earlier equal eigenvalues to pick a distinct direction
            let rank = values[..i]
                .iter()
                .filter(|earlier| (**earlier - values[i]).norm() < tolerance)
                .count();
            eigenvector(m, values[i], rank)
        });
        outputs.set(name, vector.unwrap_or([f64::NAN; 3]));
    }
}

pub(super) fn register(registry: &mut NodeRegistry) {
    registry.register(NodeType {
        id: kinds::EIGENVALUES,
        name: "Eigenvalues",
        category: NodeCategory::Analysis,
        description: "Eigenvalues (real parts e1..e3, imaginary parts i1..i3)",
        inputs: vec![PortSpec::matrix("matrix").with_default(IDENTITY)],
        outputs: vec![
            PortSpec::number("e1"),
            PortSpec::number("e2"),
            PortSpec::number("e3"),
            PortSpec::number("i1"),
            PortSpec::number("i2"),
            PortSpec::number("i3"),
        ],
        compute: eigenvalues,
    });

    registry.register(NodeType {
        id: kinds::EIGENVECTORS,
        name: "Eigenvectors",
        category: NodeCategory::Analysis,
        description: "Unit eigenvectors in eigenvalue order",
        inputs: vec![PortSpec::matrix("matrix").with_default(IDENTITY)],
        outputs: vec![PortSpec::vector("v1"), PortSpec::vector("v2"), PortSpec::vector("v3")],
        compute: eigenvectors,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::{out, run};
    use crate::node::Node;
    use crate::value::Value;
    use approx::assert_abs_diff_eq;

    fn number(node: &Node, name: &str) -> f64 {
        out(node, name).as_number().unwrap()
    }

    fn vector(node: &Node, name: &str) -> Vector3<f64> {
        Vector3::from(out(node, name).as_vector().unwrap())
    }

    const DIAGONAL: Mat3 = [[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 1.0]];

    #[test]
    fn test_diagonal_eigenvalues_sorted_descending() {
        let node = run(kinds::EIGENVALUES, &[("matrix", Value::Matrix3(DIAGONAL))]);
        assert_abs_diff_eq!(number(&node, "e1"), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(number(&node, "e2"), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(number(&node, "e3"), 1.0, epsilon = 1e-12);
        for name in ["i1", "i2", "i3"] {
            assert_abs_diff_eq!(number(&node, name), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sorted_by_absolute_real_part() {
        let m = [[-5.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 4.0]];
        let node = run(kinds::EIGENVALUES, &[("matrix", Value::Matrix3(m))]);
        assert_abs_diff_eq!(number(&node, "e1"), -5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(number(&node, "e2"), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(number(&node, "e3"), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_has_complex_pair() {
        // Quarter turn about z: eigenvalues 1, ±i
        let m = [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let node = run(kinds::EIGENVALUES, &[("matrix", Value::Matrix3(m))]);
        assert_abs_diff_eq!(number(&node, "e1"), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(number(&node, "i1"), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(number(&node, "e2"), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(number(&node, "e3"), 0.0, epsilon = 1e-9);
        // The pair's order is whatever the decomposition returned
        assert_abs_diff_eq!(number(&node, "i2").abs(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(number(&node, "i2") + number(&node, "i3"), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_matrix_yields_nan() {
        let m = [[f64::NAN, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let node = run(kinds::EIGENVALUES, &[("matrix", Value::Matrix3(m))]);
        assert!(number(&node, "e1").is_nan());

        let node = run(kinds::EIGENVECTORS, &[("matrix", Value::Matrix3(m))]);
        assert!(vector(&node, "v1").iter().all(|c| c.is_nan()));
    }

    #[test]
    fn test_diagonal_eigenvectors_follow_eigenvalue_order() {
        let node = run(kinds::EIGENVECTORS, &[("matrix", Value::Matrix3(DIAGONAL))]);
        assert_abs_diff_eq!(vector(&node, "v1"), Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(vector(&node, "v2"), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-9);
        assert_abs_diff_eq!(vector(&node, "v3"), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_eigenvectors_satisfy_definition() {
        let m = [[2.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 4.0]];
        let values = run(kinds::EIGENVALUES, &[("matrix", Value::Matrix3(m))]);
        let vectors = run(kinds::EIGENVECTORS, &[("matrix", Value::Matrix3(m))]);
        let a = mat_to_na(m);
        for (e, v) in [("e1", "v1"), ("e2", "v2"), ("e3", "v3")] {
            let lambda = number(&values, e);
            let v = vector(&vectors, v);
            assert_abs_diff_eq!(v.norm(), 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(a * v, v * lambda, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_repeated_eigenvalues_span_the_eigenspace() {
        let node = run(kinds::EIGENVECTORS, &[("matrix", Value::Matrix3(IDENTITY))]);
        let (v1, v2, v3) = (vector(&node, "v1"), vector(&node, "v2"), vector(&node, "v3"));
        assert_abs_diff_eq!(v1.dot(&v2), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v1.dot(&v3), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v2.dot(&v3), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeated_eigenvalues_of_a_large_matrix() {
        // Eigenvalues 4e8, 1e8, 1e8; rounding in the decomposition scales with the norm
        let m = [[2e8, 1e8, 1e8], [1e8, 2e8, 1e8], [1e8, 1e8, 2e8]];
        let values = run(kinds::EIGENVALUES, &[("matrix", Value::Matrix3(m))]);
        let vectors = run(kinds::EIGENVECTORS, &[("matrix", Value::Matrix3(m))]);
        let a = mat_to_na(m);
        for (e, v) in [("e2", "v2"), ("e3", "v3")] {
            let lambda = number(&values, e);
            let v = vector(&vectors, v);
            assert_abs_diff_eq!(lambda, 1e8, epsilon = 1.0);
            assert!((a * v - v * lambda).norm() / lambda < 1e-6);
        }
        let (v2, v3) = (vector(&vectors, "v2"), vector(&vectors, "v3"));
        assert_abs_diff_eq!(v2.dot(&v3), 0.0, epsilon = 1e-6);
    }
}
