// SPDX-License-Identifier: MIT OR Apache-2.0
//! Values that flow through ports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3D vector, `[x, y, z]`
pub type Vec3 = [f64; 3];

/// A 3x3 matrix, row-major (`m[row][col]`)
pub type Mat3 = [[f64; 3]; 3];

/// The 3x3 identity matrix
pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Type tag carried by every port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Scalar
    Number,
    /// 3D vector
    Vector3,
    /// 3x3 matrix
    Matrix3,
    /// Anything the engine does not interpret (operator names, labels)
    Opaque,
}

impl ValueType {
    /// Zero value of this type
    pub fn default_value(self) -> Value {
        match self {
            Self::Number => Value::Number(0.0),
            Self::Vector3 => Value::Vector3([0.0; 3]),
            Self::Matrix3 => Value::Matrix3([[0.0; 3]; 3]),
            Self::Opaque => Value::Opaque(String::new()),
        }
    }

    /// Check if a value of type `other` may feed a port of this type.
    ///
    /// Tags must match exactly; `Opaque` is a type of its own, not a wildcard.
    pub fn accepts(self, other: ValueType) -> bool {
        self == other
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "number",
            Self::Vector3 => "vector3",
            Self::Matrix3 => "matrix3",
            Self::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Value stored in a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Scalar
    Number(#[serde(with = "float_repr")] f64),
    /// 3D vector
    Vector3(#[serde(with = "float_repr::vec3")] Vec3),
    /// 3x3 matrix, row-major
    Matrix3(#[serde(with = "float_repr::mat3")] Mat3),
    /// Uninterpreted payload
    Opaque(String),
}

impl Value {
    /// Get the type tag for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Number(_) => ValueType::Number,
            Self::Vector3(_) => ValueType::Vector3,
            Self::Matrix3(_) => ValueType::Matrix3,
            Self::Opaque(_) => ValueType::Opaque,
        }
    }

    /// Scalar payload, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// Vector payload, if this is a vector
    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// Matrix payload, if this is a matrix
    pub fn as_matrix(&self) -> Option<Mat3> {
        match self {
            Self::Matrix3(m) => Some(*m),
            _ => None,
        }
    }

    /// Opaque payload, if this is opaque
    pub fn as_opaque(&self) -> Option<&str> {
        match self {
            Self::Opaque(s) => Some(s),
            _ => None,
        }
    }

    /// Same value, treating NaN as equal to NaN.
    ///
    /// Propagated NaNs would otherwise make every comparison of a degenerate
    /// graph fail.
    pub fn same_as(&self, other: &Value) -> bool {
        fn eq(a: f64, b: f64) -> bool {
            a == b || (a.is_nan() && b.is_nan())
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => eq(*a, *b),
            (Self::Vector3(a), Self::Vector3(b)) => a.iter().zip(b).all(|(x, y)| eq(*x, *y)),
            (Self::Matrix3(a), Self::Matrix3(b)) => a
                .iter()
                .flatten()
                .zip(b.iter().flatten())
                .all(|(x, y)| eq(*x, *y)),
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => write!(f, "{x}"),
            Self::Vector3([x, y, z]) => write!(f, "({x}, {y}, {z})"),
            Self::Matrix3(m) => {
                write!(f, "[")?;
                for (i, row) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}, {}, {}]", row[0], row[1], row[2])?;
                }
                write!(f, "]")
            }
            Self::Opaque(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Self::Vector3(v)
    }
}

impl From<Mat3> for Value {
    fn from(m: Mat3) -> Self {
        Self::Matrix3(m)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Opaque(s.to_string())
    }
}

/// Floats that survive text formats without a NaN/Infinity literal.
///
/// Finite numbers are written as numbers; NaN and the infinities as the
/// strings `"NaN"`, `"inf"` and `"-inf"`. JSON would otherwise write `null`
/// and fail to read it back.
mod float_repr {
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    struct Float(f64);

    impl Serialize for Float {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let x = self.0;
            if x.is_finite() {
                serializer.serialize_f64(x)
            } else if x.is_nan() {
                serializer.serialize_str("NaN")
            } else if x > 0.0 {
                serializer.serialize_str("inf")
            } else {
                serializer.serialize_str("-inf")
            }
        }
    }

    impl<'de> Deserialize<'de> for Float {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct FloatVisitor;

            impl Visitor<'_> for FloatVisitor {
                type Value = Float;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a number, \"NaN\", \"inf\" or \"-inf\"")
                }

                fn visit_f64<E: de::Error>(self, x: f64) -> Result<Float, E> {
                    Ok(Float(x))
                }

                fn visit_i64<E: de::Error>(self, x: i64) -> Result<Float, E> {
                    Ok(Float(x as f64))
                }

                fn visit_u64<E: de::Error>(self, x: u64) -> Result<Float, E> {
                    Ok(Float(x as f64))
                }

                fn visit_str<E: de::Error>(self, s: &str) -> Result<Float, E> {
                    match s {
                        "NaN" => Ok(Float(f64::NAN)),
                        "inf" => Ok(Float(f64::INFINITY)),
                        "-inf" => Ok(Float(f64::NEG_INFINITY)),
                        other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                    }
                }
            }

            deserializer.deserialize_any(FloatVisitor)
        }
    }

    pub fn serialize<S: Serializer>(x: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        Float(*x).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Float::deserialize(deserializer).map(|f| f.0)
    }

    pub mod vec3 {
        use super::Float;
        use crate::value::Vec3;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(v: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
            (*v).map(Float).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
            <[Float; 3]>::deserialize(deserializer).map(|v| v.map(|f| f.0))
        }
    }

    pub mod mat3 {
        use super::Float;
        use crate::value::Mat3;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(m: &Mat3, serializer: S) -> Result<S::Ok, S::Error> {
            (*m).map(|row| row.map(Float)).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Mat3, D::Error> {
            <[[Float; 3]; 3]>::deserialize(deserializer).map(|m| m.map(|row| row.map(|f| f.0)))
        }
    }
}
