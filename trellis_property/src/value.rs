// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed set of property value kinds.

use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;

use kurbo::Vec2;

/// A 3-D real vector value.
///
/// Kurbo's vocabulary stops at two dimensions, so the third axis gets a
/// small crate-local type with the same flavor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3 {
    /// The x component.
    pub x: f64,
    /// The y component.
    pub y: f64,
    /// The z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new vector from components.
    #[must_use]
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Clamps each component between the matching components of `min` and `max`.
    #[must_use]
    pub fn clamp_components(self, min: Self, max: Self) -> Self {
        Self::new(
            self.x.clamp(min.x, max.x),
            self.y.clamp(min.y, max.y),
            self.z.clamp(min.z, max.z),
        )
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The kind of a [`Value`].
///
/// This is the closed set of value shapes a property can hold. A property
/// never changes kind: cross-kind writes are kind-mismatch errors, not
/// coercions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Signed integer.
    Int,
    /// Real number.
    Real,
    /// Boolean flag.
    Bool,
    /// Free-form text.
    Text,
    /// URI text (kept distinct so controls can render pickers).
    Uri,
    /// 2-D real vector.
    Vec2,
    /// 3-D real vector.
    Vec3,
    /// One tag out of an enumerated choice set.
    Choice,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Real => "real",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::Uri => "uri",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Choice => "choice",
        };
        f.write_str(name)
    }
}

/// A property value.
///
/// # Example
///
/// ```rust
/// use trellis_property::{Value, ValueKind};
///
/// let v = Value::Int(42);
/// assert_eq!(v.kind(), ValueKind::Int);
/// assert_eq!(Value::zero(ValueKind::Bool), Value::Bool(false));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Signed integer.
    Int(i64),
    /// Real number.
    Real(f64),
    /// Boolean flag.
    Bool(bool),
    /// Free-form text.
    Text(String),
    /// URI text.
    Uri(String),
    /// 2-D real vector.
    Vec2(Vec2),
    /// 3-D real vector.
    Vec3(Vec3),
    /// One tag out of an enumerated choice set.
    Choice(String),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Real(_) => ValueKind::Real,
            Self::Bool(_) => ValueKind::Bool,
            Self::Text(_) => ValueKind::Text,
            Self::Uri(_) => ValueKind::Uri,
            Self::Vec2(_) => ValueKind::Vec2,
            Self::Vec3(_) => ValueKind::Vec3,
            Self::Choice(_) => ValueKind::Choice,
        }
    }

    /// Returns the zero/empty value for a kind.
    ///
    /// This is the seed used when a document declares a property without an
    /// explicit default; the compiler clamps it into the declared domain.
    #[must_use]
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Int => Self::Int(0),
            ValueKind::Real => Self::Real(0.0),
            ValueKind::Bool => Self::Bool(false),
            ValueKind::Text => Self::Text(String::new()),
            ValueKind::Uri => Self::Uri(String::new()),
            ValueKind::Vec2 => Self::Vec2(Vec2::ZERO),
            ValueKind::Vec3 => Self::Vec3(Vec3::ZERO),
            ValueKind::Choice => Self::Choice(String::new()),
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    #[must_use]
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compares two scalar values of the same kind.
    ///
    /// Only integers and reals order; everything else (and any cross-kind
    /// pairing) returns `None`.
    #[must_use]
    pub fn scalar_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// Parses a literal into a value of the given kind.
    ///
    /// This is how constraint annotations turn their textual match values
    /// into typed ones. Vector kinds have no literal form and always return
    /// `None`, as does unparseable text.
    #[must_use]
    pub fn parse_literal(kind: ValueKind, literal: &str) -> Option<Self> {
        let literal = literal.trim();
        match kind {
            ValueKind::Int => literal.parse().ok().map(Self::Int),
            ValueKind::Real => literal.parse().ok().map(Self::Real),
            ValueKind::Bool => match literal {
                "true" => Some(Self::Bool(true)),
                "false" => Some(Self::Bool(false)),
                _ => None,
            },
            ValueKind::Text => Some(Self::Text(literal.to_string())),
            ValueKind::Uri => Some(Self::Uri(literal.to_string())),
            ValueKind::Choice => Some(Self::Choice(literal.to_string())),
            ValueKind::Vec2 | ValueKind::Vec3 => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) | Self::Uri(v) | Self::Choice(v) => f.write_str(v),
            Self::Vec2(v) => write!(f, "({}, {})", v.x, v.y),
            Self::Vec3(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn kinds_round_trip() {
        assert_eq!(Value::Int(1).kind(), ValueKind::Int);
        assert_eq!(Value::Real(1.0).kind(), ValueKind::Real);
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(Value::Text(String::new()).kind(), ValueKind::Text);
        assert_eq!(Value::Uri(String::new()).kind(), ValueKind::Uri);
        assert_eq!(Value::Vec2(Vec2::ZERO).kind(), ValueKind::Vec2);
        assert_eq!(Value::Vec3(Vec3::ZERO).kind(), ValueKind::Vec3);
        assert_eq!(Value::Choice(String::new()).kind(), ValueKind::Choice);
    }

    #[test]
    fn zero_matches_kind() {
        for kind in [
            ValueKind::Int,
            ValueKind::Real,
            ValueKind::Bool,
            ValueKind::Text,
            ValueKind::Uri,
            ValueKind::Vec2,
            ValueKind::Vec3,
            ValueKind::Choice,
        ] {
            assert_eq!(Value::zero(kind).kind(), kind);
        }
    }

    #[test]
    fn scalar_cmp_same_kind_only() {
        assert_eq!(
            Value::Int(2).scalar_cmp(&Value::Int(3)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Real(2.5).scalar_cmp(&Value::Real(2.5)),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::Int(2).scalar_cmp(&Value::Real(3.0)), None);
        assert_eq!(Value::Bool(true).scalar_cmp(&Value::Bool(false)), None);
    }

    #[test]
    fn parse_literals() {
        assert_eq!(
            Value::parse_literal(ValueKind::Int, " 42 "),
            Some(Value::Int(42))
        );
        assert_eq!(
            Value::parse_literal(ValueKind::Real, "2.5"),
            Some(Value::Real(2.5))
        );
        assert_eq!(
            Value::parse_literal(ValueKind::Bool, "true"),
            Some(Value::Bool(true))
        );
        assert_eq!(Value::parse_literal(ValueKind::Bool, "yes"), None);
        assert_eq!(Value::parse_literal(ValueKind::Int, "4.2"), None);
        assert_eq!(Value::parse_literal(ValueKind::Vec2, "1 2"), None);
    }

    #[test]
    fn vec3_clamp_componentwise() {
        let min = Vec3::new(0.0, 0.0, 0.0);
        let max = Vec3::new(1.0, 2.0, 3.0);
        let clamped = Vec3::new(-1.0, 1.5, 9.0).clamp_components(min, max);
        assert_eq!(clamped, Vec3::new(0.0, 1.5, 3.0));
    }
}
