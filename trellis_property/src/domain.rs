// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Valid sets for property values, and what to do about invalid writes.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Vec2;

use crate::value::{Value, ValueKind, Vec3};

/// What a write outside the property's [`Domain`] does.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Error out; nothing is committed.
    Reject,
    /// Clamp to the nearest valid value.
    #[default]
    Clamp,
    /// Commit the property's default instead.
    UseDefault,
}

/// The valid set of a property's values.
///
/// Domains are per-kind: numeric ranges are inclusive, vector ranges apply
/// componentwise, and choice domains enumerate the admissible tags.
/// [`Domain::Full`] places no constraint and is the natural domain for
/// booleans, text, and URIs.
///
/// # Example
///
/// ```rust
/// use trellis_property::{Domain, Value};
///
/// let d = Domain::real(0.0, 1.0);
/// assert!(d.contains(&Value::Real(0.5)));
/// assert_eq!(d.clamp(Value::Real(3.0)), Value::Real(1.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Domain {
    /// No constraint.
    Full,
    /// Inclusive integer range.
    IntRange {
        /// Smallest admissible value.
        min: i64,
        /// Largest admissible value.
        max: i64,
    },
    /// Inclusive real range.
    RealRange {
        /// Smallest admissible value.
        min: f64,
        /// Largest admissible value.
        max: f64,
    },
    /// Componentwise inclusive 2-D vector range.
    Vec2Range {
        /// Componentwise lower bound.
        min: Vec2,
        /// Componentwise upper bound.
        max: Vec2,
    },
    /// Componentwise inclusive 3-D vector range.
    Vec3Range {
        /// Componentwise lower bound.
        min: Vec3,
        /// Componentwise upper bound.
        max: Vec3,
    },
    /// Enumerated choice tags.
    Choices(Vec<String>),
}

impl Domain {
    /// Inclusive integer range.
    #[must_use]
    pub const fn int(min: i64, max: i64) -> Self {
        Self::IntRange { min, max }
    }

    /// Inclusive real range.
    #[must_use]
    pub const fn real(min: f64, max: f64) -> Self {
        Self::RealRange { min, max }
    }

    /// Componentwise 2-D vector range.
    #[must_use]
    pub const fn vec2(min: Vec2, max: Vec2) -> Self {
        Self::Vec2Range { min, max }
    }

    /// Componentwise 3-D vector range.
    #[must_use]
    pub const fn vec3(min: Vec3, max: Vec3) -> Self {
        Self::Vec3Range { min, max }
    }

    /// Choice domain from tag strings.
    #[must_use]
    pub fn choices<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::Choices(tags.into_iter().map(Into::into).collect())
    }

    /// Returns the single kind this domain constrains, or `None` for
    /// [`Domain::Full`], which admits every kind.
    #[must_use]
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Full => None,
            Self::IntRange { .. } => Some(ValueKind::Int),
            Self::RealRange { .. } => Some(ValueKind::Real),
            Self::Vec2Range { .. } => Some(ValueKind::Vec2),
            Self::Vec3Range { .. } => Some(ValueKind::Vec3),
            Self::Choices(_) => Some(ValueKind::Choice),
        }
    }

    /// Returns `true` if values of `kind` can live in this domain.
    #[must_use]
    pub fn admits_kind(&self, kind: ValueKind) -> bool {
        match self {
            Self::Full => true,
            Self::IntRange { .. } => kind == ValueKind::Int,
            Self::RealRange { .. } => kind == ValueKind::Real,
            Self::Vec2Range { .. } => kind == ValueKind::Vec2,
            Self::Vec3Range { .. } => kind == ValueKind::Vec3,
            Self::Choices(_) => kind == ValueKind::Choice,
        }
    }

    /// Returns `true` if `value` lies within this domain.
    ///
    /// A value of a kind the domain does not admit is never contained.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Full, _) => true,
            (Self::IntRange { min, max }, Value::Int(v)) => (min..=max).contains(&v),
            (Self::RealRange { min, max }, Value::Real(v)) => *v >= *min && *v <= *max,
            (Self::Vec2Range { min, max }, Value::Vec2(v)) => {
                v.x >= min.x && v.x <= max.x && v.y >= min.y && v.y <= max.y
            }
            (Self::Vec3Range { min, max }, Value::Vec3(v)) => {
                v.x >= min.x
                    && v.x <= max.x
                    && v.y >= min.y
                    && v.y <= max.y
                    && v.z >= min.z
                    && v.z <= max.z
            }
            (Self::Choices(tags), Value::Choice(tag)) => tags.iter().any(|t| t == tag),
            _ => false,
        }
    }

    /// Clamps `value` to the nearest point of this domain.
    ///
    /// Scalars move to the violated end, vectors clamp componentwise, and a
    /// choice tag not in the list falls back to the first declared entry
    /// (tags have no distance metric). Values of a kind the domain does not
    /// admit are returned unchanged; kind agreement is checked where the
    /// domain is attached to a property.
    #[must_use]
    pub fn clamp(&self, value: Value) -> Value {
        match (self, value) {
            (Self::IntRange { min, max }, Value::Int(v)) => Value::Int(v.clamp(*min, *max)),
            (Self::RealRange { min, max }, Value::Real(v)) => Value::Real(v.clamp(*min, *max)),
            (Self::Vec2Range { min, max }, Value::Vec2(v)) => Value::Vec2(Vec2::new(
                v.x.clamp(min.x, max.x),
                v.y.clamp(min.y, max.y),
            )),
            (Self::Vec3Range { min, max }, Value::Vec3(v)) => {
                Value::Vec3(v.clamp_components(*min, *max))
            }
            (Self::Choices(tags), Value::Choice(tag)) => {
                if tags.iter().any(|t| *t == tag) {
                    Value::Choice(tag)
                } else {
                    Value::Choice(tags.first().cloned().unwrap_or_default())
                }
            }
            (_, value) => value,
        }
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::Full
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn int_range() {
        let d = Domain::int(1, 10);
        assert!(d.contains(&Value::Int(1)));
        assert!(d.contains(&Value::Int(10)));
        assert!(!d.contains(&Value::Int(0)));
        assert_eq!(d.clamp(Value::Int(-5)), Value::Int(1));
        assert_eq!(d.clamp(Value::Int(50)), Value::Int(10));
    }

    #[test]
    fn real_range() {
        let d = Domain::real(-1.0, 1.0);
        assert!(d.contains(&Value::Real(0.0)));
        assert!(!d.contains(&Value::Real(1.5)));
        assert_eq!(d.clamp(Value::Real(1.5)), Value::Real(1.0));
    }

    #[test]
    fn vector_ranges_clamp_componentwise() {
        let d = Domain::vec2(Vec2::ZERO, Vec2::new(1.0, 1.0));
        assert_eq!(
            d.clamp(Value::Vec2(Vec2::new(2.0, -1.0))),
            Value::Vec2(Vec2::new(1.0, 0.0))
        );

        let d = Domain::vec3(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        assert!(!d.contains(&Value::Vec3(Vec3::new(0.5, 0.5, 2.0))));
    }

    #[test]
    fn choices_fall_back_to_first() {
        let d = Domain::choices(["low", "high"]);
        assert!(d.contains(&Value::Choice("low".to_string())));
        assert!(!d.contains(&Value::Choice("medium".to_string())));
        assert_eq!(
            d.clamp(Value::Choice("medium".to_string())),
            Value::Choice("low".to_string())
        );
    }

    #[test]
    fn full_admits_everything() {
        let d = Domain::Full;
        assert!(d.admits_kind(ValueKind::Bool));
        assert!(d.contains(&Value::Bool(true)));
        assert_eq!(d.clamp(Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn kind_agreement() {
        assert!(Domain::int(0, 1).admits_kind(ValueKind::Int));
        assert!(!Domain::int(0, 1).admits_kind(ValueKind::Real));
        assert!(!Domain::int(0, 1).contains(&Value::Real(0.5)));
    }
}
