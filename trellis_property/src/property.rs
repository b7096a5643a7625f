// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single named, typed, validated setting.

use alloc::string::String;

use crate::domain::{Domain, FailurePolicy};
use crate::error::WriteError;
use crate::value::Value;

/// A named, typed, validated, observable configuration value.
///
/// A property's kind is fixed by its default value; its [`Domain`] bounds
/// the admissible values and its [`FailurePolicy`] decides what an
/// out-of-domain write does. The read-only flag gates user-facing writes
/// and is itself rule-driven state with its own notification channel.
///
/// Properties are built with chained constructors and handed to
/// [`PropertyGraph::insert`](crate::PropertyGraph::insert), which owns them
/// from then on:
///
/// ```rust
/// use trellis_property::{Domain, FailurePolicy, Property, Value};
///
/// let gain = Property::new("gain", Value::Real(1.0))
///     .with_domain(Domain::real(0.0, 2.0))
///     .with_policy(FailurePolicy::Reject)
///     .read_only(false);
/// assert_eq!(gain.name(), "gain");
/// assert_eq!(gain.value(), &Value::Real(1.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    name: String,
    value: Value,
    default: Value,
    domain: Domain,
    read_only: bool,
    policy: FailurePolicy,
}

impl Property {
    /// Creates a property whose current value is its default.
    ///
    /// The domain starts unconstrained and the policy at its
    /// [default](FailurePolicy::Clamp).
    #[must_use]
    pub fn new(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            value: default.clone(),
            default,
            domain: Domain::Full,
            read_only: false,
            policy: FailurePolicy::default(),
        }
    }

    /// Sets the valid range or choice set.
    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Sets the validation-failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the initial read-only flag.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns the property's name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current value.
    #[must_use]
    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Returns the valid range or choice set.
    #[must_use]
    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Returns the current read-only flag.
    #[must_use]
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns the validation-failure policy.
    #[must_use]
    #[inline]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Admits `value` through this property's domain and policy.
    ///
    /// Returns the value to commit, which is `value` itself when in-domain,
    /// or the policy's repair (clamp, default). Kind mismatches and
    /// rejected writes error; nothing is committed in that case.
    pub(crate) fn admit(&self, value: Value) -> Result<Value, WriteError> {
        if value.kind() != self.default.kind() {
            return Err(WriteError::KindMismatch {
                expected: self.default.kind(),
                found: value.kind(),
            });
        }
        if self.domain.contains(&value) {
            return Ok(value);
        }
        match self.policy {
            FailurePolicy::Reject => Err(WriteError::OutOfDomain),
            FailurePolicy::Clamp => Ok(self.domain.clamp(value)),
            FailurePolicy::UseDefault => Ok(self.default.clone()),
        }
    }

    /// Repairs the initial value and default through the domain and policy.
    ///
    /// Run once when the property joins a graph, so the in-domain invariant
    /// holds from the first observation on. Errors under
    /// [`FailurePolicy::Reject`] when the declared value lies outside the
    /// domain; nothing is committed in that case.
    pub(crate) fn normalize(&mut self) -> Result<(), WriteError> {
        let value = self.admit(self.value.clone())?;
        self.value = value;
        if !self.domain.contains(&self.default) {
            if self.policy == FailurePolicy::Reject {
                return Err(WriteError::OutOfDomain);
            }
            self.default = self.domain.clamp(self.default.clone());
        }
        Ok(())
    }

    pub(crate) fn commit_value(&mut self, value: Value) -> Value {
        core::mem::replace(&mut self.value, value)
    }

    pub(crate) fn commit_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::value::ValueKind;

    fn bounded(policy: FailurePolicy) -> Property {
        Property::new("p", Value::Int(5))
            .with_domain(Domain::int(0, 10))
            .with_policy(policy)
    }

    #[test]
    fn admit_in_domain_passes_through() {
        let p = bounded(FailurePolicy::Reject);
        assert_eq!(p.admit(Value::Int(7)), Ok(Value::Int(7)));
    }

    #[test]
    fn admit_follows_policy() {
        assert_eq!(
            bounded(FailurePolicy::Reject).admit(Value::Int(20)),
            Err(WriteError::OutOfDomain)
        );
        assert_eq!(
            bounded(FailurePolicy::Clamp).admit(Value::Int(20)),
            Ok(Value::Int(10))
        );
        assert_eq!(
            bounded(FailurePolicy::UseDefault).admit(Value::Int(20)),
            Ok(Value::Int(5))
        );
    }

    #[test]
    fn admit_rejects_cross_kind_regardless_of_policy() {
        assert_eq!(
            bounded(FailurePolicy::Clamp).admit(Value::Bool(true)),
            Err(WriteError::KindMismatch {
                expected: ValueKind::Int,
                found: ValueKind::Bool,
            })
        );
    }
}
