//! Statement conditions.
//!
//! A condition block maps an operator (`StringLike`, `StringEquals`, ...) to a
//! set of context keys and their expected value(s). Values are kept as JSON so
//! that caller-supplied statements with lists, booleans or numbers pass through
//! untouched. Both levels are sorted maps, which keeps serialized output stable.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A condition operator such as `StringLike` or `ForAnyValue:StringLike`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionOperator(String);

impl ConditionOperator {
    pub fn new(operator: impl Into<String>) -> Self {
        Self(operator.into())
    }

    pub fn string_like() -> Self {
        Self::new("StringLike")
    }

    pub fn string_equals() -> Self {
        Self::new("StringEquals")
    }

    pub fn for_any_value_string_like() -> Self {
        Self::new("ForAnyValue:StringLike")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ConditionOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConditionOperator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The `Condition` block of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(BTreeMap<ConditionOperator, BTreeMap<String, Value>>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key: value` under `operator`, returning the updated block.
    pub fn with(
        mut self,
        operator: ConditionOperator,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(operator, key, value);
        self
    }

    pub fn insert(
        &mut self,
        operator: ConditionOperator,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.0
            .entry(operator)
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn get(&self, operator: &ConditionOperator, key: &str) -> Option<&Value> {
        self.0.get(operator).and_then(|entries| entries.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
