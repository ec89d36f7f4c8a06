//! Policy statements.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use super::condition::{ConditionOperator, Conditions};
use super::principal::{PrincipalType, Principals};
use super::string_list::{Actions, Resources};

/// Whether a statement grants or denies its actions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// A single IAM policy statement.
///
/// Exactly one of `resource`/`not_resource` and at most one of
/// `principal`/`not_principal` should be populated. This is not checked here;
/// IAM rejects the document at upload time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatementEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_principal: Option<Principals>,
    #[serde(default)]
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Actions::is_empty")]
    pub action: Actions,
    #[serde(default, skip_serializing_if = "Actions::is_empty")]
    pub not_action: Actions,
    #[serde(default, skip_serializing_if = "Resources::is_empty")]
    pub resource: Resources,
    #[serde(default, skip_serializing_if = "Resources::is_empty")]
    pub not_resource: Resources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Conditions>,
}

impl StatementEntry {
    /// An `Allow` statement over `actions` on `resources`.
    pub fn allow<A, R, SA, SR>(actions: A, resources: R) -> Self
    where
        A: IntoIterator<Item = SA>,
        R: IntoIterator<Item = SR>,
        SA: Into<String>,
        SR: Into<String>,
    {
        StatementEntry {
            effect: Effect::Allow,
            action: Actions::new(actions),
            resource: Resources::new(resources),
            ..Default::default()
        }
    }

    /// An `Allow` statement granting `actions` to one principal type, with no resource.
    pub fn allow_principal<A, I, SA, SI>(actions: A, kind: PrincipalType, ids: I) -> Self
    where
        A: IntoIterator<Item = SA>,
        I: IntoIterator<Item = SI>,
        SA: Into<String>,
        SI: Into<String>,
    {
        StatementEntry {
            effect: Effect::Allow,
            action: Actions::new(actions),
            principal: Some(Principals::single(kind, ids)),
            ..Default::default()
        }
    }

    /// Add a condition, creating the condition block if needed.
    pub fn with_condition(
        mut self,
        operator: ConditionOperator,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.condition
            .get_or_insert_with(Conditions::new)
            .insert(operator, key, value);
        self
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }
}
