//! Ordered string lists used for IAM `Action`, `Resource` and principal ids.
//!
//! IAM accepts either a bare string or an array for these fields. All of the
//! list types here deserialize from both shapes and always serialize as an
//! array, so a document read back from JSON compares equal to the original.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

macro_rules! string_list {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(Vec<String>);

        impl $name {
            pub fn new<I, S>(items: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                Self(items.into_iter().map(Into::into).collect())
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, String> {
                self.0.iter()
            }

            pub fn as_slice(&self) -> &[String] {
                &self.0
            }

            pub fn contains(&self, item: &str) -> bool {
                self.0.iter().any(|existing| existing == item)
            }

            pub fn push(&mut self, item: impl Into<String>) {
                self.0.push(item.into());
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                OneOrMany::deserialize(deserializer).map(|items| Self(items.into()))
            }
        }

        impl<S: Into<String>> FromIterator<S> for $name {
            fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
                Self::new(iter)
            }
        }

        impl<S: Into<String>> Extend<S> for $name {
            fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
                self.0.extend(iter.into_iter().map(Into::into));
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a String;
            type IntoIter = std::slice::Iter<'a, String>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                write!(f, "[{}]", self.0.iter().join(", "))
            }
        }
    };
}

string_list!(
    /// The `Action` (or `NotAction`) list of a statement, e.g. `ec2:RunInstances`.
    Actions
);

string_list!(
    /// The `Resource` (or `NotResource`) list of a statement: ARNs or ARN patterns.
    Resources
);

string_list!(
    /// Identifiers for a single principal type, e.g. `ec2.amazonaws.com`.
    PrincipalIds
);

/// The wildcard resource.
pub const ANY: &str = "*";

impl Resources {
    /// A resource list matching everything.
    pub fn any() -> Self {
        Self::new([ANY])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        bare_string = { r#""ec2:RunInstances""#, vec!["ec2:RunInstances"] },
        single_element_array = { r#"["ec2:RunInstances"]"#, vec!["ec2:RunInstances"] },
        multiple = { r#"["ec2:RunInstances", "ec2:TerminateInstances"]"#, vec!["ec2:RunInstances", "ec2:TerminateInstances"] },
        empty = { "[]", vec![] },
    )]
    fn test_actions_accept_string_or_array(input: &str, expected: Vec<&str>) {
        let actions: Actions = serde_json::from_str(input).unwrap();
        assert_eq!(actions, Actions::new(expected));
    }

    #[test]
    fn test_single_action_serializes_as_array() {
        let actions = Actions::new(["sts:AssumeRole"]);
        assert_eq!(
            serde_json::to_string(&actions).unwrap(),
            r#"["sts:AssumeRole"]"#
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let resources: Resources = ["b", "a", "c"].into_iter().collect();
        assert_eq!(resources.as_slice(), &["b", "a", "c"]);
        assert_eq!(resources.to_string(), "[b, a, c]");
    }

    #[test]
    fn test_any_resource() {
        let any = Resources::any();
        assert!(any.contains("*"));
        assert_eq!(any.len(), 1);
    }
}
