//! Statement principals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::string_list::PrincipalIds;

/// The kind of identity a principal id refers to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum PrincipalType {
    /// An AWS account, user or role ARN.
    #[serde(rename = "AWS")]
    #[strum(serialize = "AWS")]
    Aws,
    /// A web identity or SAML provider.
    Federated,
    /// An AWS service, e.g. `ec2.amazonaws.com`.
    Service,
}

/// Principal ids grouped by type, emitted in a fixed key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principals(BTreeMap<PrincipalType, PrincipalIds>);

impl Principals {
    pub fn new() -> Self {
        Self::default()
    }

    /// A principal block holding a single principal type.
    pub fn single<I, S>(kind: PrincipalType, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut principals = Self::new();
        principals.insert(kind, PrincipalIds::new(ids));
        principals
    }

    pub fn insert(&mut self, kind: PrincipalType, ids: PrincipalIds) {
        self.0.insert(kind, ids);
    }

    pub fn get(&self, kind: PrincipalType) -> Option<&PrincipalIds> {
        self.0.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PrincipalType, &PrincipalIds)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use yare::parameterized;

    #[parameterized(
        aws = { PrincipalType::Aws, "AWS" },
        federated = { PrincipalType::Federated, "Federated" },
        service = { PrincipalType::Service, "Service" },
    )]
    fn test_principal_type_names(kind: PrincipalType, expected: &str) {
        assert_eq!(kind.to_string(), expected);
        assert_eq!(PrincipalType::from_str(expected).unwrap(), kind);
        assert_eq!(
            serde_json::to_value(kind).unwrap(),
            serde_json::Value::String(expected.to_string())
        );
    }

    #[test]
    fn test_principals_serialize_in_key_order() {
        let mut principals = Principals::single(PrincipalType::Service, ["ec2.amazonaws.com"]);
        principals.insert(
            PrincipalType::Aws,
            PrincipalIds::new(["arn:aws:iam::123456789012:root"]),
        );

        let json = serde_json::to_string(&principals).unwrap();
        assert_eq!(
            json,
            r#"{"AWS":["arn:aws:iam::123456789012:root"],"Service":["ec2.amazonaws.com"]}"#
        );
    }

    #[test]
    fn test_principal_ids_accept_bare_string() {
        let principals: Principals =
            serde_json::from_str(r#"{"Service": "eks.amazonaws.com"}"#).unwrap();
        let ids = principals.get(PrincipalType::Service).unwrap();
        assert_eq!(ids.as_slice(), &["eks.amazonaws.com"]);
    }
}
