//! `AWS::IAM::*` resources and their properties.

use serde::{Deserialize, Serialize};

use crate::traits::CloudFormationResource;
use crate::types::{PolicyDocument, Tag};

/// A symbolic reference to another resource: `{"Ref": "<logical id>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "Ref")]
    pub logical_id: String,
}

impl Ref {
    pub fn new(logical_id: impl Into<String>) -> Self {
        Ref {
            logical_id: logical_id.into(),
        }
    }
}

/// A property that takes either a literal name or a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameOrRef {
    Ref(Ref),
    Name(String),
}

impl NameOrRef {
    pub fn reference(logical_id: impl Into<String>) -> Self {
        NameOrRef::Ref(Ref::new(logical_id))
    }

    pub fn as_ref_id(&self) -> Option<&str> {
        match self {
            NameOrRef::Ref(reference) => Some(&reference.logical_id),
            NameOrRef::Name(_) => None,
        }
    }
}

impl From<String> for NameOrRef {
    fn from(name: String) -> Self {
        NameOrRef::Name(name)
    }
}

fn reference_ids(items: &[NameOrRef]) -> impl Iterator<Item = &str> {
    items.iter().filter_map(NameOrRef::as_ref_id)
}

/// A policy embedded in a role, user or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
    pub role_name: String,
    pub assume_role_policy_document: PolicyDocument,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<InlinePolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagedPolicy {
    pub managed_policy_name: String,
    pub description: String,
    pub policy_document: PolicyDocument,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<NameOrRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<NameOrRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<NameOrRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<NameOrRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub managed_policy_arns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<InlinePolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceProfile {
    pub instance_profile_name: String,
    pub roles: Vec<NameOrRef>,
}

/// One entry of the template's `Resources` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Properties")]
pub enum Resource {
    #[serde(rename = "AWS::IAM::Role")]
    Role(Role),
    #[serde(rename = "AWS::IAM::ManagedPolicy")]
    ManagedPolicy(ManagedPolicy),
    #[serde(rename = "AWS::IAM::User")]
    User(User),
    #[serde(rename = "AWS::IAM::Group")]
    Group(Group),
    #[serde(rename = "AWS::IAM::InstanceProfile")]
    InstanceProfile(InstanceProfile),
}

impl CloudFormationResource for Role {
    fn resource_type(&self) -> &'static str {
        "AWS::IAM::Role"
    }
}

impl CloudFormationResource for ManagedPolicy {
    fn resource_type(&self) -> &'static str {
        "AWS::IAM::ManagedPolicy"
    }

    fn references(&self) -> Vec<&str> {
        reference_ids(&self.groups)
            .chain(reference_ids(&self.roles))
            .chain(reference_ids(&self.users))
            .collect()
    }
}

impl CloudFormationResource for User {
    fn resource_type(&self) -> &'static str {
        "AWS::IAM::User"
    }

    fn references(&self) -> Vec<&str> {
        reference_ids(&self.groups).collect()
    }
}

impl CloudFormationResource for Group {
    fn resource_type(&self) -> &'static str {
        "AWS::IAM::Group"
    }
}

impl CloudFormationResource for InstanceProfile {
    fn resource_type(&self) -> &'static str {
        "AWS::IAM::InstanceProfile"
    }

    fn references(&self) -> Vec<&str> {
        reference_ids(&self.roles).collect()
    }
}

impl Resource {
    fn inner(&self) -> &dyn CloudFormationResource {
        match self {
            Resource::Role(role) => role,
            Resource::ManagedPolicy(policy) => policy,
            Resource::User(user) => user,
            Resource::Group(group) => group,
            Resource::InstanceProfile(profile) => profile,
        }
    }
}

impl CloudFormationResource for Resource {
    fn resource_type(&self) -> &'static str {
        self.inner().resource_type()
    }

    fn references(&self) -> Vec<&str> {
        self.inner().references()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instance_profile_shape() {
        let resource = Resource::InstanceProfile(InstanceProfile {
            instance_profile_name: "nodes.example".to_string(),
            roles: vec![NameOrRef::reference("AWSIAMRoleNodes")],
        });
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({
                "Type": "AWS::IAM::InstanceProfile",
                "Properties": {
                    "InstanceProfileName": "nodes.example",
                    "Roles": [{"Ref": "AWSIAMRoleNodes"}],
                },
            })
        );
        assert_eq!(resource.references(), vec!["AWSIAMRoleNodes"]);
    }

    #[test]
    fn test_user_groups_mix_names_and_refs() {
        let user = User {
            user_name: "bootstrapper".to_string(),
            groups: vec![
                NameOrRef::from("admins".to_string()),
                NameOrRef::reference("AWSIAMGroupBootstrapper"),
            ],
            managed_policy_arns: vec![],
            policies: vec![],
            tags: vec![],
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({
                "UserName": "bootstrapper",
                "Groups": ["admins", {"Ref": "AWSIAMGroupBootstrapper"}],
            })
        );
        let parsed: User = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, user);
        assert_eq!(user.references(), vec!["AWSIAMGroupBootstrapper"]);
    }

    #[test]
    fn test_group_has_no_references() {
        let group = Resource::Group(Group {
            group_name: "bootstrapper".to_string(),
        });
        assert_eq!(group.resource_type(), "AWS::IAM::Group");
        assert!(group.references().is_empty());
    }
}
