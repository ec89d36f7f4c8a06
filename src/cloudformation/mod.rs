//! CloudFormation templates made of IAM resources.

mod resource;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use resource::{
    Group, InlinePolicy, InstanceProfile, ManagedPolicy, NameOrRef, Ref, Resource, Role, User,
};

use crate::error::BootstrapError;
use crate::traits::CloudFormationResource;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A template keyed by logical ID. Keys serialize in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFormationTemplate {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, Resource>,
}

impl Default for CloudFormationTemplate {
    fn default() -> Self {
        CloudFormationTemplate {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            resources: BTreeMap::new(),
        }
    }
}

impl CloudFormationTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, logical_id: impl Into<String>, resource: Resource) {
        self.resources.insert(logical_id.into(), resource);
    }

    pub fn get(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn contains(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// `(from, to)` pairs where `from` refers to a logical ID not in the template.
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        let resources = &self.resources;
        resources
            .iter()
            .flat_map(move |(id, resource)| {
                resource
                    .references()
                    .into_iter()
                    .filter(move |target| !resources.contains_key(*target))
                    .map(move |target| (id.as_str(), target))
            })
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String, BootstrapError> {
        serde_yaml::to_string(self)
            .map_err(|e| BootstrapError::serialization("CloudFormation template", e))
    }

    pub fn to_json(&self) -> Result<String, BootstrapError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BootstrapError::serialization("CloudFormation template", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: &str) -> Resource {
        Resource::InstanceProfile(InstanceProfile {
            instance_profile_name: "profile".to_string(),
            roles: vec![NameOrRef::reference(role)],
        })
    }

    #[test]
    fn test_empty_template_yaml() {
        let template = CloudFormationTemplate::new();
        let yaml = template.to_yaml().unwrap();
        assert!(yaml.starts_with("AWSTemplateFormatVersion:"));
        let parsed: CloudFormationTemplate = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, template);
        assert_eq!(parsed.format_version, "2010-09-09");
    }

    #[test]
    fn test_dangling_references() {
        let mut template = CloudFormationTemplate::new();
        template.insert("Profile", profile("MissingRole"));
        template.insert(
            "Group",
            Resource::Group(Group {
                group_name: "g".to_string(),
            }),
        );
        assert_eq!(template.dangling_references(), vec![("Profile", "MissingRole")]);
    }

    #[test]
    fn test_resources_are_sorted() {
        let mut template = CloudFormationTemplate::new();
        template.insert("Zeta", profile("Zeta"));
        template.insert("Alpha", profile("Alpha"));
        let json = template.to_json().unwrap();
        let alpha = json.find("\"Alpha\"").unwrap();
        let zeta = json.find("\"Zeta\"").unwrap();
        assert!(alpha < zeta);
    }
}
