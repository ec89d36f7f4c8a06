use std::path::PathBuf;

use thiserror::Error;

use crate::policies::PolicyName;
use crate::reconcile::IamApiError;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to parse configuration: {0}")]
    ConfigurationError(String),

    #[error("unsupported configuration kind {found:?}, expected {expected:?}")]
    UnsupportedKind { found: String, expected: String },

    #[error("failed to serialize {what}: {reason}")]
    SerializationError { what: String, reason: String },

    #[error("failed to parse policy document: {0}")]
    ParseError(String),

    #[error("failed to write policy document {policy} to {}: {source}", path.display())]
    WritePolicyDocument {
        policy: PolicyName,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error getting role {role}: {source}")]
    GetRole {
        role: String,
        #[source]
        source: IamApiError,
    },

    #[error("error getting policy {policy_arn}: {source}")]
    GetPolicy {
        policy_arn: String,
        #[source]
        source: IamApiError,
    },

    #[error("error listing role policies for {role}: {source}")]
    ListRolePolicies {
        role: String,
        #[source]
        source: IamApiError,
    },

    #[error("error attaching policy {policy_arn} to role {role}: {source}")]
    AttachRolePolicy {
        role: String,
        policy_arn: String,
        #[source]
        source: IamApiError,
    },

    #[error("error detaching policy {policy_arn} from role {role}: {source}")]
    DetachRolePolicy {
        role: String,
        policy_arn: String,
        #[source]
        source: IamApiError,
    },

    #[error("error creating role {role}: {source}")]
    CreateRole {
        role: String,
        #[source]
        source: IamApiError,
    },

    #[error("error deleting role {role}: {source}")]
    DeleteRole {
        role: String,
        #[source]
        source: IamApiError,
    },

    #[error("error updating assume role policy for {role}: {source}")]
    UpdateAssumeRolePolicy {
        role: String,
        #[source]
        source: IamApiError,
    },

    #[error("error tagging role {role}: {source}")]
    TagRole {
        role: String,
        #[source]
        source: IamApiError,
    },

    #[error("error untagging role {role}: {source}")]
    UntagRole {
        role: String,
        #[source]
        source: IamApiError,
    },
}

impl BootstrapError {
    pub fn serialization(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        BootstrapError::SerializationError {
            what: what.into(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for BootstrapError {
    fn from(err: serde_yaml::Error) -> Self {
        BootstrapError::ConfigurationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_names_policy() {
        let err = BootstrapError::WritePolicyDocument {
            policy: PolicyName::NodePolicy,
            path: PathBuf::from("/nonexistent/AWSIAMManagedPolicyCloudProviderNodes.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        let message = err.to_string();
        assert!(message.contains("AWSIAMManagedPolicyCloudProviderNodes"));
        assert!(message.contains("no such directory"));
    }

    #[test]
    fn test_iam_errors_carry_identifiers() {
        let err = BootstrapError::AttachRolePolicy {
            role: "nodes.example".to_string(),
            policy_arn: "arn:aws:iam::aws:policy/Missing".to_string(),
            source: IamApiError::NoSuchEntity("policy Missing".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("nodes.example"));
        assert!(message.contains("arn:aws:iam::aws:policy/Missing"));
    }
}
