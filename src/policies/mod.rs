//! Policy document builders.
//!
//! Every builder is a pure function over a defaulted
//! [`AwsIamConfigurationSpec`](crate::config::AwsIamConfigurationSpec). None of
//! them fail or perform I/O, and none depend on the order they are called in.
//! Action lists are kept verbatim, duplicates included, so the generated
//! documents match the ones already deployed by existing stacks.

mod cloud_provider;
mod controllers;
mod csi;
mod eks;
mod secrets;
mod trust;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

pub use cloud_provider::{control_plane_policy, node_policy};
pub use controllers::{controllers_eks_policy, controllers_policy};
pub use csi::csi_policy;
pub use eks::{
    EKS_CLUSTER_POLICY, EKS_CONTROL_PLANE_ROLE, EKS_FARGATE_ROLE, EKS_FARGATE_SERVICE,
    EKS_NODEGROUP_ROLE, eks_console_policy, eks_control_plane_policy_arns,
    eks_fargate_policy_arns, eks_nodegroup_policy_arns,
};
pub use secrets::{controller_secret_statement, node_secret_statement};
pub use trust::{
    assume_role_policy, aws_arn_assume_role_policy, aws_service_assume_role_policy,
    ec2_assume_role_policy, eks_control_plane_trust_relationship,
    eks_nodegroup_trust_relationship, with_trust_statements,
};

use crate::config::AwsIamConfigurationSpec;
use crate::types::PolicyDocument;

/// The managed policies whose documents can be exported on their own.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
pub enum PolicyName {
    #[serde(rename = "AWSIAMManagedPolicyControllers")]
    #[strum(serialize = "AWSIAMManagedPolicyControllers")]
    ControllersPolicy,
    #[serde(rename = "AWSIAMManagedPolicyCloudProviderControlPlane")]
    #[strum(serialize = "AWSIAMManagedPolicyCloudProviderControlPlane")]
    ControlPlanePolicy,
    #[serde(rename = "AWSIAMManagedPolicyCloudProviderNodes")]
    #[strum(serialize = "AWSIAMManagedPolicyCloudProviderNodes")]
    NodePolicy,
    #[serde(rename = "AWSEBSCSIPolicyController")]
    #[strum(serialize = "AWSEBSCSIPolicyController")]
    CsiPolicy,
}

impl PolicyName {
    /// Whether `name` is one of the well-known managed policy names.
    pub fn is_valid(name: &str) -> bool {
        PolicyName::from_str(name).is_ok()
    }

    /// Build the document for this policy.
    pub fn document(self, spec: &AwsIamConfigurationSpec) -> PolicyDocument {
        match self {
            PolicyName::ControllersPolicy => controllers_policy(spec),
            PolicyName::ControlPlanePolicy => control_plane_policy(),
            PolicyName::NodePolicy => node_policy(spec),
            PolicyName::CsiPolicy => csi_policy(),
        }
    }
}

/// ARN of an AWS-managed policy in `partition`.
pub fn aws_managed_policy_arn(partition: &str, name: &str) -> String {
    format!("arn:{partition}:iam::aws:policy/{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::with_defaults;
    use strum::IntoEnumIterator;
    use yare::parameterized;

    #[parameterized(
        controllers = { "AWSIAMManagedPolicyControllers", true },
        control_plane = { "AWSIAMManagedPolicyCloudProviderControlPlane", true },
        nodes = { "AWSIAMManagedPolicyCloudProviderNodes", true },
        csi = { "AWSEBSCSIPolicyController", true },
        controllers_eks = { "AWSIAMManagedPolicyControllersEKS", false },
        variant_name = { "ControllersPolicy", false },
        empty = { "", false },
    )]
    fn test_is_valid(name: &str, expected: bool) {
        assert_eq!(PolicyName::is_valid(name), expected);
    }

    #[test]
    fn test_every_policy_name_builds_a_document() {
        let spec = with_defaults(&AwsIamConfigurationSpec::default());
        for name in PolicyName::iter() {
            let document = name.document(&spec);
            assert_eq!(document.version, crate::types::CURRENT_VERSION);
            assert!(!document.statement.is_empty(), "{name} has no statements");
        }
    }

    #[test]
    fn test_policy_name_display() {
        assert_eq!(PolicyName::CsiPolicy.to_string(), "AWSEBSCSIPolicyController");
        let as_str: &'static str = PolicyName::NodePolicy.into();
        assert_eq!(as_str, "AWSIAMManagedPolicyCloudProviderNodes");
    }

    #[test]
    fn test_aws_managed_policy_arn() {
        assert_eq!(
            aws_managed_policy_arn("aws-cn", "AmazonEKSClusterPolicy"),
            "arn:aws-cn:iam::aws:policy/AmazonEKSClusterPolicy"
        );
    }
}
