//! EKS role policies and the EKS console policy.

use once_cell::sync::Lazy;

use super::aws_managed_policy_arn;
use crate::config::{AwsIamConfigurationSpec, AwsIamRoleSpec, DEFAULT_NAME_SUFFIX};
use crate::types::{ANY, PolicyDocument, StatementEntry};

pub const EKS_CLUSTER_POLICY: &str = "AmazonEKSClusterPolicy";
pub const EKS_FARGATE_SERVICE: &str = "eks-fargate-pods.amazonaws.com";

const EKS_NODEGROUP_POLICIES: [&str; 3] = [
    "AmazonEKSWorkerNodePolicy",
    "AmazonEKS_CNI_Policy",
    "AmazonEC2ContainerRegistryReadOnly",
];
const EKS_FARGATE_POLICY: &str = "AmazonEKSFargatePodExecutionRolePolicy";

/// Role names the EKS controllers look for when a cluster does not name its own.
pub static EKS_CONTROL_PLANE_ROLE: Lazy<String> =
    Lazy::new(|| format!("eks-controlplane{DEFAULT_NAME_SUFFIX}"));
pub static EKS_NODEGROUP_ROLE: Lazy<String> =
    Lazy::new(|| format!("eks-nodegroup{DEFAULT_NAME_SUFFIX}"));
pub static EKS_FARGATE_ROLE: Lazy<String> =
    Lazy::new(|| format!("eks-fargate{DEFAULT_NAME_SUFFIX}"));

const EKS_CONSOLE_ACTIONS: &[&str] = &[
    "eks:DescribeNodegroup",
    "eks:ListNodegroups",
    "eks:DescribeCluster",
    "eks:ListClusters",
    "eks:AccessKubernetesApi",
    "ssm:GetParameter",
    "eks:ListUpdates",
    "eks:ListFargateProfiles",
];

fn with_extra_attachments(mut arns: Vec<String>, role: &AwsIamRoleSpec) -> Vec<String> {
    arns.extend(role.extra_policy_attachments.iter().cloned());
    arns
}

pub fn eks_control_plane_policy_arns(spec: &AwsIamConfigurationSpec) -> Vec<String> {
    with_extra_attachments(
        vec![aws_managed_policy_arn(&spec.partition, EKS_CLUSTER_POLICY)],
        &spec.eks().default_control_plane_role,
    )
}

pub fn eks_nodegroup_policy_arns(spec: &AwsIamConfigurationSpec) -> Vec<String> {
    with_extra_attachments(
        EKS_NODEGROUP_POLICIES
            .iter()
            .map(|name| aws_managed_policy_arn(&spec.partition, name))
            .collect(),
        spec.eks().managed_machine_pool(),
    )
}

pub fn eks_fargate_policy_arns(spec: &AwsIamConfigurationSpec) -> Vec<String> {
    with_extra_attachments(
        vec![aws_managed_policy_arn(&spec.partition, EKS_FARGATE_POLICY)],
        spec.eks().fargate(),
    )
}

/// Read-only EKS access for users browsing clusters in the AWS console.
pub fn eks_console_policy() -> PolicyDocument {
    PolicyDocument::new(vec![StatementEntry::allow(
        EKS_CONSOLE_ACTIONS.iter().copied(),
        [ANY],
    )])
}
