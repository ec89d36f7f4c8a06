//! Policies for the in-tree AWS cloud provider on control-plane and worker nodes.

use super::secrets::node_secret_statement;
use crate::config::AwsIamConfigurationSpec;
use crate::types::{ANY, PolicyDocument, StatementEntry};

const CONTROL_PLANE_ACTIONS: &[&str] = &[
    "autoscaling:DescribeAutoScalingGroups",
    "autoscaling:DescribeLaunchConfigurations",
    "autoscaling:DescribeTags",
    "ec2:AssignIpv6Addresses",
    "ec2:DescribeInstances",
    "ec2:DescribeImages",
    "ec2:DescribeRegions",
    "ec2:DescribeRouteTables",
    "ec2:DescribeSecurityGroups",
    "ec2:DescribeSubnets",
    "ec2:DescribeVolumes",
    "ec2:CreateSecurityGroup",
    "ec2:CreateTags",
    "ec2:CreateVolume",
    "ec2:ModifyInstanceAttribute",
    "ec2:ModifyVolume",
    "ec2:AttachVolume",
    "ec2:AuthorizeSecurityGroupIngress",
    "ec2:CreateRoute",
    "ec2:DeleteRoute",
    "ec2:DeleteSecurityGroup",
    "ec2:DeleteVolume",
    "ec2:DetachVolume",
    "ec2:RevokeSecurityGroupIngress",
    "ec2:DescribeVpcs",
    "ec2:DescribeInstanceTypes",
    "elasticloadbalancing:AddTags",
    "elasticloadbalancing:AttachLoadBalancerToSubnets",
    "elasticloadbalancing:ApplySecurityGroupsToLoadBalancer",
    "elasticloadbalancing:CreateLoadBalancer",
    "elasticloadbalancing:CreateLoadBalancerPolicy",
    "elasticloadbalancing:CreateLoadBalancerListeners",
    "elasticloadbalancing:ConfigureHealthCheck",
    "elasticloadbalancing:DeleteLoadBalancer",
    "elasticloadbalancing:DeleteLoadBalancerListeners",
    "elasticloadbalancing:DescribeLoadBalancers",
    "elasticloadbalancing:DescribeLoadBalancerAttributes",
    "elasticloadbalancing:DetachLoadBalancerFromSubnets",
    "elasticloadbalancing:DeregisterInstancesFromLoadBalancer",
    "elasticloadbalancing:ModifyLoadBalancerAttributes",
    "elasticloadbalancing:RegisterInstancesWithLoadBalancer",
    "elasticloadbalancing:SetLoadBalancerPoliciesForBackendServer",
    "elasticloadbalancing:AddTags",
    "elasticloadbalancing:CreateListener",
    "elasticloadbalancing:CreateTargetGroup",
    "elasticloadbalancing:DeleteListener",
    "elasticloadbalancing:DeleteTargetGroup",
    "elasticloadbalancing:DeregisterTargets",
    "elasticloadbalancing:DescribeListeners",
    "elasticloadbalancing:DescribeLoadBalancerPolicies",
    "elasticloadbalancing:DescribeTargetGroups",
    "elasticloadbalancing:DescribeTargetHealth",
    "elasticloadbalancing:ModifyListener",
    "elasticloadbalancing:ModifyTargetGroup",
    "elasticloadbalancing:RegisterTargets",
    "elasticloadbalancing:SetLoadBalancerPoliciesOfListener",
    "iam:CreateServiceLinkedRole",
    "kms:DescribeKey",
];

const NODE_ACTIONS: &[&str] = &[
    "ec2:AssignIpv6Addresses",
    "ec2:DescribeInstances",
    "ec2:DescribeRegions",
    "ec2:CreateTags",
    "ec2:DescribeTags",
    "ec2:DescribeNetworkInterfaces",
    "ec2:DescribeInstanceTypes",
    "ecr:GetAuthorizationToken",
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:GetRepositoryPolicy",
    "ecr:DescribeRepositories",
    "ecr:ListImages",
    "ecr:BatchGetImage",
];

const SESSION_MANAGER_ACTIONS: &[&str] = &[
    "ssm:UpdateInstanceInformation",
    "ssmmessages:CreateControlChannel",
    "ssmmessages:CreateDataChannel",
    "ssmmessages:OpenControlChannel",
    "ssmmessages:OpenDataChannel",
    "s3:GetEncryptionConfiguration",
];

pub fn control_plane_policy() -> PolicyDocument {
    PolicyDocument::new(vec![StatementEntry::allow(
        CONTROL_PLANE_ACTIONS.iter().copied(),
        [ANY],
    )])
}

/// Cloud-provider actions, Session Manager access, then bootstrap-data access
/// for each configured secret backend.
pub fn node_policy(spec: &AwsIamConfigurationSpec) -> PolicyDocument {
    let mut document = PolicyDocument::new(vec![
        StatementEntry::allow(NODE_ACTIONS.iter().copied(), [ANY]),
        StatementEntry::allow(SESSION_MANAGER_ACTIONS.iter().copied(), [ANY]),
    ]);
    document.extend(
        spec.secure_secret_backends
            .iter()
            .copied()
            .map(node_secret_statement),
    );
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SecretBackend, with_defaults};

    #[test]
    fn test_control_plane_policy_is_single_wildcard_statement() {
        let document = control_plane_policy();
        assert_eq!(document.statement.len(), 1);
        assert_eq!(document.statement[0].resource.as_slice(), ["*"]);
        assert!(document.statement[0].action.contains("ec2:CreateVolume"));
    }

    #[test]
    fn test_node_policy_follows_backend_order() {
        let spec = with_defaults(&AwsIamConfigurationSpec {
            secure_secret_backends: vec![
                SecretBackend::SsmParameterStore,
                SecretBackend::SecretsManager,
            ],
            ..Default::default()
        });
        let document = node_policy(&spec);
        assert_eq!(document.statement.len(), 4);
        assert!(document.statement[1].action.contains("ssmmessages:OpenDataChannel"));
        assert!(document.statement[2].action.contains("ssm:GetParameter"));
        assert!(document.statement[3].action.contains("secretsmanager:GetSecretValue"));
    }
}
