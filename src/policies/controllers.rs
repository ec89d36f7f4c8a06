//! Policies for the Cluster API controllers.

use super::aws_managed_policy_arn;
use super::eks::EKS_CLUSTER_POLICY;
use super::secrets::controller_secret_statement;
use crate::config::AwsIamConfigurationSpec;
use crate::types::{ANY, ConditionOperator, PolicyDocument, StatementEntry};

const CONTROLLERS_ACTIONS: &[&str] = &[
    "ec2:DescribeIpamPools",
    "ec2:AllocateIpamPoolCidr",
    "ec2:AttachNetworkInterface",
    "ec2:DetachNetworkInterface",
    "ec2:AllocateAddress",
    "ec2:AssignIpv6Addresses",
    "ec2:AssignPrivateIpAddresses",
    "ec2:UnassignPrivateIpAddresses",
    "ec2:AssociateRouteTable",
    "ec2:AssociateVpcCidrBlock",
    "ec2:AttachInternetGateway",
    "ec2:AuthorizeSecurityGroupIngress",
    "ec2:CreateCarrierGateway",
    "ec2:CreateInternetGateway",
    "ec2:CreateEgressOnlyInternetGateway",
    "ec2:CreateNatGateway",
    "ec2:CreateNetworkInterface",
    "ec2:CreateRoute",
    "ec2:CreateRouteTable",
    "ec2:CreateSecurityGroup",
    "ec2:CreateSubnet",
    "ec2:CreateTags",
    "ec2:CreateVpc",
    "ec2:CreateVpcEndpoint",
    "ec2:DisassociateVpcCidrBlock",
    "ec2:ModifyVpcAttribute",
    "ec2:ModifyVpcEndpoint",
    "ec2:DeleteCarrierGateway",
    "ec2:DeleteInternetGateway",
    "ec2:DeleteEgressOnlyInternetGateway",
    "ec2:DeleteNatGateway",
    "ec2:DeleteRouteTable",
    "ec2:ReplaceRoute",
    "ec2:DeleteSecurityGroup",
    "ec2:DeleteSubnet",
    "ec2:DeleteTags",
    "ec2:DeleteVpc",
    "ec2:DeleteVpcEndpoints",
    "ec2:DescribeAccountAttributes",
    "ec2:DescribeAddresses",
    "ec2:DescribeAvailabilityZones",
    "ec2:DescribeCarrierGateways",
    "ec2:DescribeInstances",
    "ec2:DescribeInstanceTypes",
    "ec2:DescribeInternetGateways",
    "ec2:DescribeEgressOnlyInternetGateways",
    "ec2:DescribeInstanceTypes",
    "ec2:DescribeImages",
    "ec2:DescribeNatGateways",
    "ec2:DescribeNetworkInterfaces",
    "ec2:DescribeNetworkInterfaceAttribute",
    "ec2:DescribeRouteTables",
    "ec2:DescribeSecurityGroups",
    "ec2:DescribeSubnets",
    "ec2:DescribeVpcs",
    "ec2:DescribeDhcpOptions",
    "ec2:DescribeVpcAttribute",
    "ec2:DescribeVpcEndpoints",
    "ec2:DescribeVolumes",
    "ec2:DescribeTags",
    "ec2:DetachInternetGateway",
    "ec2:DisassociateRouteTable",
    "ec2:DisassociateAddress",
    "ec2:ModifyInstanceAttribute",
    "ec2:ModifyNetworkInterfaceAttribute",
    "ec2:ModifySubnetAttribute",
    "ec2:ReleaseAddress",
    "ec2:RevokeSecurityGroupIngress",
    "ec2:RunInstances",
    "ec2:TerminateInstances",
    "tag:GetResources",
    "elasticloadbalancing:AddTags",
    "elasticloadbalancing:CreateLoadBalancer",
    "elasticloadbalancing:ConfigureHealthCheck",
    "elasticloadbalancing:DeleteLoadBalancer",
    "elasticloadbalancing:DeleteTargetGroup",
    "elasticloadbalancing:DescribeLoadBalancers",
    "elasticloadbalancing:DescribeLoadBalancerAttributes",
    "elasticloadbalancing:DescribeTargetGroups",
    "elasticloadbalancing:ApplySecurityGroupsToLoadBalancer",
    "elasticloadbalancing:SetSecurityGroups",
    "elasticloadbalancing:DescribeTags",
    "elasticloadbalancing:ModifyLoadBalancerAttributes",
    "elasticloadbalancing:RegisterInstancesWithLoadBalancer",
    "elasticloadbalancing:DeregisterInstancesFromLoadBalancer",
    "elasticloadbalancing:RemoveTags",
    "elasticloadbalancing:SetSubnets",
    "elasticloadbalancing:ModifyTargetGroupAttributes",
    "elasticloadbalancing:CreateTargetGroup",
    "elasticloadbalancing:DescribeListeners",
    "elasticloadbalancing:CreateListener",
    "elasticloadbalancing:DescribeTargetHealth",
    "elasticloadbalancing:RegisterTargets",
    "elasticloadbalancing:DeleteListener",
    "autoscaling:DescribeAutoScalingGroups",
    "autoscaling:DescribeInstanceRefreshes",
    "ec2:CreateLaunchTemplate",
    "ec2:CreateLaunchTemplateVersion",
    "ec2:DescribeLaunchTemplates",
    "ec2:DescribeLaunchTemplateVersions",
    "ec2:DeleteLaunchTemplate",
    "ec2:DeleteLaunchTemplateVersions",
    "ec2:DescribeKeyPairs",
    "ec2:ModifyInstanceMetadataOptions",
];

const AUTOSCALING_GROUP_ACTIONS: &[&str] = &[
    "autoscaling:CreateAutoScalingGroup",
    "autoscaling:UpdateAutoScalingGroup",
    "autoscaling:CreateOrUpdateTags",
    "autoscaling:StartInstanceRefresh",
    "autoscaling:DeleteAutoScalingGroup",
    "autoscaling:DeleteTags",
];

const S3_BUCKET_ACTIONS: &[&str] = &[
    "s3:CreateBucket",
    "s3:DeleteBucket",
    "s3:GetObject",
    "s3:PutObject",
    "s3:DeleteObject",
    "s3:PutBucketPolicy",
    "s3:PutBucketTagging",
];

const EVENT_BRIDGE_ACTIONS: &[&str] = &[
    "events:DeleteRule",
    "events:DescribeRule",
    "events:ListTargetsByRule",
    "events:PutRule",
    "events:PutTargets",
    "events:RemoveTargets",
    "sqs:CreateQueue",
    "sqs:DeleteMessage",
    "sqs:DeleteQueue",
    "sqs:GetQueueAttributes",
    "sqs:GetQueueUrl",
    "sqs:ReceiveMessage",
    "sqs:SetQueueAttributes",
];

const EKS_CLUSTER_ACTIONS: &[&str] = &[
    "eks:DescribeCluster",
    "eks:ListClusters",
    "eks:CreateCluster",
    "eks:TagResource",
    "eks:UpdateClusterVersion",
    "eks:DeleteCluster",
    "eks:UpdateClusterConfig",
    "eks:UntagResource",
    "eks:UpdateNodegroupVersion",
    "eks:DescribeNodegroup",
    "eks:DeleteNodegroup",
    "eks:UpdateNodegroupConfig",
    "eks:CreateNodegroup",
    "eks:AssociateEncryptionConfig",
    "eks:ListIdentityProviderConfigs",
    "eks:AssociateIdentityProviderConfig",
    "eks:DescribeIdentityProviderConfig",
    "eks:DisassociateIdentityProviderConfig",
];

const EKS_CLUSTER_RESOURCES: [&str; 2] = ["arn:*:eks:*:*:cluster/*", "arn:*:eks:*:*:nodegroup/*/*/*"];

const EKS_ADDON_ACTIONS: &[&str] = &[
    "ec2:AssociateVpcCidrBlock",
    "ec2:DisassociateVpcCidrBlock",
    "eks:ListAddons",
    "eks:CreateAddon",
    "eks:DescribeAddonVersions",
    "eks:DescribeAddon",
    "eks:DeleteAddon",
    "eks:UpdateAddon",
    "eks:TagResource",
    "eks:DescribeFargateProfile",
    "eks:CreateFargateProfile",
    "eks:DeleteFargateProfile",
];

const IAM_ROLE_READ_ACTIONS: &[&str] = &["iam:GetRole", "iam:ListAttachedRolePolicies"];

const IAM_ROLE_WRITE_ACTIONS: &[&str] = &[
    "iam:DetachRolePolicy",
    "iam:DeleteRole",
    "iam:CreateRole",
    "iam:TagRole",
    "iam:AttachRolePolicy",
];

const OIDC_PROVIDER_ACTIONS: &[&str] = &[
    "iam:ListOpenIDConnectProviders",
    "iam:GetOpenIDConnectProvider",
    "iam:CreateOpenIDConnectProvider",
    "iam:AddClientIDToOpenIDConnectProvider",
    "iam:UpdateOpenIDConnectProviderThumbprint",
    "iam:DeleteOpenIDConnectProvider",
    "iam:TagOpenIDConnectProvider",
];

const EKS_OPTIMIZED_AMI_PARAMETERS: &str = "arn:*:ssm:*:*:parameter/aws/service/eks/optimized-ami/*";

/// `iam:CreateServiceLinkedRole` for one AWS service's linked role.
fn service_linked_role(role_arn: &str, service: &str) -> StatementEntry {
    StatementEntry::allow(["iam:CreateServiceLinkedRole"], [role_arn]).with_condition(
        ConditionOperator::string_like(),
        "iam:AWSServiceName",
        service,
    )
}

fn pass_role_to_eks() -> StatementEntry {
    StatementEntry::allow(["iam:PassRole"], [ANY]).with_condition(
        ConditionOperator::string_equals(),
        "iam:PassedToService",
        "eks.amazonaws.com",
    )
}

fn base_statements() -> Vec<StatementEntry> {
    vec![
        StatementEntry::allow(CONTROLLERS_ACTIONS.iter().copied(), [ANY]),
        StatementEntry::allow(
            AUTOSCALING_GROUP_ACTIONS.iter().copied(),
            ["arn:*:autoscaling:*:*:autoScalingGroup:*:autoScalingGroupName/*"],
        ),
        service_linked_role(
            "arn:*:iam::*:role/aws-service-role/autoscaling.amazonaws.com/AWSServiceRoleForAutoScaling",
            "autoscaling.amazonaws.com",
        ),
        service_linked_role(
            "arn:*:iam::*:role/aws-service-role/elasticloadbalancing.amazonaws.com/AWSServiceRoleForElasticLoadBalancing",
            "elasticloadbalancing.amazonaws.com",
        ),
        service_linked_role(
            "arn:*:iam::*:role/aws-service-role/spot.amazonaws.com/AWSServiceRoleForEC2Spot",
            "spot.amazonaws.com",
        ),
    ]
}

/// Statements that only apply when EKS support is enabled.
fn eks_statements(spec: &AwsIamConfigurationSpec) -> Vec<StatementEntry> {
    let mut statements = vec![StatementEntry::allow(
        ["ssm:GetParameter"],
        [EKS_OPTIMIZED_AMI_PARAMETERS],
    )];
    if spec.eks().iam_role_creation {
        statements.push(StatementEntry::allow(
            IAM_ROLE_READ_ACTIONS
                .iter()
                .chain(IAM_ROLE_WRITE_ACTIONS)
                .copied(),
            [format!("arn:{}:iam::*:role/*", spec.partition)],
        ));
    }
    statements.push(StatementEntry::allow(
        EKS_CLUSTER_ACTIONS.iter().copied(),
        EKS_CLUSTER_RESOURCES,
    ));
    statements.push(pass_role_to_eks());
    statements
}

/// The controllers managed policy.
///
/// Statements are emitted in a fixed order: the base set, one statement per
/// secret backend in configured order, the optional assume-role, S3 and
/// EventBridge grants, the EKS block, `iam:PassRole` on the allowed instance
/// profiles, and finally the caller's extra statements.
pub fn controllers_policy(spec: &AwsIamConfigurationSpec) -> PolicyDocument {
    let mut statements = base_statements();

    statements.extend(
        spec.secure_secret_backends
            .iter()
            .copied()
            .map(controller_secret_statement),
    );

    let instance_profiles = spec.allowed_ec2_instance_profiles();

    if spec.allow_assume_role {
        statements.push(StatementEntry::allow(
            ["sts:AssumeRole"],
            instance_profiles.iter().map(String::as_str),
        ));
    }
    if spec.s3_buckets.enable {
        statements.push(StatementEntry::allow(
            S3_BUCKET_ACTIONS.iter().copied(),
            [format!("arn:*:s3:::{}*", spec.s3_buckets.name_prefix)],
        ));
    }
    if spec.event_bridge().enable {
        statements.push(StatementEntry::allow(
            EVENT_BRIDGE_ACTIONS.iter().copied(),
            [ANY],
        ));
    }

    if spec.eks_enabled() {
        statements.extend(eks_statements(spec));
    }

    statements.push(StatementEntry::allow(["iam:PassRole"], instance_profiles));
    statements.extend(spec.cluster_api_controllers.role.extra_statements.iter().cloned());

    PolicyDocument::new(statements)
}

/// The EKS controllers managed policy.
pub fn controllers_eks_policy(spec: &AwsIamConfigurationSpec) -> PolicyDocument {
    let eks = spec.eks();
    let mut statements = vec![
        StatementEntry::allow(["ssm:GetParameter"], [EKS_OPTIMIZED_AMI_PARAMETERS]),
        service_linked_role(
            "arn:*:iam::*:role/aws-service-role/eks.amazonaws.com/AWSServiceRoleForAmazonEKS",
            "eks.amazonaws.com",
        ),
        service_linked_role(
            "arn:*:iam::*:role/aws-service-role/eks-nodegroup.amazonaws.com/AWSServiceRoleForAmazonEKSNodegroup",
            "eks-nodegroup.amazonaws.com",
        ),
        service_linked_role(
            &format!(
                "arn:{}:iam::*:role/aws-service-role/eks-fargate-pods.amazonaws.com/AWSServiceRoleForAmazonEKSForFargate",
                spec.partition
            ),
            "eks-fargate.amazonaws.com",
        ),
    ];

    let mut role_actions: Vec<&str> = IAM_ROLE_READ_ACTIONS.to_vec();
    if eks.iam_role_creation {
        role_actions.extend_from_slice(IAM_ROLE_WRITE_ACTIONS);
        statements.push(StatementEntry::allow(
            OIDC_PROVIDER_ACTIONS.iter().copied(),
            [ANY],
        ));
    }

    statements.extend([
        StatementEntry::allow(role_actions, ["arn:*:iam::*:role/*"]),
        StatementEntry::allow(
            ["iam:GetPolicy"],
            [aws_managed_policy_arn(&spec.partition, EKS_CLUSTER_POLICY)],
        ),
        StatementEntry::allow(EKS_CLUSTER_ACTIONS.iter().copied(), EKS_CLUSTER_RESOURCES),
        StatementEntry::allow(EKS_ADDON_ACTIONS.iter().copied(), [ANY]),
        pass_role_to_eks(),
        StatementEntry::allow(["kms:CreateGrant", "kms:DescribeKey"], [ANY]).with_condition(
            ConditionOperator::for_any_value_string_like(),
            "kms:ResourceAliases",
            format!("alias/{}", eks.kms_alias_prefix),
        ),
    ]);

    PolicyDocument::new(statements)
}
