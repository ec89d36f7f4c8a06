//! Trust (assume-role) policies.

use super::eks::EKS_FARGATE_SERVICE;
use crate::types::{PolicyDocument, PrincipalType, StatementEntry};

/// Allow `sts:AssumeRole` for the given principals of one type.
pub fn assume_role_policy<I, S>(kind: PrincipalType, principal_ids: I) -> PolicyDocument
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    PolicyDocument::new(vec![StatementEntry::allow_principal(
        ["sts:AssumeRole"],
        kind,
        principal_ids,
    )])
}

pub fn ec2_assume_role_policy() -> PolicyDocument {
    aws_service_assume_role_policy("ec2.amazonaws.com")
}

pub fn aws_arn_assume_role_policy(identity_arn: &str) -> PolicyDocument {
    assume_role_policy(PrincipalType::Aws, [identity_arn])
}

pub fn aws_service_assume_role_policy(service: &str) -> PolicyDocument {
    assume_role_policy(PrincipalType::Service, [service])
}

/// Append a role's own trust statements after the generated ones.
pub fn with_trust_statements(
    mut document: PolicyDocument,
    trust_statements: &[StatementEntry],
) -> PolicyDocument {
    document.extend(trust_statements.iter().cloned());
    document
}

/// Trust policy for an EKS control-plane role, optionally also trusted by Fargate.
pub fn eks_control_plane_trust_relationship(enable_fargate: bool) -> PolicyDocument {
    let mut services = vec!["eks.amazonaws.com"];
    if enable_fargate {
        services.push(EKS_FARGATE_SERVICE);
    }
    assume_role_policy(PrincipalType::Service, services)
}

pub fn eks_nodegroup_trust_relationship() -> PolicyDocument {
    assume_role_policy(PrincipalType::Service, ["ec2.amazonaws.com"])
}
