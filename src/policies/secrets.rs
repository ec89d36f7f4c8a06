//! Per-backend secret access statements.

use crate::config::SecretBackend;
use crate::types::StatementEntry;

const SECRETS_MANAGER_RESOURCE: &str = "arn:*:secretsmanager:*:*:secret:aws.cluster.x-k8s.io/*";
const SSM_PARAMETER_RESOURCE: &str = "arn:*:ssm:*:*:parameter/cluster.x-k8s.io/*";

/// What the controllers need to store bootstrap data in `backend`.
pub fn controller_secret_statement(backend: SecretBackend) -> StatementEntry {
    match backend {
        SecretBackend::SecretsManager => StatementEntry::allow(
            [
                "secretsmanager:CreateSecret",
                "secretsmanager:DeleteSecret",
                "secretsmanager:TagResource",
            ],
            [SECRETS_MANAGER_RESOURCE],
        ),
        SecretBackend::SsmParameterStore => StatementEntry::allow(
            [
                "ssm:PutParameter",
                "ssm:DeleteParameter",
                "ssm:AddTagsToResource",
            ],
            [SSM_PARAMETER_RESOURCE],
        ),
    }
}

/// What a node needs to read, then remove, its bootstrap data from `backend`.
pub fn node_secret_statement(backend: SecretBackend) -> StatementEntry {
    match backend {
        SecretBackend::SecretsManager => StatementEntry::allow(
            [
                "secretsmanager:DeleteSecret",
                "secretsmanager:GetSecretValue",
            ],
            [SECRETS_MANAGER_RESOURCE],
        ),
        SecretBackend::SsmParameterStore => StatementEntry::allow(
            ["ssm:DeleteParameter", "ssm:GetParameter"],
            [SSM_PARAMETER_RESOURCE],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resources;

    #[test]
    fn test_controller_and_node_share_resources() {
        for backend in [SecretBackend::SecretsManager, SecretBackend::SsmParameterStore] {
            assert_eq!(
                controller_secret_statement(backend).resource,
                node_secret_statement(backend).resource
            );
        }
    }

    #[test]
    fn test_node_statements_only_read_and_delete() {
        let statement = node_secret_statement(SecretBackend::SsmParameterStore);
        assert!(statement.action.contains("ssm:GetParameter"));
        assert!(!statement.action.contains("ssm:PutParameter"));
        assert_eq!(
            statement.resource,
            Resources::new(["arn:*:ssm:*:*:parameter/cluster.x-k8s.io/*"])
        );
    }
}
