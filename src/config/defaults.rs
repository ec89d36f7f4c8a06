//! Defaulting for bootstrap configuration.
//!
//! Defaulting only fills holes: a field the caller set is never overwritten,
//! and the input is never modified.

use tracing::debug;

use super::spec::{
    AwsIamConfigurationSpec, AwsIamRoleSpec, EksConfig, EventBridgeConfig, SecretBackend,
};

pub const DEFAULT_NAME_SUFFIX: &str = ".cluster-api-provider-aws.sigs.k8s.io";
pub const DEFAULT_STACK_NAME: &str = "cluster-api-provider-aws-sigs-k8s-io";
pub const DEFAULT_BOOTSTRAP_USER_NAME: &str = "bootstrapper.cluster-api-provider-aws.sigs.k8s.io";
pub const DEFAULT_BOOTSTRAP_GROUP_NAME: &str = "bootstrapper.cluster-api-provider-aws.sigs.k8s.io";
pub const DEFAULT_PARTITION: &str = "aws";
pub const DEFAULT_KMS_ALIAS_PREFIX: &str = "cluster-api-provider-aws-*";
pub const DEFAULT_S3_BUCKET_PREFIX: &str = "cluster-api-provider-aws-";

/// Return a copy of `spec` with every unset field given its default.
///
/// Applying this twice gives the same result as applying it once.
pub fn with_defaults(spec: &AwsIamConfigurationSpec) -> AwsIamConfigurationSpec {
    let mut out = spec.clone();

    if out.name_suffix.is_none() {
        out.name_suffix = Some(DEFAULT_NAME_SUFFIX.to_string());
    }
    if out.stack_name.is_empty() {
        out.stack_name = DEFAULT_STACK_NAME.to_string();
    }
    if out.partition.is_empty() {
        out.partition = DEFAULT_PARTITION.to_string();
    }
    if out.bootstrap_user.user_name.is_empty() {
        out.bootstrap_user.user_name = DEFAULT_BOOTSTRAP_USER_NAME.to_string();
    }
    if out.bootstrap_user.group_name.is_empty() {
        out.bootstrap_user.group_name = DEFAULT_BOOTSTRAP_GROUP_NAME.to_string();
    }
    if out.secure_secret_backends.is_empty() {
        out.secure_secret_backends = vec![SecretBackend::SecretsManager];
    }
    if out.s3_buckets.name_prefix.is_empty() {
        out.s3_buckets.name_prefix = DEFAULT_S3_BUCKET_PREFIX.to_string();
    }
    if out.event_bridge.is_none() {
        out.event_bridge = Some(EventBridgeConfig::default());
    }

    let eks = out.eks.get_or_insert_with(EksConfig::default);
    if eks.managed_machine_pool.is_none() {
        eks.managed_machine_pool = Some(disabled_role());
    }
    if eks.fargate.is_none() {
        eks.fargate = Some(disabled_role());
    }
    if eks.kms_alias_prefix.is_empty() {
        eks.kms_alias_prefix = DEFAULT_KMS_ALIAS_PREFIX.to_string();
    }

    debug!(
        event = "Defaults",
        phase = "Applied",
        stack_name = %out.stack_name,
        partition = %out.partition,
        eks_enabled = out.eks_enabled(),
    );

    out
}

fn disabled_role() -> AwsIamRoleSpec {
    AwsIamRoleSpec {
        disable: true,
        ..Default::default()
    }
}
