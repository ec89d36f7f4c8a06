//! Bootstrap configuration: which roles, users and policies to create.

mod defaults;
mod spec;

pub use defaults::{
    DEFAULT_BOOTSTRAP_GROUP_NAME, DEFAULT_BOOTSTRAP_USER_NAME, DEFAULT_KMS_ALIAS_PREFIX,
    DEFAULT_NAME_SUFFIX, DEFAULT_PARTITION, DEFAULT_S3_BUCKET_PREFIX, DEFAULT_STACK_NAME,
    with_defaults,
};
pub use spec::{
    API_VERSION, AwsIamConfiguration, AwsIamConfigurationSpec, AwsIamRoleSpec, BootstrapUser,
    ClusterApiControllers, ControlPlane, EksConfig, EventBridgeConfig, KIND, Nodes, S3Buckets,
    SecretBackend,
};
