use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::types::{StatementEntry, Tags};

pub const API_VERSION: &str = "bootstrap.aws.infrastructure.cluster.x-k8s.io/v1beta1";
pub const KIND: &str = "AWSIAMConfiguration";

static DISABLED_ROLE: Lazy<AwsIamRoleSpec> = Lazy::new(|| AwsIamRoleSpec {
    disable: true,
    ..Default::default()
});

static DEFAULT_EKS: Lazy<EksConfig> = Lazy::new(EksConfig::default);

static DEFAULT_EVENT_BRIDGE: Lazy<EventBridgeConfig> = Lazy::new(EventBridgeConfig::default);

/// Where cluster secrets such as bootstrap userdata are stored.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SecretBackend {
    SecretsManager,
    SsmParameterStore,
}

/// Options shared by every role the template can create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwsIamRoleSpec {
    pub disable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_policy_attachments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_statements: Vec<StatementEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trust_statements: Vec<StatementEntry>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlPlane {
    #[serde(flatten)]
    pub role: AwsIamRoleSpec,
    /// Do not attach the controllers policy to the control-plane role.
    #[serde(rename = "disableClusterAPIControllerPolicyAttachment")]
    pub disable_cluster_api_controller_policy_attachment: bool,
    pub disable_cloud_provider_policy: bool,
    #[serde(rename = "enableCSIPolicy")]
    pub enable_csi_policy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterApiControllers {
    #[serde(flatten)]
    pub role: AwsIamRoleSpec,
    /// Instance profiles the controllers may pass to EC2. When unset, every
    /// profile following the managed naming convention is allowed.
    #[serde(
        rename = "allowedEC2InstanceProfiles",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_ec2_instance_profiles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Nodes {
    #[serde(flatten)]
    pub role: AwsIamRoleSpec,
    pub disable_cloud_provider_policy: bool,
    #[serde(rename = "ec2ContainerRegistryReadOnly")]
    pub ec2_container_registry_read_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BootstrapUser {
    pub enable: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group_name: String,
    /// Accepted but not attached; the user carries the control plane's attachments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_policy_attachments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_groups: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_statements: Vec<StatementEntry>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EksConfig {
    pub disable: bool,
    /// Let the controllers create per-cluster IAM roles.
    pub iam_role_creation: bool,
    pub default_control_plane_role: AwsIamRoleSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_machine_pool: Option<AwsIamRoleSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fargate: Option<AwsIamRoleSpec>,
    #[serde(rename = "kmsAliasPrefix", skip_serializing_if = "String::is_empty")]
    pub kms_alias_prefix: String,
    #[serde(rename = "enableUserEKSConsolePolicy")]
    pub enable_user_eks_console_policy: bool,
}

impl EksConfig {
    pub fn managed_machine_pool(&self) -> &AwsIamRoleSpec {
        self.managed_machine_pool.as_ref().unwrap_or(&DISABLED_ROLE)
    }

    pub fn fargate(&self) -> &AwsIamRoleSpec {
        self.fargate.as_ref().unwrap_or(&DISABLED_ROLE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventBridgeConfig {
    pub enable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct S3Buckets {
    pub enable: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_prefix: String,
}

/// The root of the bootstrap configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AwsIamConfigurationSpec {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    pub control_plane: ControlPlane,
    #[serde(rename = "clusterAPIControllers")]
    pub cluster_api_controllers: ClusterApiControllers,
    pub nodes: Nodes,
    pub bootstrap_user: BootstrapUser,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stack_name: String,
    /// Tags for the CloudFormation stack itself, applied by whoever deploys it.
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub stack_tags: Tags,
    /// Region the stack is deployed to. Read by the deployer, not by rendering.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub partition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eks: Option<EksConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_bridge: Option<EventBridgeConfig>,
    pub s3_buckets: S3Buckets,
    pub allow_assume_role: bool,
    #[serde(rename = "secureSecretBackends", skip_serializing_if = "Vec::is_empty")]
    pub secure_secret_backends: Vec<SecretBackend>,
}

impl AwsIamConfigurationSpec {
    pub fn name_suffix(&self) -> &str {
        self.name_suffix.as_deref().unwrap_or_default()
    }

    /// The EKS section, or an enabled default one when absent.
    pub fn eks(&self) -> &EksConfig {
        self.eks.as_ref().unwrap_or(&DEFAULT_EKS)
    }

    pub fn eks_enabled(&self) -> bool {
        !self.eks().disable
    }

    pub fn event_bridge(&self) -> &EventBridgeConfig {
        self.event_bridge.as_ref().unwrap_or(&DEFAULT_EVENT_BRIDGE)
    }

    /// A managed resource name: `namePrefix + base + nameSuffix`.
    pub fn managed_name(&self, base: &str) -> String {
        format!("{}{}{}", self.name_prefix, base, self.name_suffix())
    }

    /// Role ARN patterns the controllers may pass to EC2 instances.
    ///
    /// Reads `allowedEC2InstanceProfiles` without writing the fallback back
    /// into the configuration.
    pub fn allowed_ec2_instance_profiles(&self) -> Vec<String> {
        match &self.cluster_api_controllers.allowed_ec2_instance_profiles {
            Some(profiles) => profiles
                .iter()
                .map(|profile| format!("arn:*:iam::*:role/{profile}"))
                .collect(),
            None => vec![format!("arn:*:iam::*:role/{}", self.managed_name("*"))],
        }
    }
}

/// A full configuration document, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsIamConfiguration {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub spec: AwsIamConfigurationSpec,
}

impl Default for AwsIamConfiguration {
    fn default() -> Self {
        AwsIamConfiguration {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            spec: AwsIamConfigurationSpec::default(),
        }
    }
}
