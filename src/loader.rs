use tracing::debug;

use crate::config::{AwsIamConfiguration, KIND, with_defaults};
use crate::error::BootstrapError;

/// Parse an `AWSIAMConfiguration` document and apply defaults.
///
/// The input may be YAML or JSON. A document with a different `kind` is
/// rejected with `BootstrapError::UnsupportedKind`.
///
/// Example:
/// ```rust
/// use capa_iam_bootstrap::load_configuration;
/// let text = r#"
/// apiVersion: bootstrap.aws.infrastructure.cluster.x-k8s.io/v1beta1
/// kind: AWSIAMConfiguration
/// spec:
///   bootstrapUser:
///     enable: true
/// "#;
/// let config = load_configuration(text).unwrap();
/// assert!(config.spec.bootstrap_user.enable);
/// assert_eq!(config.spec.stack_name, "cluster-api-provider-aws-sigs-k8s-io");
/// ```
pub fn load_configuration(text: &str) -> Result<AwsIamConfiguration, BootstrapError> {
    let mut config: AwsIamConfiguration = serde_yaml::from_str(text)?;
    if config.kind != KIND {
        return Err(BootstrapError::UnsupportedKind {
            found: config.kind,
            expected: KIND.to_string(),
        });
    }
    debug!(
        event = "LoadConfiguration",
        phase = "Parsed",
        api_version = %config.api_version,
    );
    config.spec = with_defaults(&config.spec);
    Ok(config)
}
