use super::*;
use crate::cloudformation::Resource;
use crate::config::{BootstrapUser, EksConfig};
use crate::traits::CloudFormationResource;

mod output;

const ALWAYS_PRESENT: &[&str] = &[
    "AWSIAMManagedPolicyControllers",
    "AWSIAMRoleControlPlane",
    "AWSIAMRoleControllers",
    "AWSIAMRoleNodes",
    "AWSIAMInstanceProfileControlPlane",
    "AWSIAMInstanceProfileControllers",
    "AWSIAMInstanceProfileNodes",
];

fn render(spec: AwsIamConfigurationSpec) -> CloudFormationTemplate {
    Template::new(&spec).render_cloudformation()
}

fn logical_ids(template: &CloudFormationTemplate) -> Vec<&str> {
    template.resources.keys().map(String::as_str).collect()
}

fn role<'a>(template: &'a CloudFormationTemplate, logical_id: &str) -> &'a Role {
    match template.get(logical_id) {
        Some(Resource::Role(role)) => role,
        other => panic!("{logical_id} is not a role: {other:?}"),
    }
}

fn managed_policy<'a>(template: &'a CloudFormationTemplate, logical_id: &str) -> &'a ManagedPolicy {
    match template.get(logical_id) {
        Some(Resource::ManagedPolicy(policy)) => policy,
        other => panic!("{logical_id} is not a managed policy: {other:?}"),
    }
}

fn refs(items: &[NameOrRef]) -> Vec<&str> {
    items.iter().filter_map(NameOrRef::as_ref_id).collect()
}

#[test]
fn test_default_template_resources() {
    let template = render(AwsIamConfigurationSpec::default());
    assert_eq!(
        logical_ids(&template),
        vec![
            "AWSIAMInstanceProfileControlPlane",
            "AWSIAMInstanceProfileControllers",
            "AWSIAMInstanceProfileNodes",
            "AWSIAMManagedPolicyCloudProviderControlPlane",
            "AWSIAMManagedPolicyCloudProviderNodes",
            "AWSIAMManagedPolicyControllers",
            "AWSIAMManagedPolicyControllersEKS",
            "AWSIAMRoleControlPlane",
            "AWSIAMRoleControllers",
            "AWSIAMRoleEKSControlPlane",
            "AWSIAMRoleNodes",
        ]
    );
    assert!(template.dangling_references().is_empty());
}

#[test]
fn test_template_does_not_change_callers_spec() {
    let spec = AwsIamConfigurationSpec::default();
    let template = Template::new(&spec);
    let _ = template.render_cloudformation();
    assert!(spec.name_suffix.is_none());
    assert!(spec.cluster_api_controllers.allowed_ec2_instance_profiles.is_none());
    assert_eq!(template.spec().stack_name, "cluster-api-provider-aws-sigs-k8s-io");
}

#[test]
fn test_managed_names() {
    let template = Template::new(&AwsIamConfigurationSpec {
        name_prefix: "acme-".to_string(),
        ..Default::default()
    });
    let rendered = template.render_cloudformation();

    assert_eq!(
        role(&rendered, AWS_IAM_ROLE_NODES).role_name,
        "acme-nodes.cluster-api-provider-aws.sigs.k8s.io"
    );
    assert_eq!(
        managed_policy(&rendered, "AWSIAMManagedPolicyCloudProviderControlPlane").managed_policy_name,
        "acme-control-plane.cluster-api-provider-aws.sigs.k8s.io"
    );
    match rendered.get(AWS_IAM_INSTANCE_PROFILE_CONTROLLERS) {
        Some(Resource::InstanceProfile(profile)) => {
            assert_eq!(
                profile.instance_profile_name,
                "acme-controllers.cluster-api-provider-aws.sigs.k8s.io"
            );
            assert_eq!(refs(&profile.roles), vec![AWS_IAM_ROLE_CONTROLLERS]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_every_reference_resolves_with_everything_enabled() {
    let mut spec = AwsIamConfigurationSpec {
        bootstrap_user: BootstrapUser {
            enable: true,
            ..Default::default()
        },
        eks: Some(EksConfig {
            enable_user_eks_console_policy: true,
            managed_machine_pool: Some(AwsIamRoleSpec::default()),
            fargate: Some(AwsIamRoleSpec::default()),
            ..Default::default()
        }),
        ..Default::default()
    };
    spec.control_plane.enable_csi_policy = true;

    let template = render(spec);
    assert_eq!(template.len(), 17);
    for (id, resource) in &template.resources {
        for target in resource.references() {
            assert!(template.contains(target), "{id} refers to missing {target}");
        }
    }
}
