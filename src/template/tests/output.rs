use std::fs;

use super::*;
use crate::convert::policy_document_from_json;
use crate::loader::load_configuration;
use crate::types::Tags;

const CONFIG: &str = r#"
apiVersion: bootstrap.aws.infrastructure.cluster.x-k8s.io/v1beta1
kind: AWSIAMConfiguration
spec:
  namePrefix: team-
  stackName: team-bootstrap
  stackTags:
    owner: platform
  controlPlane:
    enableCSIPolicy: true
    extraPolicyAttachments:
      - arn:aws:iam::123456789012:policy/control-plane-extra
    extraStatements:
      - Effect: Allow
        Action: ["logs:PutLogEvents"]
        Resource: ["*"]
  nodes:
    extraStatements:
      - Effect: Allow
        Action: ["s3:GetObject"]
        Resource: ["arn:aws:s3:::team-artifacts/*"]
  bootstrapUser:
    enable: true
    extraGroups: [admins, auditors]
    extraPolicyAttachments:
      - arn:aws:iam::123456789012:policy/bootstrap-extra
    extraStatements:
      - Effect: Allow
        Action: ["iam:GetUser"]
        Resource: ["*"]
  eks:
    fargate:
      disable: false
"#;

fn configured() -> Template {
    let config = load_configuration(CONFIG).unwrap();
    Template::new(&config.spec)
}

#[test]
fn test_rendering_is_deterministic() {
    let first = configured().render_cloudformation().to_yaml().unwrap();
    let second = configured().render_cloudformation().to_yaml().unwrap();
    assert_eq!(first, second);

    let parsed: CloudFormationTemplate = serde_yaml::from_str(&first).unwrap();
    assert_eq!(parsed, configured().render_cloudformation());
}

#[test]
fn test_stack_tags_are_not_rendered() {
    let template = configured();
    assert_eq!(
        template.spec().stack_tags.get("owner").map(String::as_str),
        Some("platform")
    );
    let yaml = template.render_cloudformation().to_yaml().unwrap();
    assert!(!yaml.contains("platform"));
}

#[test]
fn test_bootstrap_user() {
    let template = configured().render_cloudformation();

    let user = match template.get(AWS_IAM_USER_BOOTSTRAPPER) {
        Some(Resource::User(user)) => user,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(user.user_name, "bootstrapper.cluster-api-provider-aws.sigs.k8s.io");
    assert_eq!(
        user.groups,
        vec![
            NameOrRef::from("admins".to_string()),
            NameOrRef::from("auditors".to_string()),
            NameOrRef::reference(AWS_IAM_GROUP_BOOTSTRAPPER),
        ]
    );
    assert_eq!(
        user.managed_policy_arns,
        vec!["arn:aws:iam::123456789012:policy/control-plane-extra"]
    );
    assert_eq!(user.policies.len(), 1);
    assert_eq!(user.policies[0].policy_name, "team-bootstrap");

    match template.get(AWS_IAM_GROUP_BOOTSTRAPPER) {
        Some(Resource::Group(group)) => {
            assert_eq!(group.group_name, "bootstrapper.cluster-api-provider-aws.sigs.k8s.io")
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_extra_statements_become_inline_policies() {
    let template = configured().render_cloudformation();

    let control_plane = role(&template, AWS_IAM_ROLE_CONTROL_PLANE);
    assert_eq!(control_plane.policies.len(), 1);
    assert_eq!(control_plane.policies[0].policy_name, "team-bootstrap");
    assert!(
        control_plane.policies[0].policy_document.statement[0]
            .action
            .contains("logs:PutLogEvents")
    );

    let nodes = role(&template, AWS_IAM_ROLE_NODES);
    assert_eq!(nodes.policies[0].policy_name, "team-bootstrap");
    assert!(
        nodes.policies[0].policy_document.statement[0]
            .resource
            .contains("arn:aws:s3:::team-artifacts/*")
    );

    assert!(role(&template, AWS_IAM_ROLE_CONTROLLERS).policies.is_empty());
    assert!(role(&template, AWS_IAM_ROLE_EKS_FARGATE).policies.is_empty());
}

#[test]
fn test_controllers_extra_statements_join_the_managed_policy() {
    let mut spec = AwsIamConfigurationSpec::default();
    spec.cluster_api_controllers.role.extra_statements =
        vec![StatementEntry::allow(["sqs:ReceiveMessage"], ["*"])];
    let template = Template::new(&spec);
    let rendered = template.render_cloudformation();

    let document = &managed_policy(&rendered, "AWSIAMManagedPolicyControllers").policy_document;
    assert_eq!(document, &template.controllers_policy());
    assert_eq!(
        document.statement.last(),
        spec.cluster_api_controllers.role.extra_statements.first()
    );
    assert!(role(&rendered, AWS_IAM_ROLE_CONTROLLERS).policies.is_empty());
}

#[test]
fn test_role_tags_and_trust_statements() {
    let mut spec = AwsIamConfigurationSpec::default();
    spec.nodes.role.tags = Tags::from([("team".to_string(), "infra".to_string())]);
    spec.nodes.role.trust_statements = vec![StatementEntry::allow_principal(
        ["sts:AssumeRole"],
        PrincipalType::Aws,
        ["arn:aws:iam::123456789012:root"],
    )];
    let template = render(spec);

    let nodes = role(&template, AWS_IAM_ROLE_NODES);
    assert_eq!(nodes.tags, vec![crate::types::Tag::new("team", "infra")]);
    assert_eq!(nodes.assume_role_policy_document.statement.len(), 2);
    assert!(
        nodes.assume_role_policy_document.statement[1]
            .principal
            .as_ref()
            .and_then(|principals| principals.get(PrincipalType::Aws))
            .is_some()
    );
}

#[test]
fn test_write_policy_documents() {
    let dir = tempfile::tempdir().unwrap();
    let template = configured();
    template.write_policy_documents(dir.path()).unwrap();

    let mut written: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(
        written,
        vec![
            "AWSEBSCSIPolicyController.json",
            "AWSIAMManagedPolicyCloudProviderControlPlane.json",
            "AWSIAMManagedPolicyCloudProviderNodes.json",
            "AWSIAMManagedPolicyControllers.json",
        ]
    );

    for name in PolicyName::iter() {
        let text = fs::read_to_string(dir.path().join(format!("{name}.json"))).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(policy_document_from_json(&text).unwrap(), template.policy_document(name));
    }
}

#[test]
fn test_write_policy_documents_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("AWSIAMManagedPolicyControllers.json");
    fs::write(&path, "stale content that is longer than nothing at all").unwrap();

    Template::default().write_policy_documents(dir.path()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        policy_document_from_json(&text).unwrap(),
        Template::default().controllers_policy()
    );
}

#[cfg(unix)]
#[test]
fn test_policy_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().join("AWSIAMManagedPolicyCloudProviderNodes.json");
    fs::write(&existing, "{}").unwrap();
    fs::set_permissions(&existing, fs::Permissions::from_mode(0o644)).unwrap();

    Template::default().write_policy_documents(dir.path()).unwrap();

    for name in PolicyName::iter() {
        let metadata = fs::metadata(dir.path().join(format!("{name}.json"))).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600, "{name}");
    }
}

#[test]
fn test_write_policy_documents_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");

    let err = Template::default()
        .write_policy_documents(&missing)
        .unwrap_err();
    match err {
        BootstrapError::WritePolicyDocument { policy, path, .. } => {
            assert_eq!(policy, PolicyName::ControllersPolicy);
            assert_eq!(path, missing.join("AWSIAMManagedPolicyControllers.json"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
