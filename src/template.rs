//! Synthesis of the bootstrap CloudFormation template.
//!
//! A [`Template`] holds a defaulted configuration and renders it into the IAM
//! resources a Cluster API AWS management cluster needs: roles and instance
//! profiles for the controllers, control plane and nodes, the managed policies
//! attached to them, and optionally a bootstrap user and group plus the EKS
//! service roles.

use std::fs;
use std::io::Write;
use std::path::Path;

use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::cloudformation::{
    CloudFormationTemplate, Group, InlinePolicy, InstanceProfile, ManagedPolicy, NameOrRef,
    Resource, Role, User,
};
use crate::config::{AwsIamConfigurationSpec, AwsIamRoleSpec, with_defaults};
use crate::convert::policy_document_to_pretty_json;
use crate::error::BootstrapError;
use crate::policies::{
    self, EKS_CONTROL_PLANE_ROLE, EKS_FARGATE_ROLE, EKS_FARGATE_SERVICE, EKS_NODEGROUP_ROLE,
    PolicyName, aws_managed_policy_arn,
};
use crate::types::{PolicyDocument, PrincipalType, StatementEntry, tag_list};

pub const AWS_IAM_GROUP_BOOTSTRAPPER: &str = "AWSIAMGroupBootstrapper";
pub const AWS_IAM_USER_BOOTSTRAPPER: &str = "AWSIAMUserBootstrapper";
pub const AWS_IAM_INSTANCE_PROFILE_CONTROLLERS: &str = "AWSIAMInstanceProfileControllers";
pub const AWS_IAM_INSTANCE_PROFILE_CONTROL_PLANE: &str = "AWSIAMInstanceProfileControlPlane";
pub const AWS_IAM_INSTANCE_PROFILE_NODES: &str = "AWSIAMInstanceProfileNodes";
pub const AWS_IAM_ROLE_CONTROLLERS: &str = "AWSIAMRoleControllers";
pub const AWS_IAM_ROLE_CONTROL_PLANE: &str = "AWSIAMRoleControlPlane";
pub const AWS_IAM_ROLE_NODES: &str = "AWSIAMRoleNodes";
pub const AWS_IAM_ROLE_EKS_CONTROL_PLANE: &str = "AWSIAMRoleEKSControlPlane";
pub const AWS_IAM_ROLE_EKS_NODEGROUP: &str = "AWSIAMRoleEKSNodegroup";
pub const AWS_IAM_ROLE_EKS_FARGATE: &str = "AWSIAMRoleEKSFargate";
pub const AWS_IAM_MANAGED_POLICY_CONTROLLERS_EKS: &str = "AWSIAMManagedPolicyControllersEKS";
pub const AWS_IAM_MANAGED_POLICY_EKS_CONSOLE: &str = "AWSIAMManagedPolicyEKSConsole";

const ECR_READ_ONLY_POLICY: &str = "AmazonEC2ContainerRegistryReadOnly";

const CONTROLLERS_DESCRIPTION: &str = "For the Kubernetes Cluster API Provider AWS Controllers";

/// Owner read/write only.
#[cfg(unix)]
const POLICY_FILE_MODE: u32 = 0o600;

/// Renders a bootstrap configuration into CloudFormation and policy documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    spec: AwsIamConfigurationSpec,
}

impl Default for Template {
    fn default() -> Self {
        Template::new(&AwsIamConfigurationSpec::default())
    }
}

impl Template {
    /// Build a template from `spec`, applying defaults to a copy of it.
    pub fn new(spec: &AwsIamConfigurationSpec) -> Self {
        Template {
            spec: with_defaults(spec),
        }
    }

    /// The defaulted configuration this template renders.
    pub fn spec(&self) -> &AwsIamConfigurationSpec {
        &self.spec
    }

    pub fn managed_name(&self, base: &str) -> String {
        self.spec.managed_name(base)
    }

    /// Build one of the exportable managed policy documents.
    pub fn policy_document(&self, name: PolicyName) -> PolicyDocument {
        name.document(&self.spec)
    }

    pub fn controllers_policy(&self) -> PolicyDocument {
        policies::controllers_policy(&self.spec)
    }

    pub fn controllers_eks_policy(&self) -> PolicyDocument {
        policies::controllers_eks_policy(&self.spec)
    }

    pub fn render_cloudformation(&self) -> CloudFormationTemplate {
        let spec = &self.spec;
        let eks = spec.eks();
        let mut template = CloudFormationTemplate::new();

        if spec.bootstrap_user.enable {
            template.insert(AWS_IAM_USER_BOOTSTRAPPER, Resource::User(self.bootstrap_user()));
            template.insert(
                AWS_IAM_GROUP_BOOTSTRAPPER,
                Resource::Group(Group {
                    group_name: spec.bootstrap_user.group_name.clone(),
                }),
            );
        }

        template.insert(
            PolicyName::ControllersPolicy.to_string(),
            Resource::ManagedPolicy(ManagedPolicy {
                managed_policy_name: self.managed_name("controllers"),
                description: CONTROLLERS_DESCRIPTION.to_string(),
                policy_document: self.controllers_policy(),
                groups: self.controllers_policy_groups(),
                roles: self.controllers_policy_roles(),
                users: Vec::new(),
            }),
        );

        if !eks.disable {
            template.insert(
                AWS_IAM_MANAGED_POLICY_CONTROLLERS_EKS,
                Resource::ManagedPolicy(ManagedPolicy {
                    managed_policy_name: self.managed_name("controllers-eks"),
                    description: CONTROLLERS_DESCRIPTION.to_string(),
                    policy_document: self.controllers_eks_policy(),
                    groups: self.controllers_policy_groups(),
                    roles: self.controllers_policy_roles(),
                    users: Vec::new(),
                }),
            );
        }

        if !spec.control_plane.disable_cloud_provider_policy {
            template.insert(
                PolicyName::ControlPlanePolicy.to_string(),
                Resource::ManagedPolicy(ManagedPolicy {
                    managed_policy_name: self.managed_name("control-plane"),
                    description: "For the Kubernetes Cloud Provider AWS Control Plane".to_string(),
                    policy_document: policies::control_plane_policy(),
                    groups: Vec::new(),
                    roles: vec![NameOrRef::reference(AWS_IAM_ROLE_CONTROL_PLANE)],
                    users: Vec::new(),
                }),
            );
        }

        if !spec.nodes.disable_cloud_provider_policy {
            template.insert(
                PolicyName::NodePolicy.to_string(),
                Resource::ManagedPolicy(ManagedPolicy {
                    managed_policy_name: self.managed_name("nodes"),
                    description: "For the Kubernetes Cloud Provider AWS nodes".to_string(),
                    policy_document: policies::node_policy(spec),
                    groups: Vec::new(),
                    roles: vec![
                        NameOrRef::reference(AWS_IAM_ROLE_CONTROL_PLANE),
                        NameOrRef::reference(AWS_IAM_ROLE_NODES),
                    ],
                    users: Vec::new(),
                }),
            );
        }

        if spec.control_plane.enable_csi_policy {
            template.insert(
                PolicyName::CsiPolicy.to_string(),
                Resource::ManagedPolicy(ManagedPolicy {
                    managed_policy_name: self.managed_name("csi"),
                    description: "For the AWS EBS CSI Driver for Kubernetes".to_string(),
                    policy_document: policies::csi_policy(),
                    groups: Vec::new(),
                    roles: vec![NameOrRef::reference(AWS_IAM_ROLE_CONTROL_PLANE)],
                    users: Vec::new(),
                }),
            );
        }

        template.insert(
            AWS_IAM_ROLE_CONTROL_PLANE,
            Resource::Role(self.ec2_role(
                "control-plane",
                &spec.control_plane.role,
                spec.control_plane.role.extra_policy_attachments.clone(),
                self.inline_policies(&spec.control_plane.role.extra_statements),
            )),
        );
        // Controller extra statements are part of the controllers managed policy.
        template.insert(
            AWS_IAM_ROLE_CONTROLLERS,
            Resource::Role(self.ec2_role(
                "controllers",
                &spec.cluster_api_controllers.role,
                spec.cluster_api_controllers.role.extra_policy_attachments.clone(),
                Vec::new(),
            )),
        );
        template.insert(
            AWS_IAM_ROLE_NODES,
            Resource::Role(self.ec2_role(
                "nodes",
                &spec.nodes.role,
                self.node_managed_policies(),
                self.inline_policies(&spec.nodes.role.extra_statements),
            )),
        );

        for (logical_id, base, role) in [
            (AWS_IAM_INSTANCE_PROFILE_CONTROL_PLANE, "control-plane", AWS_IAM_ROLE_CONTROL_PLANE),
            (AWS_IAM_INSTANCE_PROFILE_CONTROLLERS, "controllers", AWS_IAM_ROLE_CONTROLLERS),
            (AWS_IAM_INSTANCE_PROFILE_NODES, "nodes", AWS_IAM_ROLE_NODES),
        ] {
            template.insert(
                logical_id,
                Resource::InstanceProfile(InstanceProfile {
                    instance_profile_name: self.managed_name(base),
                    roles: vec![NameOrRef::reference(role)],
                }),
            );
        }

        if !eks.disable && !eks.default_control_plane_role.disable {
            template.insert(
                AWS_IAM_ROLE_EKS_CONTROL_PLANE,
                Resource::Role(eks_role(
                    EKS_CONTROL_PLANE_ROLE.as_str(),
                    &["eks.amazonaws.com"],
                    &eks.default_control_plane_role,
                    policies::eks_control_plane_policy_arns(spec),
                )),
            );
        }

        if !eks.disable && !eks.managed_machine_pool().disable {
            template.insert(
                AWS_IAM_ROLE_EKS_NODEGROUP,
                Resource::Role(eks_role(
                    EKS_NODEGROUP_ROLE.as_str(),
                    &["ec2.amazonaws.com", "eks.amazonaws.com"],
                    eks.managed_machine_pool(),
                    policies::eks_nodegroup_policy_arns(spec),
                )),
            );
        }

        if !eks.disable && !eks.fargate().disable {
            template.insert(
                AWS_IAM_ROLE_EKS_FARGATE,
                Resource::Role(eks_role(
                    EKS_FARGATE_ROLE.as_str(),
                    &[EKS_FARGATE_SERVICE],
                    eks.fargate(),
                    policies::eks_fargate_policy_arns(spec),
                )),
            );
        }

        if !eks.disable && eks.enable_user_eks_console_policy {
            template.insert(
                AWS_IAM_MANAGED_POLICY_EKS_CONSOLE,
                Resource::ManagedPolicy(ManagedPolicy {
                    managed_policy_name: self.managed_name("eks-console"),
                    description: "For users/groups to view EKS nodes and workloads".to_string(),
                    policy_document: policies::eks_console_policy(),
                    groups: Vec::new(),
                    roles: Vec::new(),
                    users: Vec::new(),
                }),
            );
        }

        let dangling = template.dangling_references();
        if !dangling.is_empty() {
            warn!(
                event = "RenderCloudFormation",
                phase = "References",
                dangling = ?dangling,
            );
        }

        debug!(
            event = "RenderCloudFormation",
            phase = "Complete",
            stack_name = %spec.stack_name,
            resources = template.len(),
        );

        template
    }

    /// Write each exportable policy document to `<dir>/<PolicyName>.json`.
    ///
    /// Existing files are overwritten. On unix the files are created owner
    /// read/write only.
    pub fn write_policy_documents(&self, dir: &Path) -> Result<(), BootstrapError> {
        for name in PolicyName::iter() {
            let json = policy_document_to_pretty_json(&self.policy_document(name))?;
            let path = dir.join(format!("{name}.json"));
            write_owner_only(&path, json.as_bytes()).map_err(|source| {
                BootstrapError::WritePolicyDocument {
                    policy: name,
                    path: path.clone(),
                    source,
                }
            })?;
            debug!(
                event = "WritePolicyDocument",
                phase = "Written",
                policy = %name,
                path = %path.display(),
            );
        }
        Ok(())
    }

    fn bootstrap_user(&self) -> User {
        let user = &self.spec.bootstrap_user;
        let mut groups: Vec<NameOrRef> = user
            .extra_groups
            .iter()
            .cloned()
            .map(NameOrRef::from)
            .collect();
        groups.push(NameOrRef::reference(AWS_IAM_GROUP_BOOTSTRAPPER));

        User {
            user_name: user.user_name.clone(),
            groups,
            managed_policy_arns: self.spec.control_plane.role.extra_policy_attachments.clone(),
            policies: self.inline_policies(&user.extra_statements),
            tags: tag_list(&user.tags),
        }
    }

    fn controllers_policy_groups(&self) -> Vec<NameOrRef> {
        if self.spec.bootstrap_user.enable {
            vec![NameOrRef::reference(AWS_IAM_GROUP_BOOTSTRAPPER)]
        } else {
            Vec::new()
        }
    }

    fn controllers_policy_roles(&self) -> Vec<NameOrRef> {
        let mut roles = vec![NameOrRef::reference(AWS_IAM_ROLE_CONTROLLERS)];
        if !self
            .spec
            .control_plane
            .disable_cluster_api_controller_policy_attachment
        {
            roles.push(NameOrRef::reference(AWS_IAM_ROLE_CONTROL_PLANE));
        }
        roles
    }

    fn node_managed_policies(&self) -> Vec<String> {
        let nodes = &self.spec.nodes;
        let mut arns = nodes.role.extra_policy_attachments.clone();
        if nodes.ec2_container_registry_read_only {
            arns.push(aws_managed_policy_arn(&self.spec.partition, ECR_READ_ONLY_POLICY));
        }
        arns
    }

    /// Extra statements go into one inline policy named after the stack.
    fn inline_policies(&self, statements: &[StatementEntry]) -> Vec<InlinePolicy> {
        if statements.is_empty() {
            return Vec::new();
        }
        vec![InlinePolicy {
            policy_name: self.spec.stack_name.clone(),
            policy_document: PolicyDocument::new(statements.to_vec()),
        }]
    }

    /// A role assumed by EC2 instances, carrying the role's own trust statements.
    fn ec2_role(
        &self,
        base: &str,
        role: &AwsIamRoleSpec,
        managed_policy_arns: Vec<String>,
        policies: Vec<InlinePolicy>,
    ) -> Role {
        Role {
            role_name: self.managed_name(base),
            assume_role_policy_document: policies::with_trust_statements(
                policies::ec2_assume_role_policy(),
                &role.trust_statements,
            ),
            managed_policy_arns,
            policies,
            tags: tag_list(&role.tags),
        }
    }
}

/// An EKS service role. Only the service principals are trusted; the role's
/// `trustStatements` are not applied.
fn eks_role(
    role_name: &str,
    services: &[&str],
    role: &AwsIamRoleSpec,
    managed_policy_arns: Vec<String>,
) -> Role {
    Role {
        role_name: role_name.to_string(),
        assume_role_policy_document: policies::assume_role_policy(
            PrincipalType::Service,
            services.iter().copied(),
        ),
        managed_policy_arns,
        policies: Vec::new(),
        tags: tag_list(&role.tags),
    }
}

fn write_owner_only(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(POLICY_FILE_MODE);
        let mut file = options.open(path)?;
        // `mode` only applies on create; tighten files that already existed.
        file.set_permissions(fs::Permissions::from_mode(POLICY_FILE_MODE))?;
        file.write_all(contents)
    }
    #[cfg(not(unix))]
    {
        let mut file = options.open(path)?;
        file.write_all(contents)
    }
}

#[cfg(test)]
mod tests;
