//! Convergence of live IAM roles.
//!
//! [`IamService`] makes the managed policies attached to a role match a
//! desired set, and creates, updates and deletes roles owned by a cluster.
//! Every call goes through an [`IamApi`], one at a time, with no retries. The
//! first failure stops the operation and is returned with the role and policy
//! involved. Work already done before the failure is not rolled back.

mod api;

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use tracing::{debug, info};

pub use api::{AttachedPolicy, IamApi, IamApiError, IamPolicy, IamRole};

use crate::convert::policy_document_to_json;
use crate::error::BootstrapError;
use crate::types::{PolicyDocument, Tag, Tags, tag_list};

/// Value of the ownership tag on roles this crate manages.
pub const RESOURCE_LIFECYCLE_OWNED: &str = "owned";

/// The tag key marking a resource as belonging to cluster `key`.
pub fn cluster_ownership_tag_key(key: &str) -> String {
    format!("kubernetes.io/cluster/{key}")
}

/// `additional_tags` plus the ownership tag for cluster `key`.
pub fn role_tags(key: &str, additional_tags: &Tags) -> Vec<Tag> {
    let mut tags = additional_tags.clone();
    tags.insert(
        cluster_ownership_tag_key(key),
        RESOURCE_LIFECYCLE_OWNED.to_string(),
    );
    tag_list(&tags)
}

pub struct IamService<C: IamApi> {
    client: C,
}

impl<C: IamApi> IamService<C> {
    pub fn new(client: C) -> Self {
        IamService { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn get_role(&self, role_name: &str) -> Result<IamRole, BootstrapError> {
        self.client
            .get_role(role_name)
            .map_err(|source| BootstrapError::GetRole {
                role: role_name.to_string(),
                source,
            })
    }

    fn attached_policy_arns(&self, role_name: &str) -> Result<Vec<String>, BootstrapError> {
        let attached = self
            .client
            .list_attached_role_policies(role_name)
            .map_err(|source| BootstrapError::ListRolePolicies {
                role: role_name.to_string(),
                source,
            })?;
        Ok(attached.into_iter().map(|policy| policy.policy_arn).collect())
    }

    fn detach(&self, role_name: &str, policy_arn: &str) -> Result<(), BootstrapError> {
        self.client
            .detach_role_policy(role_name, policy_arn)
            .map_err(|source| BootstrapError::DetachRolePolicy {
                role: role_name.to_string(),
                policy_arn: policy_arn.to_string(),
                source,
            })?;
        info!(
            event = "Reconcile",
            phase = "Detached",
            role = role_name,
            policy = policy_arn,
        );
        Ok(())
    }

    /// Make the policies attached to `role` equal `desired`.
    ///
    /// Policies not in `desired` are detached first. Each missing policy is
    /// then looked up, so an unknown ARN fails before any attach is tried for
    /// it, and attached. Both sides are compared as sets.
    pub fn ensure_policies_attached(
        &self,
        role: &IamRole,
        desired: &[String],
    ) -> Result<(), BootstrapError> {
        let role_name = role.role_name.as_str();
        let existing = self.attached_policy_arns(role_name)?;

        let wanted: HashSet<&str> = desired.iter().map(String::as_str).collect();
        let present: HashSet<&str> = existing.iter().map(String::as_str).collect();

        let mut changed = false;

        for policy_arn in existing.iter().filter(|arn| !wanted.contains(arn.as_str())) {
            self.detach(role_name, policy_arn)?;
            changed = true;
        }

        for policy_arn in desired
            .iter()
            .unique()
            .filter(|arn| !present.contains(arn.as_str()))
        {
            self.client
                .get_policy(policy_arn)
                .map_err(|source| BootstrapError::GetPolicy {
                    policy_arn: policy_arn.clone(),
                    source,
                })?;
            self.client
                .attach_role_policy(role_name, policy_arn)
                .map_err(|source| BootstrapError::AttachRolePolicy {
                    role: role_name.to_string(),
                    policy_arn: policy_arn.clone(),
                    source,
                })?;
            info!(
                event = "Reconcile",
                phase = "Attached",
                role = role_name,
                policy = policy_arn.as_str(),
            );
            changed = true;
        }

        if !changed {
            debug!(event = "Reconcile", phase = "Converged", role = role_name);
        }
        Ok(())
    }

    /// Create a role owned by cluster `key` with the given trust policy.
    pub fn create_role(
        &self,
        role_name: &str,
        key: &str,
        trust_relationship: &PolicyDocument,
        additional_tags: &Tags,
    ) -> Result<IamRole, BootstrapError> {
        let trust = policy_document_to_json(trust_relationship)?;
        let tags = role_tags(key, additional_tags);
        let role = self
            .client
            .create_role(role_name, &trust, &tags)
            .map_err(|source| BootstrapError::CreateRole {
                role: role_name.to_string(),
                source,
            })?;
        info!(event = "Reconcile", phase = "RoleCreated", role = role_name);
        Ok(role)
    }

    /// Bring the trust policy and tags of an existing role up to date.
    ///
    /// The trust policy is replaced when its JSON differs. Tags that are
    /// missing or hold a different value are set, and tags not in
    /// `additional_tags` are removed, except the ownership tag for `key`.
    pub fn ensure_tags_and_policy(
        &self,
        role: &IamRole,
        key: &str,
        trust_relationship: &PolicyDocument,
        additional_tags: &Tags,
    ) -> Result<(), BootstrapError> {
        let role_name = role.role_name.as_str();
        let trust = policy_document_to_json(trust_relationship)?;

        if trust != role.assume_role_policy_document {
            self.client
                .update_assume_role_policy(role_name, &trust)
                .map_err(|source| BootstrapError::UpdateAssumeRolePolicy {
                    role: role_name.to_string(),
                    source,
                })?;
            info!(
                event = "Reconcile",
                phase = "TrustPolicyUpdated",
                role = role_name,
            );
        }

        let ownership_key = cluster_ownership_tag_key(key);
        let current: BTreeMap<&str, &str> = role
            .tags
            .iter()
            .map(|tag| (tag.key.as_str(), tag.value.as_str()))
            .collect();

        let to_tag: Vec<Tag> = additional_tags
            .iter()
            .filter(|(k, v)| current.get(k.as_str()) != Some(&v.as_str()))
            .map(|(k, v)| Tag::new(k, v))
            .collect();

        let to_untag: Vec<String> = role
            .tags
            .iter()
            .filter(|tag| tag.key != ownership_key && !additional_tags.contains_key(&tag.key))
            .map(|tag| tag.key.clone())
            .collect();

        if !to_tag.is_empty() {
            self.client
                .tag_role(role_name, &to_tag)
                .map_err(|source| BootstrapError::TagRole {
                    role: role_name.to_string(),
                    source,
                })?;
            debug!(
                event = "Reconcile",
                phase = "Tagged",
                role = role_name,
                count = to_tag.len(),
            );
        }

        if !to_untag.is_empty() {
            self.client
                .untag_role(role_name, &to_untag)
                .map_err(|source| BootstrapError::UntagRole {
                    role: role_name.to_string(),
                    source,
                })?;
            debug!(
                event = "Reconcile",
                phase = "Untagged",
                role = role_name,
                keys = ?to_untag,
            );
        }

        Ok(())
    }

    /// Detach every policy from the role, then delete it.
    pub fn delete_role(&self, role_name: &str) -> Result<(), BootstrapError> {
        for policy_arn in self.attached_policy_arns(role_name)? {
            self.detach(role_name, &policy_arn)?;
        }
        self.client
            .delete_role(role_name)
            .map_err(|source| BootstrapError::DeleteRole {
                role: role_name.to_string(),
                source,
            })?;
        info!(event = "Reconcile", phase = "RoleDeleted", role = role_name);
        Ok(())
    }

    /// True unless `role` carries the ownership tag for cluster `key`.
    pub fn is_unmanaged(&self, role: &IamRole, key: &str) -> bool {
        is_unmanaged(role, key)
    }
}

pub fn is_unmanaged(role: &IamRole, key: &str) -> bool {
    let ownership_key = cluster_ownership_tag_key(key);
    !role
        .tags
        .iter()
        .any(|tag| tag.key == ownership_key && tag.value == RESOURCE_LIFECYCLE_OWNED)
}
