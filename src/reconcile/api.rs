//! The slice of the IAM API the reconciler talks to.

use thiserror::Error;

use crate::types::Tag;

/// A failure reported by an [`IamApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IamApiError {
    #[error("no such entity: {0}")]
    NoSuchEntity(String),

    #[error("entity already exists: {0}")]
    EntityAlreadyExists(String),

    #[error("{code}: {message}")]
    Service { code: String, message: String },
}

impl IamApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, IamApiError::NoSuchEntity(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IamRole {
    pub role_name: String,
    pub arn: String,
    /// The trust policy as JSON.
    pub assume_role_policy_document: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IamPolicy {
    pub policy_name: String,
    pub arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachedPolicy {
    pub policy_name: String,
    pub policy_arn: String,
}

/// IAM operations used to converge roles. Implementations wrap a real client
/// or stand in for one in tests.
pub trait IamApi {
    fn get_role(&self, role_name: &str) -> Result<IamRole, IamApiError>;

    fn get_policy(&self, policy_arn: &str) -> Result<IamPolicy, IamApiError>;

    fn list_attached_role_policies(&self, role_name: &str)
    -> Result<Vec<AttachedPolicy>, IamApiError>;

    fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), IamApiError>;

    fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), IamApiError>;

    fn create_role(
        &self,
        role_name: &str,
        assume_role_policy_document: &str,
        tags: &[Tag],
    ) -> Result<IamRole, IamApiError>;

    fn delete_role(&self, role_name: &str) -> Result<(), IamApiError>;

    fn update_assume_role_policy(
        &self,
        role_name: &str,
        policy_document: &str,
    ) -> Result<(), IamApiError>;

    fn tag_role(&self, role_name: &str, tags: &[Tag]) -> Result<(), IamApiError>;

    fn untag_role(&self, role_name: &str, tag_keys: &[String]) -> Result<(), IamApiError>;
}
