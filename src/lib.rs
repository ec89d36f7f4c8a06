// src/lib.rs
//! IAM bootstrap for Cluster API Provider AWS.
//!
//! Renders a bootstrap configuration into a CloudFormation template and the
//! managed policy documents it contains, and converges the policies attached
//! to live IAM roles.

pub use cloudformation::CloudFormationTemplate;
pub use config::{AwsIamConfiguration, AwsIamConfigurationSpec, with_defaults};
pub use error::BootstrapError;
pub use loader::load_configuration;
pub use policies::PolicyName;
pub use reconcile::{IamApi, IamApiError, IamService};
pub use template::Template;
pub use types::{PolicyDocument, StatementEntry};

pub mod cloudformation;
pub mod config;
pub mod convert;
mod error;
mod loader;
pub mod policies;
pub mod reconcile;
pub mod template;
pub mod traits;
pub mod types;
