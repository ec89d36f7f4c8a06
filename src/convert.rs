//! JSON conversion of policy documents.

use crate::error::BootstrapError;
use crate::types::PolicyDocument;

/// Compact JSON, as sent to the IAM API.
pub fn policy_document_to_json(document: &PolicyDocument) -> Result<String, BootstrapError> {
    serde_json::to_string(document).map_err(|e| BootstrapError::serialization("policy document", e))
}

/// Indented JSON, as written to disk.
pub fn policy_document_to_pretty_json(document: &PolicyDocument) -> Result<String, BootstrapError> {
    serde_json::to_string_pretty(document)
        .map_err(|e| BootstrapError::serialization("policy document", e))
}

pub fn policy_document_from_json(text: &str) -> Result<PolicyDocument, BootstrapError> {
    serde_json::from_str(text).map_err(|e| BootstrapError::ParseError(e.to_string()))
}
