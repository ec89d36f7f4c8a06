//! IAM policy documents.

use serde::{Deserialize, Serialize};

use super::statement::StatementEntry;

/// The only IAM policy grammar version in use.
pub const CURRENT_VERSION: &str = "2012-10-17";

fn current_version() -> String {
    CURRENT_VERSION.to_string()
}

/// An IAM policy document. Statement order is preserved on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default = "current_version")]
    pub version: String,
    #[serde(default)]
    pub statement: Vec<StatementEntry>,
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<StatementEntry>) -> Self {
        PolicyDocument {
            version: current_version(),
            statement,
            id: None,
        }
    }

    /// Append statements in order.
    pub fn extend<I>(&mut self, statements: I)
    where
        I: IntoIterator<Item = StatementEntry>,
    {
        self.statement.extend(statements);
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        PolicyDocument::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_uses_current_version() {
        let document = PolicyDocument::new(vec![]);
        assert_eq!(document.version, "2012-10-17");
        assert!(document.id.is_none());
    }

    #[test]
    fn test_missing_version_defaults_on_parse() {
        let document: PolicyDocument =
            serde_json::from_str(r#"{"Statement":[{"Effect":"Allow","Action":"s3:*","Resource":"*"}]}"#)
                .unwrap();
        assert_eq!(document.version, CURRENT_VERSION);
        assert_eq!(document.statement.len(), 1);
    }

    #[test]
    fn test_id_is_emitted_when_set() {
        let mut document = PolicyDocument::default();
        document.id = Some("bootstrap".to_string());
        let json = serde_json::to_string(&document).unwrap();
        assert_eq!(json, r#"{"Version":"2012-10-17","Statement":[],"Id":"bootstrap"}"#);
    }
}
