//! Resource tags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tags as they appear in configuration: key to value, kept sorted.
pub type Tags = BTreeMap<String, String>;

/// A single tag in the `[{Key, Value}]` shape used by CloudFormation and the IAM API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Convert a tag map into a key-sorted tag list.
pub fn tag_list(tags: &Tags) -> Vec<Tag> {
    tags.iter().map(|(key, value)| Tag::new(key, value)).collect()
}
