//! Read-only activity collected from an issue thread.

use serde::{Deserialize, Serialize};

use super::role::CommentType;

/// Immutable bundle of everything the pipeline reads about a thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshot {
    /// Body of the issue the thread is about.
    #[serde(default)]
    pub specification_text: String,
    /// All comments in thread order.
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

/// A comment as fetched from the code host, before any cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub url: String,
    pub origin_type: CommentType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::AtomicRole;

    #[test]
    fn deserialize_snapshot_with_missing_fields() {
        let json = r#"{
            "specificationText": "Fix the login page",
            "comments": [
                {"id": 1, "authorLogin": "alice", "body": "On it", "url": "https://x/1", "originType": "ISSUE_ASSIGNEE"},
                {"id": 2, "url": "https://x/2", "originType": "ISSUE_CONTRIBUTOR"}
            ]
        }"#;
        let snapshot: ActivitySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.specification_text, "Fix the login page");
        assert_eq!(snapshot.comments.len(), 2);
        assert_eq!(snapshot.comments[0].author_login.as_deref(), Some("alice"));
        assert!(snapshot.comments[0].origin_type.contains(AtomicRole::Assignee));
        assert!(snapshot.comments[1].author_login.is_none());
        assert!(snapshot.comments[1].body.is_none());
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let snapshot: ActivitySnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.specification_text.is_empty());
        assert!(snapshot.comments.is_empty());
    }
}
