//! Types shared by several vRA APIs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key/value tag attached to most IaaS objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Placement constraint expressed as a tag expression
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub mandatory: bool,
    pub expression: String,
}

/// HAL style link; either a single `href` or a list of `hrefs`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hrefs: Vec<String>,
}

/// Links keyed by relation name, found under `_links`
pub type Links = HashMap<String, Link>;

/// Id of the object a relation points at, taken from the link path
pub fn linked_id(links: &Links, relation: &str) -> Option<String> {
    links
        .get(relation)
        .and_then(|l| l.href.as_deref())
        .and_then(crate::client::id_from_link)
        .map(str::to_string)
}

/// Ids of every object a multi-valued relation points at
pub fn linked_ids(links: &Links, relation: &str) -> Vec<String> {
    links
        .get(relation)
        .map(|l| {
            l.hrefs
                .iter()
                .filter_map(|h| crate::client::id_from_link(h))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A page of a list endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: i64,
}

/// Status of an asynchronous IaaS request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "INPROGRESS")]
    InProgress,
    #[serde(rename = "FINISHED")]
    Finished,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(other)]
    Unknown,
}

/// Tracker returned by every asynchronous IaaS operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTracker {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub progress: i32,
    pub status: RequestStatus,
    #[serde(default)]
    pub message: Option<String>,
    /// Links to the objects created or touched by the request
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub self_link: Option<String>,
}

impl RequestTracker {
    /// Id of the first resource the request produced
    pub fn resource_id(&self) -> Option<&str> {
        self.resources
            .first()
            .and_then(|link| crate::client::id_from_link(link))
    }
}

/// Project role assignment
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_tracker_decode() {
        let json = r#"{
            "id": "c3b5f1d2",
            "progress": 100,
            "status": "FINISHED",
            "resources": ["/iaas/api/machines/m-42"],
            "selfLink": "/iaas/api/request-tracker/c3b5f1d2"
        }"#;
        let tracker: RequestTracker = serde_json::from_str(json).unwrap();
        assert_eq!(tracker.status, RequestStatus::Finished);
        assert_eq!(tracker.resource_id(), Some("m-42"));
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let tracker: RequestTracker =
            serde_json::from_str(r#"{"id":"x","status":"QUEUED"}"#).unwrap();
        assert_eq!(tracker.status, RequestStatus::Unknown);
        assert_eq!(tracker.resource_id(), None);
    }

    #[test]
    fn test_links() {
        let links: Links = serde_json::from_str(
            r#"{
                "region": {"href": "/iaas/api/regions/r-1"},
                "fabric-networks": {"hrefs": ["/iaas/api/fabric-networks/a", "/iaas/api/fabric-networks/b"]}
            }"#,
        )
        .unwrap();
        assert_eq!(linked_id(&links, "region").as_deref(), Some("r-1"));
        assert_eq!(linked_ids(&links, "fabric-networks"), vec!["a", "b"]);
        assert!(linked_ids(&links, "missing").is_empty());
    }
}
