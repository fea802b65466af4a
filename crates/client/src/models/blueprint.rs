//! Cloud templates (blueprints) and their versions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validation finding attached to a blueprint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Blueprint as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_source_id: Option<String>,
    #[serde(default)]
    pub content_source_type: Option<String>,
    #[serde(default)]
    pub request_scope_org: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub validation_messages: Vec<ValidationMessage>,
    #[serde(default)]
    pub total_versions: Option<i64>,
    #[serde(default)]
    pub total_released_versions: Option<i64>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
}

/// Body of blueprint create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_id: String,
    pub content: String,
    pub request_scope_org: bool,
}

/// Blueprint version as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintVersion {
    pub id: String,
    #[serde(default)]
    pub blueprint_id: Option<String>,
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version_description: Option<String>,
    #[serde(default)]
    pub version_change_log: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl BlueprintVersion {
    pub fn is_released(&self) -> bool {
        self.status.as_deref() == Some("RELEASED")
    }
}

/// Body of the create version call
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintVersionRequest {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_log: Option<String>,
    pub release: bool,
}

/// Body of the blueprint request (deploy) call
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintRequestSpecification {
    pub blueprint_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint_version: Option<String>,
    pub deployment_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_id: String,
    pub inputs: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Blueprint request as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintRequest {
    pub id: String,
    #[serde(default)]
    pub deployment_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
}

impl BlueprintRequest {
    /// FINISHED, FAILED and CANCELLED are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_deref(),
            Some("FINISHED") | Some("FAILED") | Some("CANCELLED")
        )
    }

    pub fn is_successful(&self) -> bool {
        self.status.as_deref() == Some("FINISHED")
    }
}
