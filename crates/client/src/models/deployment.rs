//! Deployments

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resource that belongs to a deployment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub sync_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Deployment as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub blueprint_id: Option<String>,
    #[serde(default)]
    pub blueprint_version: Option<String>,
    #[serde(default)]
    pub catalog_item_id: Option<String>,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub last_updated_at: Option<String>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
    #[serde(default)]
    pub lease_expire_at: Option<String>,
    #[serde(default)]
    pub resources: Vec<DeploymentResource>,
}

/// Body of the deployment update call
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Day-2 request (including delete) against a deployment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub deployment_id: Option<String>,
}

impl DeploymentRequest {
    /// SUCCESSFUL, FAILED and ABORTED are terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_deref(),
            Some("SUCCESSFUL") | Some("FAILED") | Some("ABORTED")
        )
    }

    pub fn is_successful(&self) -> bool {
        self.status.as_deref() == Some("SUCCESSFUL")
    }
}
