//! Projects

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::common::{Constraint, Links, User};

/// Cloud zone assigned to a project, with its quotas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAssignment {
    pub zone_id: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub max_number_instances: i64,
    #[serde(default)]
    pub cpu_limit: i64,
    #[serde(rename = "memoryLimitMB", default)]
    pub memory_limit_mb: i64,
    #[serde(rename = "storageLimitGB", default)]
    pub storage_limit_gb: i64,
}

/// Project as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub administrators: Vec<User>,
    #[serde(default)]
    pub members: Vec<User>,
    #[serde(default)]
    pub viewers: Vec<User>,
    #[serde(default)]
    pub supervisors: Vec<User>,
    #[serde(default)]
    pub zones: Vec<ZoneAssignment>,
    #[serde(default)]
    pub constraints: HashMap<String, Vec<Constraint>>,
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
    #[serde(default)]
    pub machine_naming_template: Option<String>,
    #[serde(default)]
    pub operation_timeout: Option<i64>,
    #[serde(default)]
    pub placement_policy: Option<String>,
    #[serde(default)]
    pub shared_resources: Option<bool>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body of project create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub administrators: Vec<User>,
    pub members: Vec<User>,
    pub viewers: Vec<User>,
    pub supervisors: Vec<User>,
    pub zone_assignment_configurations: Vec<ZoneAssignment>,
    pub constraints: HashMap<String, Vec<Constraint>>,
    pub custom_properties: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_naming_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_resources: Option<bool>,
}
