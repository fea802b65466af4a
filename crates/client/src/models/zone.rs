//! Cloud zones

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::common::{Links, Tag};

/// Zone as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    #[serde(default)]
    pub placement_policy: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub tags_to_match: Vec<Tag>,
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub cloud_account_id: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body of zone create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub region_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub tags: Vec<Tag>,
    pub tags_to_match: Vec<Tag>,
    pub custom_properties: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compute_ids: Vec<String>,
}
