//! Discovered (fabric) objects: networks, images, security groups

use std::collections::HashMap;

use serde::Deserialize;

use super::common::{Links, Tag};

/// Network discovered on a cloud account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricNetwork {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cidr: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub cloud_account_ids: Vec<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Image discovered on a cloud account
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricImage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub os_family: Option<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Security group known to vRA
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub external_region_id: Option<String>,
    #[serde(default)]
    pub external_zone_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}
