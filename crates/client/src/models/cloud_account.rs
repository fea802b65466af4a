//! Cloud accounts and regions

use serde::{Deserialize, Serialize};

use super::common::{Links, Tag};

/// Region enabled on a cloud account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSpecification {
    pub external_region_id: String,
    #[serde(default)]
    pub name: String,
}

/// AWS cloud account as returned by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAccountAws {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub enabled_regions: Vec<RegionSpecification>,
    #[serde(default)]
    pub tags: Vec<Tag>,
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

/// Body of AWS cloud account create and update calls
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudAccountAwsSpecification {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub regions: Vec<RegionSpecification>,
    pub create_default_zones: bool,
    pub tags: Vec<Tag>,
}

/// Body of the AWS region enumeration call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsRegionEnumerationSpecification {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Result of a finished region enumeration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEnumerationResult {
    #[serde(default)]
    pub external_regions: Vec<RegionSpecification>,
    #[serde(default)]
    pub external_region_ids: Vec<String>,
}

impl RegionEnumerationResult {
    /// External region ids regardless of which response shape was used
    pub fn region_ids(&self) -> Vec<String> {
        if !self.external_regions.is_empty() {
            self.external_regions
                .iter()
                .map(|r| r.external_region_id.clone())
                .collect()
        } else {
            self.external_region_ids.clone()
        }
    }
}

/// Region known to vRA
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub external_region_id: String,
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
}
