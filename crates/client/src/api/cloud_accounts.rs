//! Cloud account and region endpoints

use std::time::Duration;

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{
    AwsRegionEnumerationSpecification, CloudAccountAws, CloudAccountAwsSpecification, Region,
    RegionEnumerationResult, RequestTracker,
};

impl VraClient {
    /// Start creating an AWS cloud account; the returned tracker finishes
    /// once vRA has validated the keys and enumerated regions
    pub async fn create_cloud_account_aws(
        &self,
        spec: &CloudAccountAwsSpecification,
    ) -> Result<RequestTracker> {
        self.post("/iaas/api/cloud-accounts-aws", &[], spec).await
    }

    pub async fn get_cloud_account_aws(&self, id: &str) -> Result<CloudAccountAws> {
        self.get(&format!("/iaas/api/cloud-accounts-aws/{}", id), &[])
            .await
    }

    pub async fn update_cloud_account_aws(
        &self,
        id: &str,
        spec: &CloudAccountAwsSpecification,
    ) -> Result<RequestTracker> {
        self.patch(&format!("/iaas/api/cloud-accounts-aws/{}", id), spec)
            .await
    }

    pub async fn delete_cloud_account_aws(&self, id: &str, timeout: Duration) -> Result<()> {
        let body = self
            .delete(&format!("/iaas/api/cloud-accounts-aws/{}", id), &[])
            .await?;
        self.wait_for_delete(body, timeout).await
    }

    pub async fn list_cloud_accounts_aws(&self, filter: Option<&str>) -> Result<Vec<CloudAccountAws>> {
        match filter {
            Some(f) => {
                self.list_all("/iaas/api/cloud-accounts-aws", &[("$filter", f)])
                    .await
            }
            None => self.list_all("/iaas/api/cloud-accounts-aws", &[]).await,
        }
    }

    /// Ask vRA which regions a pair of AWS keys can see
    pub async fn enumerate_aws_regions(
        &self,
        spec: &AwsRegionEnumerationSpecification,
        timeout: Duration,
    ) -> Result<Vec<String>> {
        let tracker: RequestTracker = self
            .post("/iaas/api/cloud-accounts-aws/region-enumeration", &[], spec)
            .await?;
        let done = self.wait_for_tracker(tracker, timeout).await?;
        let Some(link) = done.resources.first() else {
            return Ok(Vec::new());
        };
        let result: RegionEnumerationResult = self.get(link, &[]).await?;
        Ok(result.region_ids())
    }

    pub async fn get_region(&self, id: &str) -> Result<Region> {
        self.get(&format!("/iaas/api/regions/{}", id), &[]).await
    }

    pub async fn list_regions(&self, filter: Option<&str>) -> Result<Vec<Region>> {
        match filter {
            Some(f) => self.list_all("/iaas/api/regions", &[("$filter", f)]).await,
            None => self.list_all("/iaas/api/regions", &[]).await,
        }
    }
}
