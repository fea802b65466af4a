//! Block device endpoints

use std::time::Duration;

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{BlockDevice, BlockDeviceSpecification, RequestTracker};

impl VraClient {
    pub async fn create_block_device(
        &self,
        spec: &BlockDeviceSpecification,
    ) -> Result<RequestTracker> {
        self.post("/iaas/api/block-devices", &[], spec).await
    }

    pub async fn get_block_device(&self, id: &str) -> Result<BlockDevice> {
        self.get(&format!("/iaas/api/block-devices/{}", id), &[])
            .await
    }

    /// Grow a block device to `capacity_in_gb`
    pub async fn resize_block_device(
        &self,
        id: &str,
        capacity_in_gb: i64,
        timeout: Duration,
    ) -> Result<()> {
        let capacity = capacity_in_gb.to_string();
        let tracker: RequestTracker = self
            .post_action(
                &format!("/iaas/api/block-devices/{}", id),
                &[("capacityInGB", capacity.as_str())],
            )
            .await?;
        self.wait_for_tracker(tracker, timeout).await?;
        Ok(())
    }

    /// Delete a block device; `purge` also removes persistent disks for good
    pub async fn delete_block_device(&self, id: &str, purge: bool, timeout: Duration) -> Result<()> {
        let purge = if purge { "true" } else { "false" };
        let body = self
            .delete(&format!("/iaas/api/block-devices/{}", id), &[("purge", purge)])
            .await?;
        self.wait_for_delete(body, timeout).await
    }
}
