//! Machine endpoints

use std::time::Duration;

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{
    BlockDevice, DiskAttachmentSpecification, Machine, MachineSpecification, RequestTracker,
    UpdateMachineSpecification,
};

impl VraClient {
    pub async fn create_machine(&self, spec: &MachineSpecification) -> Result<RequestTracker> {
        self.post("/iaas/api/machines", &[], spec).await
    }

    pub async fn get_machine(&self, id: &str) -> Result<Machine> {
        self.get(&format!("/iaas/api/machines/{}", id), &[]).await
    }

    pub async fn update_machine(
        &self,
        id: &str,
        spec: &UpdateMachineSpecification,
    ) -> Result<Machine> {
        self.patch(&format!("/iaas/api/machines/{}", id), spec).await
    }

    /// Change the flavor of a machine; the machine is restarted by vRA
    pub async fn resize_machine(
        &self,
        id: &str,
        flavor: &str,
        timeout: Duration,
    ) -> Result<()> {
        let tracker: RequestTracker = self
            .post_action(
                &format!("/iaas/api/machines/{}/operations/resize", id),
                &[("name", flavor)],
            )
            .await?;
        self.wait_for_tracker(tracker, timeout).await?;
        Ok(())
    }

    pub async fn delete_machine(&self, id: &str, timeout: Duration) -> Result<()> {
        let body = self
            .delete(&format!("/iaas/api/machines/{}", id), &[])
            .await?;
        self.wait_for_delete(body, timeout).await
    }

    /// Disks attached to a machine, boot disk included
    pub async fn list_machine_disks(&self, id: &str) -> Result<Vec<BlockDevice>> {
        self.list_all(&format!("/iaas/api/machines/{}/disks", id), &[])
            .await
    }

    pub async fn attach_machine_disk(
        &self,
        id: &str,
        disk: &DiskAttachmentSpecification,
        timeout: Duration,
    ) -> Result<()> {
        let tracker: RequestTracker = self
            .post(&format!("/iaas/api/machines/{}/disks", id), &[], disk)
            .await?;
        self.wait_for_tracker(tracker, timeout).await?;
        Ok(())
    }

    pub async fn detach_machine_disk(
        &self,
        id: &str,
        disk_id: &str,
        timeout: Duration,
    ) -> Result<()> {
        let body = self
            .delete(&format!("/iaas/api/machines/{}/disks/{}", id, disk_id), &[])
            .await?;
        self.wait_for_delete(body, timeout).await
    }
}
