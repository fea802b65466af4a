//! Flavor, image, storage and network profile endpoints

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{
    FlavorProfile, FlavorProfileSpecification, ImageProfile, ImageProfileSpecification,
    NetworkProfile, NetworkProfileSpecification, StorageProfile, StorageProfileSpecification,
};

impl VraClient {
    // Flavor profiles

    pub async fn create_flavor_profile(
        &self,
        spec: &FlavorProfileSpecification,
    ) -> Result<FlavorProfile> {
        self.post("/iaas/api/flavor-profiles", &[], spec).await
    }

    pub async fn get_flavor_profile(&self, id: &str) -> Result<FlavorProfile> {
        self.get(&format!("/iaas/api/flavor-profiles/{}", id), &[])
            .await
    }

    pub async fn update_flavor_profile(
        &self,
        id: &str,
        spec: &FlavorProfileSpecification,
    ) -> Result<FlavorProfile> {
        self.patch(&format!("/iaas/api/flavor-profiles/{}", id), spec)
            .await
    }

    pub async fn delete_flavor_profile(&self, id: &str) -> Result<()> {
        self.delete(&format!("/iaas/api/flavor-profiles/{}", id), &[])
            .await?;
        Ok(())
    }

    // Image profiles

    pub async fn create_image_profile(
        &self,
        spec: &ImageProfileSpecification,
    ) -> Result<ImageProfile> {
        self.post("/iaas/api/image-profiles", &[], spec).await
    }

    pub async fn get_image_profile(&self, id: &str) -> Result<ImageProfile> {
        self.get(&format!("/iaas/api/image-profiles/{}", id), &[])
            .await
    }

    pub async fn update_image_profile(
        &self,
        id: &str,
        spec: &ImageProfileSpecification,
    ) -> Result<ImageProfile> {
        self.patch(&format!("/iaas/api/image-profiles/{}", id), spec)
            .await
    }

    pub async fn delete_image_profile(&self, id: &str) -> Result<()> {
        self.delete(&format!("/iaas/api/image-profiles/{}", id), &[])
            .await?;
        Ok(())
    }

    // Storage profiles

    pub async fn create_storage_profile(
        &self,
        spec: &StorageProfileSpecification,
    ) -> Result<StorageProfile> {
        self.post("/iaas/api/storage-profiles", &[], spec).await
    }

    pub async fn get_storage_profile(&self, id: &str) -> Result<StorageProfile> {
        self.get(&format!("/iaas/api/storage-profiles/{}", id), &[])
            .await
    }

    pub async fn update_storage_profile(
        &self,
        id: &str,
        spec: &StorageProfileSpecification,
    ) -> Result<StorageProfile> {
        self.patch(&format!("/iaas/api/storage-profiles/{}", id), spec)
            .await
    }

    pub async fn delete_storage_profile(&self, id: &str) -> Result<()> {
        self.delete(&format!("/iaas/api/storage-profiles/{}", id), &[])
            .await?;
        Ok(())
    }

    // Network profiles

    pub async fn create_network_profile(
        &self,
        spec: &NetworkProfileSpecification,
    ) -> Result<NetworkProfile> {
        self.post("/iaas/api/network-profiles", &[], spec).await
    }

    pub async fn get_network_profile(&self, id: &str) -> Result<NetworkProfile> {
        self.get(&format!("/iaas/api/network-profiles/{}", id), &[])
            .await
    }

    pub async fn update_network_profile(
        &self,
        id: &str,
        spec: &NetworkProfileSpecification,
    ) -> Result<NetworkProfile> {
        self.patch(&format!("/iaas/api/network-profiles/{}", id), spec)
            .await
    }

    pub async fn delete_network_profile(&self, id: &str) -> Result<()> {
        self.delete(&format!("/iaas/api/network-profiles/{}", id), &[])
            .await?;
        Ok(())
    }
}
