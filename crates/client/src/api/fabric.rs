//! Fabric network, fabric image and security group lookups

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{FabricImage, FabricNetwork, SecurityGroup};

impl VraClient {
    pub async fn list_fabric_networks(&self, filter: Option<&str>) -> Result<Vec<FabricNetwork>> {
        match filter {
            Some(f) => {
                self.list_all("/iaas/api/fabric-networks", &[("$filter", f)])
                    .await
            }
            None => self.list_all("/iaas/api/fabric-networks", &[]).await,
        }
    }

    pub async fn get_fabric_image(&self, id: &str) -> Result<FabricImage> {
        self.get(&format!("/iaas/api/fabric-images/{}", id), &[])
            .await
    }

    pub async fn list_fabric_images(&self, filter: Option<&str>) -> Result<Vec<FabricImage>> {
        match filter {
            Some(f) => self.list_all("/iaas/api/fabric-images", &[("$filter", f)]).await,
            None => self.list_all("/iaas/api/fabric-images", &[]).await,
        }
    }

    pub async fn list_security_groups(&self, filter: Option<&str>) -> Result<Vec<SecurityGroup>> {
        match filter {
            Some(f) => {
                self.list_all("/iaas/api/security-groups", &[("$filter", f)])
                    .await
            }
            None => self.list_all("/iaas/api/security-groups", &[]).await,
        }
    }
}
