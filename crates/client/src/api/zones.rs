//! Cloud zone endpoints

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{Zone, ZoneSpecification};

impl VraClient {
    pub async fn create_zone(&self, spec: &ZoneSpecification) -> Result<Zone> {
        self.post("/iaas/api/zones", &[], spec).await
    }

    pub async fn get_zone(&self, id: &str) -> Result<Zone> {
        self.get(&format!("/iaas/api/zones/{}", id), &[]).await
    }

    pub async fn update_zone(&self, id: &str, spec: &ZoneSpecification) -> Result<Zone> {
        self.patch(&format!("/iaas/api/zones/{}", id), spec).await
    }

    pub async fn delete_zone(&self, id: &str) -> Result<()> {
        self.delete(&format!("/iaas/api/zones/{}", id), &[]).await?;
        Ok(())
    }

    pub async fn list_zones(&self, filter: Option<&str>) -> Result<Vec<Zone>> {
        match filter {
            Some(f) => self.list_all("/iaas/api/zones", &[("$filter", f)]).await,
            None => self.list_all("/iaas/api/zones", &[]).await,
        }
    }
}
