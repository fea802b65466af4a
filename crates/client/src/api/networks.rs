//! Network and load balancer endpoints

use std::time::Duration;

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{
    LoadBalancer, LoadBalancerSpecification, Network, NetworkSpecification, RequestTracker,
};

impl VraClient {
    pub async fn create_network(&self, spec: &NetworkSpecification) -> Result<RequestTracker> {
        self.post("/iaas/api/networks", &[], spec).await
    }

    pub async fn get_network(&self, id: &str) -> Result<Network> {
        self.get(&format!("/iaas/api/networks/{}", id), &[]).await
    }

    pub async fn delete_network(&self, id: &str, timeout: Duration) -> Result<()> {
        let body = self
            .delete(&format!("/iaas/api/networks/{}", id), &[])
            .await?;
        self.wait_for_delete(body, timeout).await
    }

    pub async fn list_networks(&self, filter: Option<&str>) -> Result<Vec<Network>> {
        match filter {
            Some(f) => self.list_all("/iaas/api/networks", &[("$filter", f)]).await,
            None => self.list_all("/iaas/api/networks", &[]).await,
        }
    }

    pub async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpecification,
    ) -> Result<RequestTracker> {
        self.post("/iaas/api/load-balancers", &[], spec).await
    }

    pub async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer> {
        self.get(&format!("/iaas/api/load-balancers/{}", id), &[])
            .await
    }

    pub async fn delete_load_balancer(&self, id: &str, timeout: Duration) -> Result<()> {
        let body = self
            .delete(&format!("/iaas/api/load-balancers/{}", id), &[])
            .await?;
        self.wait_for_delete(body, timeout).await
    }
}
