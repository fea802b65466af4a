//! Deployment endpoints

use std::time::Duration;

use crate::client::VraClient;
use crate::error::{Error, Result};
use crate::models::{Deployment, DeploymentRequest, DeploymentUpdate};
use crate::tracker::{poll_until, Poll};

impl VraClient {
    /// Deployment with its resources expanded
    pub async fn get_deployment(&self, id: &str) -> Result<Deployment> {
        self.get(
            &format!("/deployment/api/deployments/{}", id),
            &[("expand", "resources")],
        )
        .await
    }

    pub async fn update_deployment(
        &self,
        id: &str,
        update: &DeploymentUpdate,
    ) -> Result<Deployment> {
        self.patch(&format!("/deployment/api/deployments/{}", id), update)
            .await
    }

    /// Request deletion and wait for the request to complete
    pub async fn delete_deployment(&self, id: &str, timeout: Duration) -> Result<()> {
        let body = self
            .delete(&format!("/deployment/api/deployments/{}", id), &[])
            .await?;
        let Some(body) = body else {
            return Ok(());
        };
        let request: DeploymentRequest = serde_json::from_value(body)?;
        self.wait_for_deployment_request(&request.id, timeout)
            .await?;
        Ok(())
    }

    pub async fn list_deployments(&self, name: Option<&str>) -> Result<Vec<Deployment>> {
        match name {
            Some(name) => {
                self.list_all("/deployment/api/deployments", &[("name", name)])
                    .await
            }
            None => self.list_all("/deployment/api/deployments", &[]).await,
        }
    }

    pub async fn get_deployment_request(&self, id: &str) -> Result<DeploymentRequest> {
        self.get(&format!("/deployment/api/requests/{}", id), &[])
            .await
    }

    /// Poll a deployment request until it finishes
    pub async fn wait_for_deployment_request(
        &self,
        id: &str,
        timeout: Duration,
    ) -> Result<DeploymentRequest> {
        let operation = format!("deployment request {}", id);
        poll_until(self.poll_interval(), timeout, &operation, || async move {
            let request = self.get_deployment_request(id).await?;
            if !request.is_terminal() {
                return Ok(Poll::Pending);
            }
            if request.is_successful() {
                Ok(Poll::Ready(request))
            } else {
                Err(Error::RequestFailed {
                    id: request.id.clone(),
                    message: request
                        .details
                        .unwrap_or_else(|| format!("status {:?}", request.status)),
                })
            }
        })
        .await
    }
}
