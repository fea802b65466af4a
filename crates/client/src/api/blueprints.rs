//! Blueprint, blueprint version and blueprint request endpoints

use std::time::Duration;

use crate::client::VraClient;
use crate::error::{Error, Result};
use crate::models::{
    Blueprint, BlueprintRequest, BlueprintRequestSpecification, BlueprintSpecification,
    BlueprintVersion, BlueprintVersionRequest,
};
use crate::tracker::{poll_until, Poll};

impl VraClient {
    pub async fn create_blueprint(&self, spec: &BlueprintSpecification) -> Result<Blueprint> {
        self.post("/blueprint/api/blueprints", &[], spec).await
    }

    pub async fn get_blueprint(&self, id: &str) -> Result<Blueprint> {
        self.get(&format!("/blueprint/api/blueprints/{}", id), &[])
            .await
    }

    pub async fn update_blueprint(
        &self,
        id: &str,
        spec: &BlueprintSpecification,
    ) -> Result<Blueprint> {
        self.put(&format!("/blueprint/api/blueprints/{}", id), spec)
            .await
    }

    pub async fn delete_blueprint(&self, id: &str) -> Result<()> {
        self.delete(&format!("/blueprint/api/blueprints/{}", id), &[])
            .await?;
        Ok(())
    }

    /// Blueprints by exact name, optionally scoped to one project
    pub async fn list_blueprints(
        &self,
        name: Option<&str>,
        project_id: Option<&str>,
    ) -> Result<Vec<Blueprint>> {
        let mut params = Vec::new();
        if let Some(name) = name {
            params.push(("name", name));
        }
        if let Some(project_id) = project_id {
            params.push(("projects", project_id));
        }
        self.list_all("/blueprint/api/blueprints", &params).await
    }

    pub async fn create_blueprint_version(
        &self,
        blueprint_id: &str,
        request: &BlueprintVersionRequest,
    ) -> Result<BlueprintVersion> {
        self.post(
            &format!("/blueprint/api/blueprints/{}/versions", blueprint_id),
            &[],
            request,
        )
        .await
    }

    pub async fn get_blueprint_version(
        &self,
        blueprint_id: &str,
        version: &str,
    ) -> Result<BlueprintVersion> {
        self.get(
            &format!("/blueprint/api/blueprints/{}/versions/{}", blueprint_id, version),
            &[],
        )
        .await
    }

    pub async fn release_blueprint_version(
        &self,
        blueprint_id: &str,
        version: &str,
    ) -> Result<BlueprintVersion> {
        self.post_action(
            &format!(
                "/blueprint/api/blueprints/{}/versions/{}/actions/release",
                blueprint_id, version
            ),
            &[],
        )
        .await
    }

    pub async fn unrelease_blueprint_version(
        &self,
        blueprint_id: &str,
        version: &str,
    ) -> Result<BlueprintVersion> {
        self.post_action(
            &format!(
                "/blueprint/api/blueprints/{}/versions/{}/actions/unrelease",
                blueprint_id, version
            ),
            &[],
        )
        .await
    }

    /// Submit a deployment of a blueprint
    pub async fn create_blueprint_request(
        &self,
        spec: &BlueprintRequestSpecification,
    ) -> Result<BlueprintRequest> {
        self.post("/blueprint/api/blueprint-requests", &[], spec)
            .await
    }

    pub async fn get_blueprint_request(&self, id: &str) -> Result<BlueprintRequest> {
        self.get(&format!("/blueprint/api/blueprint-requests/{}", id), &[])
            .await
    }

    /// Poll a blueprint request until it finishes
    pub async fn wait_for_blueprint_request(
        &self,
        id: &str,
        timeout: Duration,
    ) -> Result<BlueprintRequest> {
        let operation = format!("blueprint request {}", id);
        poll_until(self.poll_interval(), timeout, &operation, || async move {
            let request = self.get_blueprint_request(id).await?;
            if !request.is_terminal() {
                return Ok(Poll::Pending);
            }
            if request.is_successful() {
                Ok(Poll::Ready(request))
            } else {
                Err(Error::RequestFailed {
                    id: request.id.clone(),
                    message: request
                        .failure_message
                        .unwrap_or_else(|| format!("status {:?}", request.status)),
                })
            }
        })
        .await
    }
}
