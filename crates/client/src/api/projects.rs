//! Project endpoints

use crate::client::VraClient;
use crate::error::Result;
use crate::models::{Project, ProjectSpecification};

impl VraClient {
    pub async fn create_project(&self, spec: &ProjectSpecification) -> Result<Project> {
        self.post("/iaas/api/projects", &[], spec).await
    }

    pub async fn get_project(&self, id: &str) -> Result<Project> {
        self.get(&format!("/iaas/api/projects/{}", id), &[]).await
    }

    pub async fn update_project(&self, id: &str, spec: &ProjectSpecification) -> Result<Project> {
        self.patch(&format!("/iaas/api/projects/{}", id), spec).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        self.delete(&format!("/iaas/api/projects/{}", id), &[])
            .await?;
        Ok(())
    }

    /// List projects matching an OData filter such as `name eq 'dev'`
    pub async fn list_projects(&self, filter: Option<&str>) -> Result<Vec<Project>> {
        match filter {
            Some(f) => self.list_all("/iaas/api/projects", &[("$filter", f)]).await,
            None => self.list_all("/iaas/api/projects", &[]).await,
        }
    }
}
