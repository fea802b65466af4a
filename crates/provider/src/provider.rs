//! vRA Terraform Provider Implementation
//!
//! Implements the Terraform Plugin Protocol v6 Provider service. Each RPC
//! decodes the msgpack values Terraform sends, shapes them against the
//! resource schema and dispatches to the matching resource or data source.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tonic::{Request, Response, Status};
use tracing::{debug, error, info, warn};
use vra_client::VraClient;

use crate::config;
use crate::data_sources::{self, DataSource};
use crate::plan::{carry_forward, plan_change, reconcile_apply};
use crate::resources::{self, Resource};
use crate::schema::{attribute_path, Block, Violation};
use crate::state::{decode_json, decode_wire, encode_wire, make_state, string_value, DynamicValue};
use crate::tfplugin6::provider_server::Provider;
use crate::tfplugin6::{self as pb, *};

/// vRA Terraform Provider
pub struct VraProvider {
    /// Client built by ConfigureProvider
    client: Arc<RwLock<Option<VraClient>>>,
    resources: HashMap<&'static str, Arc<dyn Resource>>,
    data_sources: HashMap<&'static str, Arc<dyn DataSource>>,
}

impl Default for VraProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VraProvider {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Provider that is already configured with `client`
    pub fn with_client(client: VraClient) -> Self {
        Self::build(Some(client))
    }

    fn build(client: Option<VraClient>) -> Self {
        Self {
            client: Arc::new(RwLock::new(client)),
            resources: resources::all()
                .into_iter()
                .map(|r| (r.type_name(), r))
                .collect(),
            data_sources: data_sources::all()
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
        }
    }

    async fn get_client(&self) -> Result<VraClient, Diagnostic> {
        self.client.read().await.clone().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "the vra provider must be configured before resources can be managed",
            )
        })
    }

    fn resource(&self, type_name: &str) -> Result<Arc<dyn Resource>, Status> {
        self.resources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("Unknown resource type: {}", type_name)))
    }

    fn data_source(&self, type_name: &str) -> Result<Arc<dyn DataSource>, Status> {
        self.data_sources
            .get(type_name)
            .cloned()
            .ok_or_else(|| Status::not_found(format!("Unknown data source type: {}", type_name)))
    }

    fn capabilities() -> ServerCapabilities {
        ServerCapabilities {
            plan_destroy: true,
            get_provider_schema_optional: false,
            move_resource_state: false,
        }
    }
}

fn decode(value: Option<&pb::DynamicValue>) -> Result<DynamicValue, Status> {
    decode_wire(value).map_err(|e| Status::invalid_argument(format!("Failed to decode value: {:#}", e)))
}

fn encode(value: &DynamicValue) -> Result<pb::DynamicValue, Status> {
    encode_wire(value).map_err(|e| Status::internal(format!("Failed to encode state: {:#}", e)))
}

fn diagnostics(violations: Vec<Violation>) -> Vec<Diagnostic> {
    violations.iter().map(Violation::to_diagnostic).collect()
}

fn failure(summary: impl Into<String>, err: &anyhow::Error) -> Diagnostic {
    Diagnostic::error(summary, format!("{:#}", err))
}

/// Whether the API reported the object as gone
fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<vra_client::Error>()
            .map_or(false, vra_client::Error::is_not_found)
    })
}

fn validate_config(block: &Block, extra: Vec<Violation>, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut violations = block.validate(config);
    violations.extend(extra);
    diagnostics(violations)
}

#[tonic::async_trait]
impl Provider for VraProvider {
    async fn get_metadata(
        &self,
        _request: Request<get_metadata::Request>,
    ) -> Result<Response<get_metadata::Response>, Status> {
        debug!("GetMetadata called");

        let mut resources: Vec<_> = self.resources.keys().collect();
        resources.sort();
        let mut data_sources: Vec<_> = self.data_sources.keys().collect();
        data_sources.sort();

        Ok(Response::new(get_metadata::Response {
            server_capabilities: Some(Self::capabilities()),
            diagnostics: vec![],
            data_sources: data_sources
                .into_iter()
                .map(|name| get_metadata::DataSourceMetadata {
                    type_name: name.to_string(),
                })
                .collect(),
            resources: resources
                .into_iter()
                .map(|name| get_metadata::ResourceMetadata {
                    type_name: name.to_string(),
                })
                .collect(),
        }))
    }

    async fn get_provider_schema(
        &self,
        _request: Request<get_provider_schema::Request>,
    ) -> Result<Response<get_provider_schema::Response>, Status> {
        info!("GetProviderSchema called");

        Ok(Response::new(get_provider_schema::Response {
            provider: Some(config::provider_schema().to_schema()),
            resource_schemas: self
                .resources
                .iter()
                .map(|(name, r)| (name.to_string(), r.schema().to_schema()))
                .collect(),
            data_source_schemas: self
                .data_sources
                .iter()
                .map(|(name, d)| (name.to_string(), d.schema().to_schema()))
                .collect(),
            diagnostics: vec![],
            provider_meta: None,
            server_capabilities: Some(Self::capabilities()),
        }))
    }

    async fn validate_provider_config(
        &self,
        request: Request<validate_provider_config::Request>,
    ) -> Result<Response<validate_provider_config::Response>, Status> {
        debug!("ValidateProviderConfig called");

        let value = decode(request.get_ref().config.as_ref())?;
        Ok(Response::new(validate_provider_config::Response {
            diagnostics: diagnostics(config::validate(&value)),
        }))
    }

    async fn validate_resource_config(
        &self,
        request: Request<validate_resource_config::Request>,
    ) -> Result<Response<validate_resource_config::Response>, Status> {
        let req = request.into_inner();
        debug!("ValidateResourceConfig called for {}", req.type_name);

        let resource = self.resource(&req.type_name)?;
        let value = decode(req.config.as_ref())?;
        Ok(Response::new(validate_resource_config::Response {
            diagnostics: validate_config(&resource.schema(), resource.validate(&value), &value),
        }))
    }

    async fn validate_data_resource_config(
        &self,
        request: Request<validate_data_resource_config::Request>,
    ) -> Result<Response<validate_data_resource_config::Response>, Status> {
        let req = request.into_inner();
        debug!("ValidateDataResourceConfig called for {}", req.type_name);

        let data_source = self.data_source(&req.type_name)?;
        let value = decode(req.config.as_ref())?;
        Ok(Response::new(validate_data_resource_config::Response {
            diagnostics: validate_config(
                &data_source.schema(),
                data_source.validate(&value),
                &value,
            ),
        }))
    }

    async fn upgrade_resource_state(
        &self,
        request: Request<upgrade_resource_state::Request>,
    ) -> Result<Response<upgrade_resource_state::Response>, Status> {
        let req = request.into_inner();
        debug!("UpgradeResourceState called for {} (v{})", req.type_name, req.version);

        let resource = self.resource(&req.type_name)?;
        let raw = req.raw_state.map(|rs| rs.json).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Response::new(upgrade_resource_state::Response {
                upgraded_state: Some(encode(&DynamicValue::Null)?),
                diagnostics: vec![],
            }));
        }

        // Every schema is at version 0; upgrading only reshapes the stored
        // JSON so attributes added since it was written appear as null.
        match decode_json(&raw) {
            Ok(state) => {
                let upgraded = resource.schema().normalize(&state, false);
                Ok(Response::new(upgrade_resource_state::Response {
                    upgraded_state: Some(encode(&upgraded)?),
                    diagnostics: vec![],
                }))
            }
            Err(e) => Ok(Response::new(upgrade_resource_state::Response {
                upgraded_state: None,
                diagnostics: vec![failure("Failed to read stored state", &e)],
            })),
        }
    }

    async fn configure_provider(
        &self,
        request: Request<configure_provider::Request>,
    ) -> Result<Response<configure_provider::Response>, Status> {
        let req = request.into_inner();
        info!("ConfigureProvider called (Terraform {})", req.terraform_version);

        let value = decode(req.config.as_ref())?;
        let client_config = match config::resolve(&value) {
            Ok(c) => c,
            Err(e) => {
                return Ok(Response::new(configure_provider::Response {
                    diagnostics: vec![failure("Invalid provider configuration", &e)],
                }));
            }
        };

        let url = client_config.url.clone();
        info!("Connecting to vRA at {}", url);

        match VraClient::connect(client_config).await {
            Ok(client) => {
                *self.client.write().await = Some(client);
                info!("Authenticated against {}", url);
                Ok(Response::new(configure_provider::Response {
                    diagnostics: vec![],
                }))
            }
            Err(e) => {
                error!("Failed to authenticate against {}: {}", url, e);
                Ok(Response::new(configure_provider::Response {
                    diagnostics: vec![Diagnostic::error(
                        "Failed to connect to vRA",
                        format!("Could not authenticate against {}: {}", url, e),
                    )],
                }))
            }
        }
    }

    async fn read_resource(
        &self,
        request: Request<read_resource::Request>,
    ) -> Result<Response<read_resource::Response>, Status> {
        let req = request.into_inner();
        info!("ReadResource called for {}", req.type_name);

        let resource = self.resource(&req.type_name)?;
        let current = decode(req.current_state.as_ref())?;
        if current.is_null() {
            return Ok(Response::new(read_resource::Response {
                new_state: req.current_state,
                diagnostics: vec![],
                private: req.private,
            }));
        }

        let client = match self.get_client().await {
            Ok(c) => c,
            Err(diag) => {
                return Ok(Response::new(read_resource::Response {
                    new_state: req.current_state,
                    diagnostics: vec![diag],
                    private: req.private,
                }));
            }
        };

        let schema = resource.schema();
        match resource.read(&client, &current).await {
            Ok(read) => Ok(Response::new(read_resource::Response {
                new_state: Some(encode(&carry_forward(&schema, &current, &read))?),
                diagnostics: vec![],
                private: req.private,
            })),
            Err(e) if is_not_found(&e) => {
                warn!(
                    "{} {} no longer exists, removing it from state",
                    req.type_name,
                    current.attr("id").as_string().unwrap_or_default()
                );
                Ok(Response::new(read_resource::Response {
                    new_state: Some(encode(&DynamicValue::Null)?),
                    diagnostics: vec![],
                    private: vec![],
                }))
            }
            Err(e) => {
                error!("Failed to read {}: {:#}", req.type_name, e);
                Ok(Response::new(read_resource::Response {
                    new_state: req.current_state,
                    diagnostics: vec![failure(format!("Failed to read {}", req.type_name), &e)],
                    private: req.private,
                }))
            }
        }
    }

    async fn plan_resource_change(
        &self,
        request: Request<plan_resource_change::Request>,
    ) -> Result<Response<plan_resource_change::Response>, Status> {
        let req = request.into_inner();
        debug!("PlanResourceChange called for {}", req.type_name);

        let resource = self.resource(&req.type_name)?;
        let prior = decode(req.prior_state.as_ref())?;
        let proposed = decode(req.proposed_new_state.as_ref())?;

        let change = plan_change(&resource.schema(), &prior, &proposed);
        if !change.requires_replace.is_empty() {
            debug!(
                "{} requires replacement because of {} attribute(s)",
                req.type_name,
                change.requires_replace.len()
            );
        }

        Ok(Response::new(plan_resource_change::Response {
            planned_state: Some(encode(&change.planned)?),
            requires_replace: change
                .requires_replace
                .iter()
                .map(|path| attribute_path(path))
                .collect(),
            planned_private: req.prior_private,
            diagnostics: vec![],
            legacy_type_system: true,
        }))
    }

    async fn apply_resource_change(
        &self,
        request: Request<apply_resource_change::Request>,
    ) -> Result<Response<apply_resource_change::Response>, Status> {
        let req = request.into_inner();
        info!("ApplyResourceChange called for {}", req.type_name);

        let resource = self.resource(&req.type_name)?;
        let prior = decode(req.prior_state.as_ref())?;
        let planned = decode(req.planned_state.as_ref())?;

        let respond = |new_state: Option<pb::DynamicValue>,
                       diagnostics: Vec<Diagnostic>|
         -> Result<Response<apply_resource_change::Response>, Status> {
            Ok(Response::new(apply_resource_change::Response {
                new_state,
                private: vec![],
                diagnostics,
                legacy_type_system: true,
            }))
        };

        let client = match self.get_client().await {
            Ok(c) => c,
            Err(diag) => return respond(req.prior_state, vec![diag]),
        };
        let schema = resource.schema();

        // Destroy
        if planned.is_null() {
            return match resource.delete(&client, &prior).await {
                Ok(()) => respond(Some(encode(&DynamicValue::Null)?), vec![]),
                Err(e) if is_not_found(&e) => {
                    debug!("{} was already gone", req.type_name);
                    respond(Some(encode(&DynamicValue::Null)?), vec![])
                }
                Err(e) => {
                    error!("Failed to delete {}: {:#}", req.type_name, e);
                    respond(
                        req.prior_state,
                        vec![failure(format!("Failed to delete {}", req.type_name), &e)],
                    )
                }
            };
        }

        // Create
        if prior.is_null() {
            return match resource.create(&client, &planned).await {
                Ok(created) => {
                    let state = reconcile_apply(&schema, &planned, &created);
                    info!(
                        "Created {} {}",
                        req.type_name,
                        state.attr("id").as_string().unwrap_or_default()
                    );
                    respond(Some(encode(&state)?), vec![])
                }
                Err(e) => {
                    error!("Failed to create {}: {:#}", req.type_name, e);
                    respond(
                        Some(encode(&DynamicValue::Null)?),
                        vec![failure(format!("Failed to create {}", req.type_name), &e)],
                    )
                }
            };
        }

        // Update
        match resource.update(&client, &prior, &planned).await {
            Ok(updated) => respond(
                Some(encode(&reconcile_apply(&schema, &planned, &updated))?),
                vec![],
            ),
            Err(e) => {
                error!("Failed to update {}: {:#}", req.type_name, e);
                respond(
                    req.prior_state,
                    vec![failure(format!("Failed to update {}", req.type_name), &e)],
                )
            }
        }
    }

    async fn import_resource_state(
        &self,
        request: Request<import_resource_state::Request>,
    ) -> Result<Response<import_resource_state::Response>, Status> {
        let req = request.into_inner();
        info!("ImportResourceState called for {} ({})", req.type_name, req.id);

        let resource = self.resource(&req.type_name)?;
        if req.id.is_empty() {
            return Ok(Response::new(import_resource_state::Response {
                imported_resources: vec![],
                diagnostics: vec![Diagnostic::error("Invalid import id", "the import id is empty")],
            }));
        }

        // The follow-up ReadResource fills in everything else.
        let state = resource
            .schema()
            .normalize(&make_state(vec![("id", string_value(&req.id))]), false);

        Ok(Response::new(import_resource_state::Response {
            imported_resources: vec![import_resource_state::ImportedResource {
                type_name: req.type_name,
                state: Some(encode(&state)?),
                private: vec![],
            }],
            diagnostics: vec![],
        }))
    }

    async fn read_data_source(
        &self,
        request: Request<read_data_source::Request>,
    ) -> Result<Response<read_data_source::Response>, Status> {
        let req = request.into_inner();
        info!("ReadDataSource called for {}", req.type_name);

        let data_source = self.data_source(&req.type_name)?;
        let schema = data_source.schema();
        let config = schema.normalize(&decode(req.config.as_ref())?, false);

        let respond = |state: Option<pb::DynamicValue>,
                       diagnostics: Vec<Diagnostic>|
         -> Result<Response<read_data_source::Response>, Status> {
            Ok(Response::new(read_data_source::Response { state, diagnostics }))
        };

        let violations = data_source.validate(&config);
        if !violations.is_empty() {
            return respond(req.config, diagnostics(violations));
        }

        let client = match self.get_client().await {
            Ok(c) => c,
            Err(diag) => return respond(req.config, vec![diag]),
        };

        match data_source.read(&client, &config).await {
            // Lookup arguments the read did not echo keep their configured value
            Ok(found) => respond(Some(encode(&carry_forward(&schema, &config, &found))?), vec![]),
            Err(e) => {
                error!("Failed to read data source {}: {:#}", req.type_name, e);
                respond(
                    req.config,
                    vec![failure(format!("Failed to read {}", req.type_name), &e)],
                )
            }
        }
    }

    async fn get_functions(
        &self,
        _request: Request<get_functions::Request>,
    ) -> Result<Response<get_functions::Response>, Status> {
        Ok(Response::new(get_functions::Response {
            diagnostics: vec![],
        }))
    }

    async fn stop_provider(
        &self,
        _request: Request<stop_provider::Request>,
    ) -> Result<Response<stop_provider::Response>, Status> {
        info!("StopProvider called");
        Ok(Response::new(stop_provider::Response {
            error: String::new(),
        }))
    }
}
