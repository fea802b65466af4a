//! Resource lifecycles driven through the plugin protocol against a mocked
//! vRA server

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use terraform_provider_vra::state::{
    decode_wire, encode_wire, int_value, make_state, string_map_value, string_value, DynamicValue,
};
use terraform_provider_vra::tfplugin6::provider_server::Provider;
use terraform_provider_vra::tfplugin6::{
    apply_resource_change, plan_resource_change, read_data_source, read_resource, Diagnostic,
};
use terraform_provider_vra::VraProvider;
use tonic::Request;
use vra_client::{ClientConfig, Credentials, VraClient};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    provider: VraProvider,
}

struct Plan {
    planned: DynamicValue,
    replaces: usize,
}

impl Harness {
    fn new(server: &MockServer) -> Self {
        let config = ClientConfig::new(server.uri(), Credentials::AccessToken("token".into()))
            .with_poll_interval(Duration::from_millis(10));
        Self {
            provider: VraProvider::with_client(VraClient::new(config).unwrap()),
        }
    }

    async fn plan(&self, type_name: &str, prior: &DynamicValue, proposed: &DynamicValue) -> Plan {
        let response = self
            .provider
            .plan_resource_change(Request::new(plan_resource_change::Request {
                type_name: type_name.into(),
                prior_state: Some(encode_wire(prior).unwrap()),
                proposed_new_state: Some(encode_wire(proposed).unwrap()),
                config: Some(encode_wire(proposed).unwrap()),
                prior_private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        Plan {
            planned: decode_wire(response.planned_state.as_ref()).unwrap(),
            replaces: response.requires_replace.len(),
        }
    }

    async fn apply(
        &self,
        type_name: &str,
        prior: &DynamicValue,
        planned: &DynamicValue,
    ) -> (DynamicValue, Vec<Diagnostic>) {
        let response = self
            .provider
            .apply_resource_change(Request::new(apply_resource_change::Request {
                type_name: type_name.into(),
                prior_state: Some(encode_wire(prior).unwrap()),
                planned_state: Some(encode_wire(planned).unwrap()),
                config: Some(encode_wire(planned).unwrap()),
                planned_private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();
        (
            decode_wire(response.new_state.as_ref()).unwrap(),
            response.diagnostics,
        )
    }

    async fn read(&self, type_name: &str, state: &DynamicValue) -> (DynamicValue, Vec<Diagnostic>) {
        let response = self
            .provider
            .read_resource(Request::new(read_resource::Request {
                type_name: type_name.into(),
                current_state: Some(encode_wire(state).unwrap()),
                private: vec![],
                provider_meta: None,
            }))
            .await
            .unwrap()
            .into_inner();
        (
            decode_wire(response.new_state.as_ref()).unwrap(),
            response.diagnostics,
        )
    }
}

fn project_json(description: &str) -> serde_json::Value {
    json!({
        "id": "p-1",
        "name": "apps",
        "description": description,
        "orgId": "org-1",
        "administrators": [{"email": "admin@example.com", "type": "user"}],
        "zones": [],
        "constraints": {},
        "customProperties": {},
        "placementPolicy": "DEFAULT",
        "sharedResources": true
    })
}

fn finished(resource: &str) -> serde_json::Value {
    json!({
        "id": "t-1",
        "progress": 100,
        "status": "FINISHED",
        "resources": [resource]
    })
}

fn disk_json(capacity: i64) -> serde_json::Value {
    json!({
        "id": "bd-1",
        "name": "data",
        "capacityInGB": capacity,
        "projectId": "p-1",
        "persistent": false,
        "status": "AVAILABLE",
        "tags": [],
        "customProperties": {}
    })
}

#[tokio::test]
async fn test_project_lifecycle() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("POST"))
        .and(path("/iaas/api/projects"))
        .and(body_partial_json(json!({"name": "apps", "description": "first"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(project_json("first")))
        .expect(1)
        .mount(&server)
        .await;

    // Create
    let proposed = make_state(vec![
        ("name", string_value("apps")),
        ("description", string_value("first")),
    ]);
    let plan = harness.plan("vra_project", &DynamicValue::Null, &proposed).await;
    assert!(plan.planned.attr("id").is_unknown());

    let (state, diags) = harness.apply("vra_project", &DynamicValue::Null, &plan.planned).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(state.attr("id").as_string(), Some("p-1"));
    assert_eq!(state.attr("org_id").as_string(), Some("org-1"));
    assert_eq!(state.attr("placement_policy").as_string(), Some("DEFAULT"));
    assert!(state.is_wholly_known());

    // Someone edits the description outside Terraform
    Mock::given(method("GET"))
        .and(path("/iaas/api/projects/p-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("edited")))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let (refreshed, diags) = harness.read("vra_project", &state).await;
    assert!(diags.is_empty());
    assert_eq!(refreshed.attr("description").as_string(), Some("edited"));

    // Plan puts it back in place
    let mut proposed = refreshed.clone();
    proposed.insert("description", string_value("first"));
    let plan = harness.plan("vra_project", &refreshed, &proposed).await;
    assert_eq!(plan.replaces, 0);

    Mock::given(method("PATCH"))
        .and(path("/iaas/api/projects/p-1"))
        .and(body_partial_json(json!({"description": "first"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("first")))
        .expect(1)
        .mount(&server)
        .await;

    let (state, diags) = harness.apply("vra_project", &refreshed, &plan.planned).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(state.attr("description").as_string(), Some("first"));

    // Destroy
    Mock::given(method("DELETE"))
        .and(path("/iaas/api/projects/p-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let plan = harness.plan("vra_project", &state, &DynamicValue::Null).await;
    assert!(plan.planned.is_null());
    let (state, diags) = harness.apply("vra_project", &state, &DynamicValue::Null).await;
    assert!(diags.is_empty());
    assert!(state.is_null());
}

#[tokio::test]
async fn test_read_of_deleted_object_clears_state() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("GET"))
        .and(path("/iaas/api/projects/p-gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let state = make_state(vec![("id", string_value("p-gone")), ("name", string_value("old"))]);
    let (new_state, diags) = harness.read("vra_project", &state).await;
    assert!(diags.is_empty());
    assert!(new_state.is_null());
}

#[tokio::test]
async fn test_destroy_of_missing_object_succeeds() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("DELETE"))
        .and(path("/iaas/api/projects/p-gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let state = make_state(vec![("id", string_value("p-gone")), ("name", string_value("old"))]);
    let (new_state, diags) = harness.apply("vra_project", &state, &DynamicValue::Null).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert!(new_state.is_null());
}

#[tokio::test]
async fn test_api_errors_become_diagnostics() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("POST"))
        .and(path("/iaas/api/projects"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Project name already exists"})),
        )
        .mount(&server)
        .await;

    let proposed = make_state(vec![("name", string_value("apps"))]);
    let plan = harness.plan("vra_project", &DynamicValue::Null, &proposed).await;
    let (state, diags) = harness.apply("vra_project", &DynamicValue::Null, &plan.planned).await;

    assert!(state.is_null());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].summary, "Failed to create vra_project");
    assert!(diags[0].detail.contains("already exists"));
}

#[tokio::test]
async fn test_block_device_lifecycle() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("POST"))
        .and(path("/iaas/api/block-devices"))
        .and(body_partial_json(json!({"name": "data", "capacityInGB": 4})))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(finished("/iaas/api/block-devices/bd-1")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/iaas/api/block-devices/bd-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(disk_json(4)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Create
    let proposed = make_state(vec![
        ("name", string_value("data")),
        ("capacity_in_gb", int_value(4)),
        ("project_id", string_value("p-1")),
    ]);
    let plan = harness.plan("vra_block_device", &DynamicValue::Null, &proposed).await;
    let (state, diags) = harness
        .apply("vra_block_device", &DynamicValue::Null, &plan.planned)
        .await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(state.attr("id").as_string(), Some("bd-1"));
    assert_eq!(state.attr("status").as_string(), Some("AVAILABLE"));
    assert_eq!(state.attr("purge").as_bool(), Some(false));

    // Grow in place
    Mock::given(method("POST"))
        .and(path("/iaas/api/block-devices/bd-1"))
        .and(query_param("capacityInGB", "8"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(finished("/iaas/api/block-devices/bd-1")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/iaas/api/block-devices/bd-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(disk_json(8)))
        .mount(&server)
        .await;

    let mut proposed = state.clone();
    proposed.insert("capacity_in_gb", int_value(8));
    let plan = harness.plan("vra_block_device", &state, &proposed).await;
    assert_eq!(plan.replaces, 0);
    assert!(plan.planned.attr("status").is_unknown());

    let (state, diags) = harness.apply("vra_block_device", &state, &plan.planned).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(state.attr("capacity_in_gb").as_i64(), Some(8));

    // Renaming needs a new disk
    let mut proposed = state.clone();
    proposed.insert("name", string_value("logs"));
    let plan = harness.plan("vra_block_device", &state, &proposed).await;
    assert_eq!(plan.replaces, 1);

    // Destroy
    Mock::given(method("DELETE"))
        .and(path("/iaas/api/block-devices/bd-1"))
        .and(query_param("purge", "false"))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(finished("/iaas/api/block-devices/bd-1")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (state, diags) = harness.apply("vra_block_device", &state, &DynamicValue::Null).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert!(state.is_null());
}

#[tokio::test]
async fn test_failed_request_is_reported() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("POST"))
        .and(path("/iaas/api/block-devices"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "id": "t-9",
            "progress": 0,
            "status": "INPROGRESS"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/iaas/api/request-tracker/t-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-9",
            "progress": 100,
            "status": "FAILED",
            "message": "no placement matches the constraints"
        })))
        .mount(&server)
        .await;

    let proposed = make_state(vec![
        ("name", string_value("data")),
        ("capacity_in_gb", int_value(4)),
        ("project_id", string_value("p-1")),
    ]);
    let plan = harness.plan("vra_block_device", &DynamicValue::Null, &proposed).await;
    let (_, diags) = harness
        .apply("vra_block_device", &DynamicValue::Null, &plan.planned)
        .await;

    assert_eq!(diags.len(), 1);
    assert!(diags[0].detail.contains("no placement matches"));
}

#[tokio::test]
async fn test_project_data_source_by_name() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("GET"))
        .and(path("/iaas/api/projects"))
        .and(query_param("$filter", "name eq 'apps'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [project_json("first")],
            "totalElements": 1,
            "numberOfElements": 1
        })))
        .mount(&server)
        .await;

    let config = make_state(vec![("name", string_value("apps"))]);
    let response = harness
        .provider
        .read_data_source(Request::new(read_data_source::Request {
            type_name: "vra_project".into(),
            config: Some(encode_wire(&config).unwrap()),
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = decode_wire(response.state.as_ref()).unwrap();
    assert_eq!(state.attr("id").as_string(), Some("p-1"));
    assert_eq!(state.attr("description").as_string(), Some("first"));
}

fn version_json(status: &str) -> serde_json::Value {
    json!({
        "id": "v-1",
        "blueprintId": "bp-1",
        "version": "1.0",
        "name": "web",
        "status": status,
        "valid": true,
        "projectId": "p-1"
    })
}

fn released_version_state() -> DynamicValue {
    make_state(vec![
        ("id", string_value("v-1")),
        ("blueprint_id", string_value("bp-1")),
        ("version", string_value("1.0")),
        ("release", DynamicValue::Bool(true)),
    ])
}

#[tokio::test]
async fn test_blueprint_version_destroy_unreleases() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("GET"))
        .and(path("/blueprint/api/blueprints/bp-1/versions/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("RELEASED")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/blueprint/api/blueprints/bp-1/versions/1.0/actions/unrelease"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("VERSIONED")))
        .expect(1)
        .mount(&server)
        .await;

    let (state, diags) = harness
        .apply("vra_blueprint_version", &released_version_state(), &DynamicValue::Null)
        .await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert!(state.is_null());
}

#[tokio::test]
async fn test_blueprint_version_destroy_leaves_unreleased_version_alone() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("GET"))
        .and(path("/blueprint/api/blueprints/bp-1/versions/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("VERSIONED")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/blueprint/api/blueprints/bp-1/versions/1.0/actions/unrelease"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_json("VERSIONED")))
        .expect(0)
        .mount(&server)
        .await;

    let (state, diags) = harness
        .apply("vra_blueprint_version", &released_version_state(), &DynamicValue::Null)
        .await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert!(state.is_null());
}

fn machine_json() -> serde_json::Value {
    json!({
        "id": "m-1",
        "name": "web",
        "projectId": "p-1",
        "address": "10.0.0.5",
        "powerState": "ON",
        "tags": [],
        "customProperties": {}
    })
}

/// Attached disks as listed by the API, boot disk first
fn machine_disks_json(data_disk: &str) -> serde_json::Value {
    json!({
        "content": [
            {"id": "boot", "name": "boot", "capacityInGB": 20, "customProperties": {"bootOrder": "1"}},
            {"id": data_disk, "name": data_disk, "capacityInGB": 4, "customProperties": {}}
        ],
        "totalElements": 2,
        "numberOfElements": 2
    })
}

fn attached(ids: &[&str]) -> DynamicValue {
    DynamicValue::List(
        ids.iter()
            .map(|id| make_state(vec![("block_device_id", string_value(*id))]))
            .collect(),
    )
}

#[tokio::test]
async fn test_machine_resize_and_disk_swap() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("GET"))
        .and(path("/iaas/api/machines/m-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/iaas/api/machines/m-1/disks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_disks_json("bd-2")))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let state = make_state(vec![
        ("id", string_value("m-1")),
        ("name", string_value("web")),
        ("project_id", string_value("p-1")),
        ("flavor", string_value("small")),
        ("image", string_value("ubuntu")),
        ("disks", attached(&["bd-2"])),
    ]);
    let (refreshed, diags) = harness.read("vra_machine", &state).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(refreshed.attr("flavor").as_string(), Some("small"));
    let disks = refreshed.attr("disks").as_list().unwrap();
    assert_eq!(disks.len(), 1);
    assert_eq!(disks[0].attr("block_device_id").as_string(), Some("bd-2"));

    // Bigger flavor, bd-2 swapped for bd-3
    let mut proposed = refreshed.clone();
    proposed.insert("flavor", string_value("medium"));
    proposed.insert("disks", attached(&["bd-3"]));
    let plan = harness.plan("vra_machine", &refreshed, &proposed).await;
    assert_eq!(plan.replaces, 0);

    Mock::given(method("POST"))
        .and(path("/iaas/api/machines/m-1/operations/resize"))
        .and(query_param("name", "medium"))
        .respond_with(ResponseTemplate::new(202).set_body_json(finished("/iaas/api/machines/m-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/iaas/api/machines/m-1/disks/bd-2"))
        .respond_with(ResponseTemplate::new(202).set_body_json(finished("/iaas/api/machines/m-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/iaas/api/machines/m-1/disks"))
        .and(body_partial_json(json!({"blockDeviceId": "bd-3"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(finished("/iaas/api/machines/m-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/iaas/api/machines/m-1/disks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_disks_json("bd-3")))
        .mount(&server)
        .await;
    // Nothing else changed, so no PATCH
    Mock::given(method("PATCH"))
        .and(path("/iaas/api/machines/m-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machine_json()))
        .expect(0)
        .mount(&server)
        .await;

    let (state, diags) = harness.apply("vra_machine", &refreshed, &plan.planned).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(state.attr("flavor").as_string(), Some("medium"));
    assert_eq!(state.attr("power_state").as_string(), Some("ON"));

    let (refreshed, diags) = harness.read("vra_machine", &state).await;
    assert!(diags.is_empty(), "{:?}", diags);
    let disks = refreshed.attr("disks").as_list().unwrap();
    assert_eq!(disks.len(), 1);
    assert_eq!(disks[0].attr("block_device_id").as_string(), Some("bd-3"));
}

fn deployment_json() -> serde_json::Value {
    json!({
        "id": "d-1",
        "name": "web",
        "projectId": "p-1",
        "blueprintId": "bp-1",
        "blueprintVersion": "1.0",
        "status": "CREATE_SUCCESSFUL",
        // the blueprint's default for image comes back too
        "inputs": {"count": 2, "image": "ubuntu"},
        "resources": [{"id": "r-1", "name": "Cloud_Machine_1", "type": "Cloud.Machine"}]
    })
}

#[tokio::test]
async fn test_deployment_lifecycle() {
    let server = MockServer::start().await;
    let harness = Harness::new(&server);

    Mock::given(method("POST"))
        .and(path("/blueprint/api/blueprint-requests"))
        .and(body_partial_json(json!({
            "blueprintId": "bp-1",
            "deploymentName": "web",
            "projectId": "p-1",
            "inputs": {"count": 2}
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "id": "br-1",
            "status": "STARTED"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blueprint/api/blueprint-requests/br-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "br-1",
            "status": "STARTED"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blueprint/api/blueprint-requests/br-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "br-1",
            "status": "FINISHED",
            "deploymentId": "d-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deployment/api/deployments/d-1"))
        .and(query_param("expand", "resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_json()))
        .mount(&server)
        .await;

    // Create
    let inputs: HashMap<String, String> = [("count".to_string(), "2".to_string())].into_iter().collect();
    let proposed = make_state(vec![
        ("name", string_value("web")),
        ("project_id", string_value("p-1")),
        ("blueprint_id", string_value("bp-1")),
        ("inputs", string_map_value(&inputs)),
    ]);
    let plan = harness.plan("vra_deployment", &DynamicValue::Null, &proposed).await;
    assert!(plan.planned.attr("id").is_unknown());

    let (state, diags) = harness
        .apply("vra_deployment", &DynamicValue::Null, &plan.planned)
        .await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(state.attr("id").as_string(), Some("d-1"));
    assert_eq!(state.attr("blueprint_version").as_string(), Some("1.0"));
    assert_eq!(state.attr("resource_ids").to_json(), json!(["r-1"]));

    // Read keeps only the configured inputs
    let (refreshed, diags) = harness.read("vra_deployment", &state).await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert_eq!(refreshed.attr("inputs").to_json(), json!({"count": "2"}));
    let plan = harness.plan("vra_deployment", &refreshed, &refreshed).await;
    assert_eq!(plan.replaces, 0);

    // Destroy waits for the delete request
    Mock::given(method("DELETE"))
        .and(path("/deployment/api/deployments/d-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "req-1",
            "name": "Delete",
            "status": "PENDING",
            "deploymentId": "d-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deployment/api/requests/req-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "req-1",
            "status": "INPROGRESS"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deployment/api/requests/req-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "req-1",
            "status": "SUCCESSFUL"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (state, diags) = harness
        .apply("vra_deployment", &refreshed, &DynamicValue::Null)
        .await;
    assert!(diags.is_empty(), "{:?}", diags);
    assert!(state.is_null());
}
