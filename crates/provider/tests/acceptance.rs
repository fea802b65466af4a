//! Acceptance tests against a live vRA instance
//!
//! Run with `TF_ACC=1 VRA_URL=... VRA_REFRESH_TOKEN=... cargo test -- --ignored`.
//! They create and delete real objects.

use serde_json::json;
use terraform_provider_vra::state::{decode_wire, encode_wire, make_state, string_value, DynamicValue};
use terraform_provider_vra::tfplugin6::provider_server::Provider;
use terraform_provider_vra::tfplugin6::{
    apply_resource_change, configure_provider, plan_resource_change, read_resource,
};
use terraform_provider_vra::VraProvider;
use tonic::Request;

fn enabled() -> bool {
    std::env::var("TF_ACC").map_or(false, |v| !v.is_empty()) && std::env::var("VRA_URL").is_ok()
}

async fn configured() -> VraProvider {
    let provider = VraProvider::new();
    // Every provider argument falls back to its VRA_* variable.
    let response = provider
        .configure_provider(Request::new(configure_provider::Request {
            terraform_version: "1.7.0".into(),
            config: Some(encode_wire(&make_state(vec![])).unwrap()),
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    provider
}

#[tokio::test]
#[ignore]
async fn test_acc_project_basic() {
    if !enabled() {
        eprintln!("TF_ACC and VRA_URL must be set");
        return;
    }
    let provider = configured().await;
    let name = format!("tf-acc-{}", std::process::id());

    let proposed = make_state(vec![
        ("name", string_value(&name)),
        ("description", string_value("created by the acceptance tests")),
    ]);
    let plan = provider
        .plan_resource_change(Request::new(plan_resource_change::Request {
            type_name: "vra_project".into(),
            prior_state: Some(encode_wire(&DynamicValue::Null).unwrap()),
            proposed_new_state: Some(encode_wire(&proposed).unwrap()),
            config: Some(encode_wire(&proposed).unwrap()),
            prior_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();

    let created = provider
        .apply_resource_change(Request::new(apply_resource_change::Request {
            type_name: "vra_project".into(),
            prior_state: Some(encode_wire(&DynamicValue::Null).unwrap()),
            planned_state: plan.planned_state,
            config: Some(encode_wire(&proposed).unwrap()),
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    let state = decode_wire(created.new_state.as_ref()).unwrap();
    assert_eq!(state.attr("name").as_string(), Some(name.as_str()));

    let read = provider
        .read_resource(Request::new(read_resource::Request {
            type_name: "vra_project".into(),
            current_state: created.new_state.clone(),
            private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let refreshed = decode_wire(read.new_state.as_ref()).unwrap();
    assert_eq!(
        refreshed.attr("id").to_json(),
        json!(state.attr("id").as_string())
    );

    let destroyed = provider
        .apply_resource_change(Request::new(apply_resource_change::Request {
            type_name: "vra_project".into(),
            prior_state: read.new_state,
            planned_state: Some(encode_wire(&DynamicValue::Null).unwrap()),
            config: None,
            planned_private: vec![],
            provider_meta: None,
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(destroyed.diagnostics.is_empty(), "{:?}", destroyed.diagnostics);
}
