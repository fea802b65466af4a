//! Generates the tonic server stubs for the Terraform plugin protocol.
//!
//! The wire messages live in `src/tfplugin6.rs` and `src/health.rs`; only the
//! service plumbing is generated here so the build does not need `protoc`.

use tonic_build::manual::{Builder, Method, Service};

fn unary(name: &str, route: &str, module: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("{}::Request", module))
        .output_type(format!("{}::Response", module))
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let rpcs = [
        ("get_metadata", "GetMetadata"),
        ("get_provider_schema", "GetProviderSchema"),
        ("validate_provider_config", "ValidateProviderConfig"),
        ("validate_resource_config", "ValidateResourceConfig"),
        ("validate_data_resource_config", "ValidateDataResourceConfig"),
        ("upgrade_resource_state", "UpgradeResourceState"),
        ("configure_provider", "ConfigureProvider"),
        ("read_resource", "ReadResource"),
        ("plan_resource_change", "PlanResourceChange"),
        ("apply_resource_change", "ApplyResourceChange"),
        ("import_resource_state", "ImportResourceState"),
        ("read_data_source", "ReadDataSource"),
        ("get_functions", "GetFunctions"),
        ("stop_provider", "StopProvider"),
    ];

    let mut provider = Service::builder().name("Provider").package("tfplugin6");
    for (name, route) in rpcs {
        provider = provider.method(unary(
            name,
            route,
            &format!("crate::tfplugin6::{}", name),
        ));
    }

    let health = Service::builder()
        .name("Health")
        .package("grpc.health.v1")
        .method(
            Method::builder()
                .name("check")
                .route_name("Check")
                .input_type("crate::health::HealthCheckRequest")
                .output_type("crate::health::HealthCheckResponse")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    Builder::new()
        .build_client(false)
        .compile(&[provider.build(), health]);
}
