//! gRPC health checking (`grpc.health.v1`), polled by go-plugin

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckRequest {
    #[prost(string, tag = "1")]
    pub service: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckResponse {
    #[prost(enumeration = "health_check_response::ServingStatus", tag = "1")]
    pub status: i32,
}

pub mod health_check_response {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ServingStatus {
        Unknown = 0,
        Serving = 1,
        NotServing = 2,
        ServiceUnknown = 3,
    }
}

include!(concat!(env!("OUT_DIR"), "/grpc.health.v1.Health.rs"));

/// Service name go-plugin asks about
pub const PLUGIN_SERVICE: &str = "plugin";

/// Reports the plugin as serving for as long as the process is up
#[derive(Debug, Default, Clone, Copy)]
pub struct PluginHealth;

#[tonic::async_trait]
impl health_server::Health for PluginHealth {
    async fn check(
        &self,
        request: tonic::Request<HealthCheckRequest>,
    ) -> Result<tonic::Response<HealthCheckResponse>, tonic::Status> {
        let service = request.into_inner().service;
        let status = if service.is_empty() || service == PLUGIN_SERVICE {
            health_check_response::ServingStatus::Serving
        } else {
            health_check_response::ServingStatus::ServiceUnknown
        };
        Ok(tonic::Response::new(HealthCheckResponse {
            status: status as i32,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::health_server::Health;
    use super::*;

    #[tokio::test]
    async fn test_plugin_service_is_serving() {
        let response = PluginHealth
            .check(tonic::Request::new(HealthCheckRequest {
                service: PLUGIN_SERVICE.into(),
            }))
            .await
            .unwrap();
        assert_eq!(
            response.into_inner().status,
            health_check_response::ServingStatus::Serving as i32
        );
    }

    #[tokio::test]
    async fn test_other_services_are_unknown() {
        let response = PluginHealth
            .check(tonic::Request::new(HealthCheckRequest {
                service: "other".into(),
            }))
            .await
            .unwrap();
        assert_eq!(
            response.into_inner().status,
            health_check_response::ServingStatus::ServiceUnknown as i32
        );
    }
}
