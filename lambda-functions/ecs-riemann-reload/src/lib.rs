pub mod config;
pub mod control_plane;

pub use config::{ClusterName, Config, LogLevel, ServiceName};
pub use control_plane::{
    ControlPlane, ControlPlaneError, DeploymentRequest, EcsControlPlane, ServiceDeployment,
};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

/// `service` field carried by every log line the handler emits.
pub const LOG_SERVICE_NAME: &str = "aws-lambda-ecs-riemann-reload";

/// Invocation metadata supplied by the Lambda runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: Option<String>,
}

impl InvocationContext {
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
        }
    }
}

impl From<&lambda_runtime::Context> for InvocationContext {
    fn from(context: &lambda_runtime::Context) -> Self {
        let request_id = Some(context.request_id.clone()).filter(|id| !id.is_empty());
        Self { request_id }
    }
}

/// Flat status payload returned to the invoker.
///
/// Either the service fields or `errorMessage` are present, never both.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedeploymentResult {
    pub success: bool,
    #[serde(flatten)]
    pub service: Option<ServiceDeployment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl RedeploymentResult {
    pub fn succeeded(service: ServiceDeployment) -> Self {
        Self {
            success: true,
            service: Some(service),
            error_message: None,
        }
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            service: None,
            error_message: Some(error_message.into()),
        }
    }
}

pub struct RedeployTrigger<C> {
    control_plane: C,
}

impl RedeployTrigger<EcsControlPlane> {
    pub async fn new() -> Self {
        Self::with_control_plane(EcsControlPlane::new().await)
    }
}

impl<C: ControlPlane> RedeployTrigger<C> {
    pub fn with_control_plane(control_plane: C) -> Self {
        Self { control_plane }
    }

    /// Requests a forced redeployment of the configured service.
    ///
    /// Never fails: control plane errors are reported through
    /// `RedeploymentResult::error_message` so the notification source does
    /// not redrive the event.
    #[instrument(name = "ecs_riemann_reload", skip_all, fields(service = LOG_SERVICE_NAME))]
    pub async fn handle(
        &self,
        config: &Config,
        event: &Value,
        context: Option<&InvocationContext>,
    ) -> RedeploymentResult {
        match context.and_then(|c| c.request_id.as_deref()) {
            Some(request_id) => info!("Lambda Request ID: {}", request_id),
            None => debug!("No context object available"),
        }

        info!("Event received from SNS: \"{}\"", event);

        info!(
            "Requesting a new deployment of the ECS {} service",
            config.service_name
        );

        let request = DeploymentRequest::forced(
            config.cluster_name.as_str(),
            config.service_name.as_str(),
        );

        match self.control_plane.update_service(request).await {
            Ok(service) => {
                info!("Deployment request completed: \"{:?}\"", service);
                RedeploymentResult::succeeded(service)
            }
            Err(e) => {
                error!("Deployment action failed: {}", e);
                RedeploymentResult::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingControlPlane {
        requests: Mutex<Vec<DeploymentRequest>>,
        fail_with: Option<String>,
    }

    impl RecordingControlPlane {
        fn succeeding() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl ControlPlane for RecordingControlPlane {
        async fn update_service(
            &self,
            request: DeploymentRequest,
        ) -> Result<ServiceDeployment, ControlPlaneError> {
            let service_name = request.service.clone();
            self.requests.lock().unwrap().push(request);

            match &self.fail_with {
                Some(message) => Err(ControlPlaneError::Request(message.clone())),
                None => Ok(ServiceDeployment {
                    service_name,
                    status: "ACTIVE".to_string(),
                    desired_count: 1,
                    running_count: 1,
                    pending_count: 0,
                }),
            }
        }
    }

    #[test]
    fn test_context_from_lambda_context() {
        let mut context = lambda_runtime::Context::default();
        context.request_id = "abc-123".to_string();

        let context = InvocationContext::from(&context);
        assert_eq!(context.request_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_empty_request_id_is_absent() {
        let context = InvocationContext::from(&lambda_runtime::Context::default());
        assert_eq!(context.request_id, None);
    }

    #[test]
    fn test_success_result_serialization() {
        let result = RedeploymentResult::succeeded(ServiceDeployment {
            service_name: "riemann-consumer".to_string(),
            status: "ACTIVE".to_string(),
            desired_count: 3,
            running_count: 2,
            pending_count: 1,
        });

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["serviceName"], "riemann-consumer");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["desiredCount"], 3);
        assert_eq!(json["runningCount"], 2);
        assert_eq!(json["pendingCount"], 1);
        assert!(json.get("errorMessage").is_none());
    }

    #[test]
    fn test_failure_result_serialization() {
        let result = RedeploymentResult::failed("Service not found.");

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json, serde_json::json!({
            "success": false,
            "errorMessage": "Service not found."
        }));
    }

    #[tokio::test]
    async fn test_handle_sends_forced_request_for_configured_service() {
        let trigger = RedeployTrigger::with_control_plane(RecordingControlPlane::succeeding());
        let config = Config::builder()
            .cluster_name("test-cluster")
            .service_name("riemann-consumer")
            .build();

        let result = trigger
            .handle(&config, &serde_json::json!({"Records": []}), None)
            .await;

        assert!(result.success);
        let requests = trigger.control_plane.requests.lock().unwrap();
        assert_eq!(
            *requests,
            vec![DeploymentRequest::forced("test-cluster", "riemann-consumer")]
        );
    }

    #[tokio::test]
    async fn test_handle_absorbs_control_plane_errors() {
        let trigger = RedeployTrigger::with_control_plane(RecordingControlPlane::failing(
            "An error occurred (AccessDeniedException) when calling the UpdateService operation: denied",
        ));

        let result = trigger
            .handle(&Config::default(), &Value::Null, None)
            .await;

        assert!(!result.success);
        assert!(result.service.is_none());
        assert!(result
            .error_message
            .as_deref()
            .unwrap()
            .contains("AccessDeniedException"));
        assert_eq!(trigger.control_plane.requests.lock().unwrap().len(), 1);
    }
}
