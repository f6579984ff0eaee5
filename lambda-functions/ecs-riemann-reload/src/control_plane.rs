use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ecs::Client as EcsClient;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

const UPDATE_SERVICE: &str = "UpdateService";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub cluster: String,
    pub service: String,
    pub force_new_deployment: bool,
}

impl DeploymentRequest {
    /// A forced redeployment of `service` on its current task definition.
    pub fn forced(cluster: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            service: service.into(),
            force_new_deployment: true,
        }
    }
}

/// The service description echoed back by the control plane.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDeployment {
    pub service_name: String,
    pub status: String,
    pub desired_count: i32,
    pub running_count: i32,
    pub pending_count: i32,
}

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("{0}")]
    Request(String),

    #[error("{operation} response did not include a service description")]
    MissingServiceDescription { operation: String },
}

impl ControlPlaneError {
    /// Flattens an SDK failure into a single message.
    ///
    /// Modeled service errors use the familiar
    /// `An error occurred (<Code>) when calling the <Operation> operation: <message>`
    /// form; dispatch, timeout and parse failures keep the full error chain.
    pub fn from_sdk<E, R>(operation: &str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: std::fmt::Debug,
    {
        match err.code() {
            Some(code) => {
                let message = err.message().unwrap_or_default();
                Self::Request(format!(
                    "An error occurred ({}) when calling the {} operation: {}",
                    code, operation, message
                ))
            }
            None => Self::Request(DisplayErrorContext(&err).to_string()),
        }
    }
}

#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn update_service(
        &self,
        request: DeploymentRequest,
    ) -> Result<ServiceDeployment, ControlPlaneError>;
}

pub struct EcsControlPlane {
    ecs_client: EcsClient,
}

impl EcsControlPlane {
    pub async fn new() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        Self::from_client(EcsClient::new(&config))
    }

    pub fn from_client(ecs_client: EcsClient) -> Self {
        Self { ecs_client }
    }
}

#[async_trait]
impl ControlPlane for EcsControlPlane {
    async fn update_service(
        &self,
        request: DeploymentRequest,
    ) -> Result<ServiceDeployment, ControlPlaneError> {
        let output = self
            .ecs_client
            .update_service()
            .cluster(&request.cluster)
            .service(&request.service)
            .force_new_deployment(request.force_new_deployment)
            .send()
            .await
            .map_err(|e| ControlPlaneError::from_sdk(UPDATE_SERVICE, e))?;

        info!("UpdateService response: \"{:?}\"", output);

        let service =
            output
                .service()
                .ok_or_else(|| ControlPlaneError::MissingServiceDescription {
                    operation: UPDATE_SERVICE.to_string(),
                })?;

        Ok(ServiceDeployment {
            service_name: service.service_name().unwrap_or_default().to_string(),
            status: service.status().unwrap_or_default().to_string(),
            desired_count: service.desired_count(),
            running_count: service.running_count(),
            pending_count: service.pending_count(),
        })
    }
}
