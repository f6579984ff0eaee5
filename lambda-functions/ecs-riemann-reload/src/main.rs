use ecs_riemann_reload::{
    Config, EcsControlPlane, InvocationContext, RedeployTrigger, RedeploymentResult,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

async fn function_handler(
    trigger: &RedeployTrigger<EcsControlPlane>,
    event: LambdaEvent<Value>,
) -> Result<RedeploymentResult, Error> {
    // Cluster and service are read per invocation; the log level is fixed at cold start.
    let config = Config::from_env();
    let context = InvocationContext::from(&event.context);

    Ok(trigger.handle(&config, &event.payload, Some(&context)).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let log_level = Config::from_env().log_level;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(log_level).into())
                .from_env_lossy(),
        )
        .json()
        .init();

    let trigger = RedeployTrigger::new().await;
    let trigger = &trigger;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(trigger, event).await
    }))
    .await
}
