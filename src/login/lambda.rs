use https_lambdas::login::{self, LoginConfig};
use https_lambdas::{LambdaError, set_up_logger};
use lambda_runtime::{LambdaEvent, service_fn};
use log::info;
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    let func = service_fn(function);
    lambda_runtime::run(func).await?;
    Ok(())
}

async fn function(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    set_up_logger(module_path!(), false)?;

    info!("Event: {}", event.payload);

    let config = LoginConfig::from_env()?.for_event(&event.payload)?;
    login::log_in(&config).await?;

    Ok(json!({}))
}
