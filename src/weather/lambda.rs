use https_lambdas::weather::{self, WeatherConfig};
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

    weather::fetch_current_weather(&WeatherConfig::from_env()).await?;

    Ok(json!({}))
}

#[cfg(test)]
mod test {
    use super::*;
    use https_lambdas::WEATHER_URL_VAR;
    use lambda_runtime::Context;
    use std::env;

    #[tokio::test]
    async fn test_function_completes() -> Result<(), LambdaError> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/current?lat=38&lon=-77")
            .with_status(200)
            .with_body(r#"{"main":{"temp":21.5}}"#)
            .create_async()
            .await;

        // Only this test reads the variable.
        unsafe { env::set_var(WEATHER_URL_VAR, server.url()) };

        let event = LambdaEvent::new(json!({"source": "aws.events"}), Context::default());
        let result = function(event).await?;

        mock.assert_async().await;
        assert_eq!(json!({}), result);

        Ok(())
    }
}
