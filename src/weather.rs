use crate::{WEATHER_URL_VAR, env_or, http};
use anyhow::Result;
use log::info;
use reqwest::{Client, Request};

pub const DEFAULT_WEATHER_URL: &str = "https://fcc-weather-api.glitch.me";
const CURRENT_WEATHER_PATH: &str = "/api/current?lat=38&lon=-77";

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
        }
    }
}

impl WeatherConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_or(WEATHER_URL_VAR, DEFAULT_WEATHER_URL),
        }
    }
}

pub fn build_request(client: &Client, config: &WeatherConfig) -> Result<Request> {
    let url = format!(
        "{}{}",
        config.base_url.trim_end_matches('/'),
        CURRENT_WEATHER_PATH
    );

    Ok(client.get(url).headers(http::json_headers()).build()?)
}

pub async fn fetch_current_weather(config: &WeatherConfig) -> Result<String> {
    let client = http::client(false)?;
    let request = build_request(&client, config)?;

    let response = http::send(&client, request).await?;
    info!("HTTP GET Response: {}", response);

    Ok(response)
}
