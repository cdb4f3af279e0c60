use crate::credentials::Credentials;
use crate::{
    ACCEPT_INVALID_CERTS_VAR, BUCKET_VAR, KEY_VAR, LOGIN_URL_VAR, env_flag, env_or, http, s3util,
};
use anyhow::{Context, Result};
use log::{debug, error, info};
use reqwest::header::{CONTENT_LENGTH, HeaderValue};
use reqwest::{Client, Request};
use serde_json::Value;
use std::str;

pub const DEFAULT_BUCKET: &str = "myBucketName";
pub const DEFAULT_KEY: &str = "my/object/prefix";
pub const DEFAULT_LOGIN_URL: &str = "https://example.com";
const LOGIN_PATH: &str = "/api/v2/login";

#[derive(Debug, Clone)]
pub struct LoginConfig {
    pub bucket: String,
    pub key: String,
    pub base_url: String,
    /// Skips TLS certificate verification on the login call. Off unless explicitly enabled.
    pub accept_invalid_certs: bool,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            key: DEFAULT_KEY.to_string(),
            base_url: DEFAULT_LOGIN_URL.to_string(),
            accept_invalid_certs: false,
        }
    }
}

impl LoginConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bucket: env_or(BUCKET_VAR, DEFAULT_BUCKET),
            key: env_or(KEY_VAR, DEFAULT_KEY),
            base_url: env_or(LOGIN_URL_VAR, DEFAULT_LOGIN_URL),
            accept_invalid_certs: env_flag(ACCEPT_INVALID_CERTS_VAR)?,
        })
    }

    /// When `payload` is an S3 event notification, reads credentials from the object that
    /// triggered it instead of the configured one.
    pub fn for_event(mut self, payload: &Value) -> Result<Self> {
        if let Some((bucket, key)) = s3util::first_trigger(payload)? {
            info!(
                "Received event trigger for {} in {}/{}",
                s3util::file_name(&key),
                bucket,
                s3util::base_path(&key)
            );
            self.bucket = bucket;
            self.key = key;
        }

        Ok(self)
    }
}

pub fn build_request(
    client: &Client,
    config: &LoginConfig,
    credentials: &Credentials,
) -> Result<Request> {
    let url = format!("{}{}", config.base_url.trim_end_matches('/'), LOGIN_PATH);
    let body = credentials.to_json()?;

    let mut headers = http::json_headers();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

    Ok(client.post(url).headers(headers).body(body).build()?)
}

pub async fn read_credentials(
    s3_client: &aws_sdk_s3::Client,
    config: &LoginConfig,
) -> Result<Credentials> {
    let bytes = match s3util::get(s3_client, &config.bucket, &config.key).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Unable to retrieve object content from S3");
            return Err(e.context(format!("reading {}:{}", config.bucket, config.key)));
        }
    };

    let content = str::from_utf8(&bytes)
        .with_context(|| format!("{}:{} is not UTF-8", config.bucket, config.key))?;
    let credentials = Credentials::parse(content)?;
    debug!("Parsed {:?}", credentials);

    Ok(credentials)
}

/// Posts `credentials` to the login endpoint and returns the response body.
pub async fn post_credentials(config: &LoginConfig, credentials: &Credentials) -> Result<String> {
    let client = http::client(config.accept_invalid_certs)?;
    let request = build_request(&client, config, credentials)?;

    let response = http::send(&client, request).await?;
    info!("HTTP POST Response: {}", response);

    Ok(response)
}

pub async fn log_in(config: &LoginConfig) -> Result<String> {
    let aws_config = aws_config::load_from_env().await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);

    log_in_with(&s3_client, config).await
}

pub async fn log_in_with(s3_client: &aws_sdk_s3::Client, config: &LoginConfig) -> Result<String> {
    let credentials = read_credentials(s3_client, config).await?;

    post_credentials(config, &credentials).await
}
