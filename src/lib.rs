use anyhow::{Result, anyhow};
use log::LevelFilter;
use std::borrow::Cow;
use std::env;
use std::error::Error;

pub mod credentials;
pub mod login;
pub mod weather;

pub const APP_NAME: &str = "https_lambdas";

pub static WEATHER_URL_VAR: &str = "HTTPS_LAMBDAS_WEATHER_URL";
pub static LOGIN_URL_VAR: &str = "HTTPS_LAMBDAS_LOGIN_URL";
pub static BUCKET_VAR: &str = "HTTPS_LAMBDAS_BUCKET";
pub static KEY_VAR: &str = "HTTPS_LAMBDAS_KEY";
pub static ACCEPT_INVALID_CERTS_VAR: &str = "HTTPS_LAMBDAS_ACCEPT_INVALID_CERTS";

pub type LambdaError = Box<dyn Error + Send + Sync + 'static>;

pub fn set_up_logger<T>(calling_module: T, verbose: bool) -> Result<()>
where
    T: Into<Cow<'static, str>>,
{
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(LevelFilter::Warn)
        .level_for(APP_NAME, level)
        .level_for(calling_module, level)
        .chain(std::io::stdout())
        .apply();

    Ok(())
}

/// Reads `var`, falling back to `default` when it is unset or not unicode.
pub fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Reads a boolean flag from `var` with the spellings clap's `BoolishValueParser` accepts.
/// Unset or empty is `false`; anything unrecognised is an error.
pub fn env_flag(var: &str) -> Result<bool> {
    match env::var(var) {
        Ok(value) => parse_flag(&value).ok_or_else(|| anyhow!("invalid {} value: {:?}", var, value)),
        Err(_) => Ok(false),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "y" | "yes" | "t" | "true" | "on" => Some(true),
        "" | "0" | "n" | "no" | "f" | "false" | "off" => Some(false),
        _ => None,
    }
}

pub mod http {
    use super::*;
    use log::{debug, warn};
    use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
    use reqwest::{Client, Request};

    /// `content-type` and `accept` both set to `application/json`.
    pub fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    pub fn client(accept_invalid_certs: bool) -> Result<Client> {
        if accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
        }

        Ok(Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?)
    }

    /// Sends `request` and reads the whole body, failing on a non-success status after logging it.
    pub async fn send(client: &Client, request: Request) -> Result<String> {
        let method = request.method().clone();
        let url = request.url().clone();

        debug!("Sending {} {}", method, url);
        let response = client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Received {} from {} {}", status, method, url);

        if !status.is_success() {
            warn!("{} {} returned {}: {}", method, url, status, body);
            anyhow::bail!("{} {} returned {}", method, url, status);
        }

        Ok(body)
    }
}

pub mod s3util {
    use super::*;
    use aws_lambda_events::s3::S3Event;
    use bytes::Bytes;
    use log::debug;
    use percent_encoding::percent_decode_str;
    use serde_json::Value;

    const PREFIX_DELIMITER: char = '/';

    pub async fn get(
        s3_client: &aws_sdk_s3::Client,
        bucket_name: &str,
        object_name: &str,
    ) -> Result<Bytes> {
        debug!("Reading {}:{} from S3", bucket_name, object_name);
        let bytes = s3_client
            .get_object()
            .bucket(bucket_name)
            .key(object_name)
            .send()
            .await?
            .body
            .collect()
            .await?
            .into_bytes();
        debug!("Read {}:{} from S3", bucket_name, object_name);

        Ok(bytes)
    }

    /// `land/raw/creds.txt` -> `creds.txt`
    pub fn file_name(object_name: &str) -> &str {
        object_name
            .rsplit_once(PREFIX_DELIMITER)
            .map_or(object_name, |(_, name)| name)
    }

    /// `land/raw/creds.txt` -> `land/raw`
    pub fn base_name(object_name: &str) -> &str {
        object_name
            .rsplit_once(PREFIX_DELIMITER)
            .map_or("", |(base, _)| base)
    }

    /// `land/raw/creds.txt` -> `land/raw/`
    pub fn base_path(object_name: &str) -> &str {
        object_name
            .rfind(PREFIX_DELIMITER)
            .map_or("", |i| &object_name[..=i])
    }

    /// Decodes an object key as it appears in S3 event notifications, where spaces are `+`.
    pub fn decode_key(key: &str) -> Result<String> {
        Ok(percent_decode_str(&key.replace('+', " "))
            .decode_utf8()?
            .into_owned())
    }

    /// Bucket and decoded key of the first record, if `payload` is an S3 event notification.
    pub fn first_trigger(payload: &Value) -> Result<Option<(String, String)>> {
        let event: S3Event = match serde_json::from_value(payload.clone()) {
            Ok(event) => event,
            Err(e) => {
                debug!("Not an S3 event: {}", e);
                return Ok(None);
            }
        };

        for record in event.records {
            if let (Some(bucket), Some(key)) = (record.s3.bucket.name, record.s3.object.key) {
                return Ok(Some((bucket, decode_key(&key)?)));
            }
        }

        Ok(None)
    }
}
