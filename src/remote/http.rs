/// HTTP implementation of the remote gateway
///
/// Talks JSON to `{base}/profile` and `{base}/logs`. Responses may be bare or
/// wrapped as `{ "data": ... }`; anything else that does not match the
/// expected shape is reported as a malformed payload.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;

use crate::config::RemoteConfig;
use crate::domain::{DailyUsageLog, LogId, VehicleProfile};
use crate::remote::{RemoteError, RemoteGateway};

pub struct HttpGateway {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, RemoteError> {
        let builder = self.client.request(method, self.url(segments)?);
        Ok(match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and return the unwrapped JSON body (`Null` when empty)
    async fn send(&self, builder: RequestBuilder) -> Result<Value, RemoteError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).chars().take(200).collect(),
            });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        let body: Value = serde_json::from_slice(&bytes)?;
        Ok(unwrap_data(body))
    }
}

/// Strip a `{ "data": ... }` envelope if present
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn parse_profile(body: &Value) -> Result<VehicleProfile, RemoteError> {
    VehicleProfile::from_json(body)
        .ok_or_else(|| RemoteError::Malformed("profile is not an object".to_string()))
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn fetch_profile(&self) -> Result<VehicleProfile, RemoteError> {
        let body = self.send(self.request(Method::GET, &["profile"])?).await?;
        parse_profile(&body)
    }

    async fn save_profile(&self, profile: &VehicleProfile) -> Result<VehicleProfile, RemoteError> {
        let body = self
            .send(self.request(Method::PUT, &["profile"])?.json(profile))
            .await?;
        if body.is_null() {
            return Ok(profile.clone());
        }
        parse_profile(&body)
    }

    async fn list_logs(&self) -> Result<Vec<DailyUsageLog>, RemoteError> {
        let body = self.send(self.request(Method::GET, &["logs"])?).await?;
        if !body.is_array() {
            return Err(RemoteError::Malformed("logs is not an array".to_string()));
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn create_log(&self, log: &DailyUsageLog) -> Result<DailyUsageLog, RemoteError> {
        let body = self.send(self.request(Method::POST, &["logs"])?.json(log)).await?;
        if body.is_null() {
            return Ok(log.clone());
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn delete_log(&self, id: &LogId) -> Result<LogId, RemoteError> {
        let body = self
            .send(self.request(Method::DELETE, &["logs", id.as_str()])?)
            .await?;
        let echoed = body
            .get("id")
            .and_then(Value::as_str)
            .map(LogId::from)
            .unwrap_or_else(|| id.clone());
        Ok(echoed)
    }
}
