//! The production [Nitro] implementation: NITRO over HTTP(S) with reqwest.

use crate::config::ApplianceConfig;
use crate::nitro::{Fault, Nitro};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const USER_HEADER: &str = "X-NITRO-USER";
const PASS_HEADER: &str = "X-NITRO-PASS";

/// A connection to one appliance.
///
/// NITRO authenticates every request with the `X-NITRO-USER` and `X-NITRO-PASS` headers, so there
/// is no login step and no session to expire.
#[derive(Clone, Debug)]
pub struct HttpNitro {
    client: Client,

    /// `http[s]://<host>/nitro/v1/`
    base_url: String,

    username: String,
    password: String,
}

impl HttpNitro {
    pub fn new(config: &ApplianceConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let scheme = match config.use_ssl {
            true => "https",
            false => "http",
        };

        Ok(HttpNitro {
            client,
            base_url: format!("{scheme}://{}/nitro/v1/", config.host),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticates and sends a request, turning anything but a 2xx response into a [Fault].
    async fn call(&self, request: RequestBuilder) -> Result<Response, Fault> {
        let response = request
            .header(USER_HEADER, &self.username)
            .header(PASS_HEADER, &self.password)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "NITRO request failed");
                Fault::message(err.to_string())
            })?;

        let status = response.status();
        debug!(%status, url = %response.url(), "NITRO response");
        if status.is_success() {
            return Ok(response);
        }

        let fault = match response.text().await {
            Ok(text) if text.trim().is_empty() => Fault::message(status.to_string()),
            Ok(text) => serde_json::from_str(&text)
                .map(Fault)
                .unwrap_or_else(|_| Fault::message(text)),
            Err(err) => Fault::message(err.to_string()),
        };
        warn!(%status, %fault, "NITRO rejected request");
        Err(fault)
    }
}

#[async_trait]
impl Nitro for HttpNitro {
    async fn get(&mut self, path: &str) -> Result<Value, Fault> {
        let response = self.call(self.client.get(self.url(path))).await?;
        let text = response
            .text()
            .await
            .map_err(|err| Fault::message(err.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&text).map_err(|err| Fault::message(err.to_string()))
    }

    async fn post(&mut self, path: &str, payload: &Value) -> Result<(), Fault> {
        self.call(self.client.post(self.url(path)).json(payload))
            .await
            .map(|_| ())
    }

    async fn put(&mut self, path: &str, payload: &Value) -> Result<(), Fault> {
        self.call(self.client.put(self.url(path)).json(payload))
            .await
            .map(|_| ())
    }
}
