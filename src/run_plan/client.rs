//! Provides an interface for opening NITRO connections to appliances.

use crate::nitro::Nitro;
use async_trait::async_trait;

#[cfg(feature = "http")]
use {
    crate::config::Config, crate::nitro::http::HttpNitro, anyhow::Context, std::sync::Arc,
};

/// Connects to appliances and returns values representing those connections.
#[async_trait]
pub trait ManageClient<C: Nitro> {
    /// Connect to `appliance` and, on success, return an interface to it.
    async fn connect(&mut self, appliance: &str) -> anyhow::Result<C>;
}

/// Production implementation of [ManageClient]. Looks appliances up in the [Config].
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct ConnectionManager {
    config: Arc<Config>,
}

#[cfg(feature = "http")]
impl ConnectionManager {
    pub fn new(config: Arc<Config>) -> Self {
        ConnectionManager { config }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ManageClient<HttpNitro> for ConnectionManager {
    async fn connect(&mut self, appliance: &str) -> anyhow::Result<HttpNitro> {
        let config = self.config.appliance(appliance)?;
        HttpNitro::new(config)
            .with_context(|| format!("failed to set up NITRO client for {appliance}"))
    }
}
