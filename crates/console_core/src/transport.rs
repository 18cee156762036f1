use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::CommandError,
    protocol::{Command, RawResponse},
};
use tracing::debug;
use url::Url;

use crate::CommandChannel;

/// Posts each command as a form to the controller's command endpoint.
pub struct HttpCommandChannel {
    http: Client,
    endpoint: Url,
}

impl HttpCommandChannel {
    pub fn new(controller_url: &str, endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = resolve_endpoint(controller_url, endpoint)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build controller http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Joins `endpoint` below `controller_url`, treating the controller URL as a
/// directory even without a trailing slash.
pub fn resolve_endpoint(controller_url: &str, endpoint: &str) -> Result<Url> {
    let mut base = Url::parse(controller_url.trim())
        .with_context(|| format!("invalid controller url '{controller_url}'"))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(endpoint.trim().trim_start_matches('/'))
        .with_context(|| format!("invalid command endpoint '{endpoint}'"))
}

#[async_trait]
impl CommandChannel for HttpCommandChannel {
    async fn send(&self, command: Command) -> Result<RawResponse, CommandError> {
        let action = command.action;
        debug!(%action, endpoint = %self.endpoint, "posting controller command");
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&command.form_fields())
            .send()
            .await
            .map_err(|err| CommandError::transport(action, err))?
            .error_for_status()
            .map_err(|err| CommandError::transport(action, err))?;
        let body = response
            .text()
            .await
            .map_err(|err| CommandError::transport(action, err))?;
        Ok(RawResponse::new(action, body))
    }
}
