use std::time::Duration;

use reqwest::{Client, Response, header};
use tracing::{debug, info, warn};

use crate::auth::basic_auth_header;
use crate::error::UnboundError;
use crate::opnsense::types::*;

pub const SEARCH_OVERRIDES_PATH: &str = "/api/unbound/settings/searchHostOverride";
pub const ADD_OVERRIDE_PATH: &str = "/api/unbound/settings/addHostOverride";
pub const DEL_OVERRIDE_PATH: &str = "/api/unbound/settings/delHostOverride";
pub const RECONFIGURE_PATH: &str = "/api/unbound/service/reconfigure";

pub const CREATE_OK: &str = "saved";
pub const DELETE_OK: &str = "deleted";
pub const RECONFIGURE_OK: &str = "";

/// Body the OPNsense write endpoints expect: a JSON string containing `{}`.
const EMPTY_JSON: &str = r#""{}""#;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin transport to the OPNsense Unbound API. One call, one request.
#[derive(Clone)]
pub struct OpnsenseClient {
    http: Client,
    base_url: String, // e.g. "https://10.0.0.1"
    auth: String,
}

impl std::fmt::Debug for OpnsenseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpnsenseClient")
            .field("base_url", &self.base_url)
            .field("auth", &"<REDACTED>")
            .finish()
    }
}

impl OpnsenseClient {
    pub fn new(
        base_url: impl Into<String>,
        creds: &str,
        timeout: Duration,
    ) -> Result<Self, UnboundError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url, creds))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, creds: &str) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth: basic_auth_header(creds),
        }
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(header::AUTHORIZATION, &self.auth)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// List every host override.
    pub async fn search_overrides(&self) -> Result<Vec<HostOverride>, UnboundError> {
        let url = self.url(SEARCH_OVERRIDES_PATH);
        info!(%url, "records request");

        let res = self.auth_header(self.http.get(&url)).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(UnboundError::request_failed(format!("status {status}")));
        }

        let body = res.text().await?;
        debug!(%status, %body, "received response from opnsense");

        let search: SearchHostResponse = serde_json::from_str(&body)
            .map_err(|e| UnboundError::decode_failed(format!("unmarshal response: {e}")))?;
        Ok(search.rows)
    }

    pub async fn add_override(&self, host: &HostOverride) -> Result<(), UnboundError> {
        let body = AddOverrideRequest { host: host.clone() };
        debug!(dns_name = %host.dns_name(), server = %host.server, "creating override");

        let res = self
            .auth_header(self.http.post(self.url(ADD_OVERRIDE_PATH)))
            .json(&body)
            .send()
            .await?;
        check_operation(res, ADD_OVERRIDE_PATH, CREATE_OK).await
    }

    pub async fn del_override(&self, uuid: &str) -> Result<(), UnboundError> {
        let path = format!("{}/{}", DEL_OVERRIDE_PATH, uuid);
        let url = self.url(&path);
        info!(%url, "delete override request");

        let res = self.post_empty(&url).await?;
        check_operation(res, DEL_OVERRIDE_PATH, DELETE_OK).await
    }

    /// Same call as the "Apply" button in the OPNsense UI: staged edits go live.
    pub async fn reconfigure(&self) -> Result<(), UnboundError> {
        let res = self.post_empty(&self.url(RECONFIGURE_PATH)).await?;
        check_operation(res, RECONFIGURE_PATH, RECONFIGURE_OK).await
    }

    async fn post_empty(&self, url: &str) -> Result<Response, UnboundError> {
        Ok(self
            .auth_header(self.http.post(url))
            .header(header::CONTENT_TYPE, "application/json")
            .body(EMPTY_JSON)
            .send()
            .await?)
    }
}

/// A write only counts when the status is 2xx and `result` is `want`.
async fn check_operation(res: Response, endpoint: &str, want: &str) -> Result<(), UnboundError> {
    let status = res.status();
    let body = match res.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(endpoint, error = %e, "failed to read response body");
            String::new()
        }
    };
    info!(endpoint, %body, "response");

    if !status.is_success() {
        warn!(%status, endpoint, "response status not OK");
        return Err(UnboundError::request_failed(format!("response status: {status}")));
    }

    match serde_json::from_str::<OperationResponse>(&body) {
        Ok(op) if op.result == want => Ok(()),
        Ok(op) => {
            warn!(result = %op.result, endpoint, "operation was not a success");
            Err(UnboundError::request_failed(format!("response {:?}", op.result)))
        }
        Err(e) => {
            warn!(error = %e, endpoint, "operation was not a success");
            Err(UnboundError::request_failed(format!(
                "unreadable operation response: {e}"
            )))
        }
    }
}
