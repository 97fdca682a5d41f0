//! HTTP client for the `Microsoft.Web` management API.
//!
//! Each call is a single request/response; slow writes are followed to
//! completion through their long-running operation. There is no retry.

use crate::api::WebAppsApi;
use crate::lro::{self, OperationState, PollTarget};
use crate::models::{
    CloudError, ConnectionStringDictionary, OperationStatus, ResourceNameAvailability,
    ResourceNameAvailabilityRequest, Site, SiteConfigResource, StringDictionary,
};
use crate::paths;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;
use uuid::Uuid;

/// Public Azure Resource Manager endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// API version of the `Microsoft.Web` operations used here.
pub const DEFAULT_API_VERSION: &str = "2016-09-01";

/// Header correlating a request with server-side logs.
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// ARM client configuration.
#[derive(Clone)]
pub struct ArmClientConfig {
    /// Management endpoint (e.g., <https://management.azure.com>)
    pub endpoint: String,
    /// Subscription all calls are scoped to
    pub subscription_id: String,
    /// `api-version` query parameter
    pub api_version: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Bearer token for the management API
    pub bearer_token: Option<String>,
    /// Delay between polls when the server sends no `Retry-After`
    pub poll_interval: Duration,
    /// Upper bound on waiting for a long-running operation
    pub operation_timeout: Duration,
    /// Custom CA certificate path for private endpoints (PEM format)
    pub ca_cert_path: Option<PathBuf>,
}

impl Default for ArmClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(60),
            bearer_token: None,
            poll_interval: Duration::from_secs(10),
            operation_timeout: Duration::from_secs(30 * 60),
            ca_cert_path: None,
        }
    }
}

impl fmt::Debug for ArmClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmClientConfig")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("poll_interval", &self.poll_interval)
            .field("operation_timeout", &self.operation_timeout)
            .field("ca_cert_path", &self.ca_cert_path)
            .finish()
    }
}

/// HTTP client for App Service site operations.
pub struct ArmClient {
    client: Client,
    endpoint: Url,
    config: ArmClientConfig,
}

impl ArmClient {
    /// Create a new ARM client.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not a URL, the subscription is
    /// missing, the HTTP client cannot be created, or the CA certificate
    /// cannot be read or parsed.
    pub fn new(config: ArmClientConfig) -> Result<Self, ClientError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ClientError::Init(format!("invalid endpoint {}: {e}", config.endpoint)))?;

        if config.subscription_id.trim().is_empty() {
            return Err(ClientError::Init("subscription ID is required".to_string()));
        }

        let mut builder = Client::builder().timeout(config.timeout);

        if endpoint.scheme() == "https" {
            builder = builder.use_rustls_tls();

            if let Some(ca_path) = &config.ca_cert_path {
                let ca_cert = fs::read(ca_path).map_err(|e| {
                    ClientError::Init(format!(
                        "failed to read CA certificate {}: {e}",
                        ca_path.display()
                    ))
                })?;
                let cert = reqwest::Certificate::from_pem(&ca_cert).map_err(|e| {
                    ClientError::Init(format!("failed to parse CA certificate: {e}"))
                })?;
                builder = builder.add_root_certificate(cert);
                tracing::debug!(ca_path = %ca_path.display(), "Loaded custom CA certificate");
            }
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ArmClientConfig {
        &self.config
    }

    fn subscription(&self) -> &str {
        &self.config.subscription_id
    }

    /// Resolve a management path with `api-version` and extra query pairs.
    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ClientError> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| ClientError::Request(format!("invalid request path {path}: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-version", &self.config.api_version);
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Build a request carrying auth and a fresh client request ID.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        tracing::debug!(%method, %url, %request_id, "ARM request");

        let mut request = self
            .client
            .request(method, url)
            .header(CLIENT_REQUEST_ID_HEADER, request_id.to_string());

        if let Some(token) = &self.config.bearer_token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        request
    }

    /// Send a request and turn non-2xx answers into [`ClientError::ApiError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(api_error(response).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path, &[])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        parse_json(response).await
    }

    async fn post_list<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path, &[])?;
        let request = self.request(Method::POST, url).header(CONTENT_LENGTH, "0");
        let response = self.send(request).await?;
        parse_json(response).await
    }

    async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        let response = self.send(self.request(Method::PUT, url).json(body)).await?;
        parse_json(response).await
    }

    /// Poll a long-running operation until it reaches a terminal state.
    async fn wait_for_completion(
        &self,
        target: PollTarget,
        first_delay: Option<Duration>,
    ) -> Result<(), ClientError> {
        let timeout = self.config.operation_timeout;
        let deadline = Instant::now().checked_add(timeout);
        let mut delay = first_delay.unwrap_or(self.config.poll_interval);

        tracing::debug!(url = %target.url(), "Waiting for long-running operation");

        loop {
            // Retry-After is server controlled and may exceed any representable instant.
            let remaining = deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()));
            if remaining.is_some_and(|remaining| delay > remaining) {
                return Err(ClientError::OperationTimeout(timeout));
            }
            tokio::time::sleep(delay).await;

            let response = self
                .send(self.request(Method::GET, target.url().clone()))
                .await?;
            let next_delay = lro::retry_after(response.headers());

            let state = match &target {
                PollTarget::AsyncOperation(_) => {
                    let body: OperationStatus = parse_json(response).await?;
                    OperationState::from_status(&body)
                }
                PollTarget::Location(_) => {
                    OperationState::from_location_status(response.status().as_u16())
                }
            };

            tracing::debug!(url = %target.url(), ?state, "Polled long-running operation");

            match state {
                OperationState::InProgress => {}
                OperationState::Succeeded => return Ok(()),
                OperationState::Failed(message) => {
                    return Err(ClientError::OperationFailed(message));
                }
                OperationState::Canceled => {
                    return Err(ClientError::OperationFailed(
                        "operation was canceled".to_string(),
                    ));
                }
            }

            delay = next_delay.unwrap_or(self.config.poll_interval);
        }
    }
}

#[async_trait]
impl WebAppsApi for ArmClient {
    async fn check_name_availability(
        &self,
        name: &str,
    ) -> Result<ResourceNameAvailability, ClientError> {
        let url = self.url(&paths::name_availability(self.subscription()), &[])?;
        let body = ResourceNameAvailabilityRequest::site(name);

        tracing::debug!(name, "Checking site name availability");

        let response = self
            .send(self.request(Method::POST, url).json(&body))
            .await?;
        parse_json(response).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        site: &Site,
    ) -> Result<Site, ClientError> {
        let path = paths::site(self.subscription(), resource_group, name);
        let url = self.url(&path, &[])?;
        let response = self.send(self.request(Method::PUT, url).json(site)).await?;

        let status = response.status().as_u16();
        match PollTarget::from_response(status, response.headers()) {
            Some(target) => {
                let first_delay = lro::retry_after(response.headers());
                self.wait_for_completion(target, first_delay).await?;
                self.get(resource_group, name).await
            }
            None => parse_json(response).await,
        }
    }

    async fn get(&self, resource_group: &str, name: &str) -> Result<Site, ClientError> {
        self.get_json(&paths::site(self.subscription(), resource_group, name))
            .await
    }

    async fn delete(
        &self,
        resource_group: &str,
        name: &str,
        delete_metrics: bool,
        delete_empty_server_farm: bool,
    ) -> Result<(), ClientError> {
        let path = paths::site(self.subscription(), resource_group, name);
        let url = self.url(
            &path,
            &[
                ("deleteMetrics", delete_metrics.to_string()),
                ("deleteEmptyServerFarm", delete_empty_server_farm.to_string()),
            ],
        )?;

        let response = self.send(self.request(Method::DELETE, url)).await?;

        let status = response.status().as_u16();
        if let Some(target) = PollTarget::from_response(status, response.headers()) {
            let first_delay = lro::retry_after(response.headers());
            self.wait_for_completion(target, first_delay).await?;
        }

        Ok(())
    }

    async fn list_application_settings(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<StringDictionary, ClientError> {
        self.post_list(&paths::site_config_list(
            self.subscription(),
            resource_group,
            name,
            "appsettings",
        ))
        .await
    }

    async fn update_application_settings(
        &self,
        resource_group: &str,
        name: &str,
        settings: &StringDictionary,
    ) -> Result<StringDictionary, ClientError> {
        let path = paths::site_config(self.subscription(), resource_group, name, "appsettings");
        self.put_json(&path, settings).await
    }

    async fn list_connection_strings(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<ConnectionStringDictionary, ClientError> {
        self.post_list(&paths::site_config_list(
            self.subscription(),
            resource_group,
            name,
            "connectionstrings",
        ))
        .await
    }

    async fn update_connection_strings(
        &self,
        resource_group: &str,
        name: &str,
        connection_strings: &ConnectionStringDictionary,
    ) -> Result<ConnectionStringDictionary, ClientError> {
        let path = paths::site_config(
            self.subscription(),
            resource_group,
            name,
            "connectionstrings",
        );
        self.put_json(&path, connection_strings).await
    }

    async fn get_configuration(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<SiteConfigResource, ClientError> {
        self.get_json(&paths::site_config(
            self.subscription(),
            resource_group,
            name,
            "web",
        ))
        .await
    }

    async fn update_configuration(
        &self,
        resource_group: &str,
        name: &str,
        config: &SiteConfigResource,
    ) -> Result<SiteConfigResource, ClientError> {
        let path = paths::site_config(self.subscription(), resource_group, name, "web");
        self.put_json(&path, config).await
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| ClientError::Request(e.to_string()))?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<CloudError>(&body)
        .ok()
        .and_then(|e| e.error)
    {
        Some(err) => ClientError::ApiError {
            status,
            code: err.code,
            message: err.message.unwrap_or(body),
        },
        None => ClientError::ApiError {
            status,
            code: None,
            message: body,
        },
    }
}

/// Errors that can occur with the ARM client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),
    /// HTTP request failed
    #[error("request error: {0}")]
    Request(String),
    /// API returned an error status
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// ARM error code, when the body carried one
        code: Option<String>,
        /// Error message from API
        message: String,
    },
    /// Response parsing failed
    #[error("parse error: {0}")]
    Parse(String),
    /// Long-running operation ended unsuccessfully
    #[error("long-running operation failed: {0}")]
    OperationFailed(String),
    /// Long-running operation did not finish in time
    #[error("long-running operation did not complete within {0:?}")]
    OperationTimeout(Duration),
}

impl ClientError {
    /// Whether the server answered `404 Not Found`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }
}
