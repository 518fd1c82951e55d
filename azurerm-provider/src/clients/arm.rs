//! ARM HTTP 请求方法
//!
//! [`ArmClient`] is shared by every service client: it owns the HTTP client,
//! the credential and the endpoint, and provides the request, pagination and
//! long-running-operation helpers they are built on.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::clients::error::{ArmErrorMapper, raw_error};
use crate::clients::operation::{ArmOperationPoller, initial_strategy};
use crate::credentials::credential_from_config;
use crate::error::{ProviderError, Result};
use crate::http_client::{HttpResponse, HttpUtils};
use crate::lro::{LongRunningOperation, OperationMethod, OperationToken, PollOptions};
use crate::pager::{Page, Pager};
use crate::traits::{ErrorContext, ProviderErrorMapper, TokenCredential};
use crate::types::{DEFAULT_RESOURCE_MANAGER_ENDPOINT, ProviderConfig};

const USER_AGENT: &str = concat!("azurerm-provider/", env!("CARGO_PKG_VERSION"));
const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

/// Conditional request headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Conditions<'a> {
    /// `If-Match`: ETag of the last-seen version, or `*`.
    pub if_match: Option<&'a str>,
    /// `If-None-Match`: `*` to refuse overwriting an existing resource.
    pub if_none_match: Option<&'a str>,
}

impl<'a> Conditions<'a> {
    pub const NONE: Self = Self {
        if_match: None,
        if_none_match: None,
    };

    pub const fn if_match(etag: &'a str) -> Self {
        Self {
            if_match: Some(etag),
            if_none_match: None,
        }
    }

    pub const fn if_none_match(etag: &'a str) -> Self {
        Self {
            if_match: None,
            if_none_match: Some(etag),
        }
    }
}

/// Azure Resource Manager client
#[derive(Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: String,
    subscription_id: String,
    credential: Arc<dyn TokenCredential>,
    scope: String,
    poll_options: PollOptions,
    user_agent: String,
}

impl fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmClient")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("poll_options", &self.poll_options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ArmClient`].
pub struct ArmClientBuilder {
    subscription_id: String,
    endpoint: String,
    credential: Option<Arc<dyn TokenCredential>>,
    http: Option<Client>,
    poll_options: PollOptions,
    user_agent: String,
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl ArmClientBuilder {
    fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            endpoint: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
            credential: None,
            http: None,
            poll_options: PollOptions::default(),
            user_agent: USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// ARM endpoint (sovereign clouds, test servers).
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Use an existing HTTP client; the timeouts below are then ignored.
    #[must_use]
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    #[must_use]
    pub fn poll_options(mut self, options: PollOptions) -> Self {
        self.poll_options = options;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ArmClient> {
        let credential = self.credential.ok_or_else(|| ProviderError::InvalidParameter {
            service: "config".to_string(),
            param: "credential".to_string(),
            detail: "a token credential is required".to_string(),
        })?;

        let http = match self.http {
            Some(client) => client,
            None => build_http_client(self.request_timeout, self.connect_timeout)?,
        };

        Ok(ArmClient {
            http,
            scope: format!("{}/.default", self.endpoint),
            endpoint: self.endpoint,
            subscription_id: self.subscription_id,
            credential,
            poll_options: self.poll_options,
            user_agent: self.user_agent,
        })
    }
}

fn build_http_client(request_timeout: Duration, connect_timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| ProviderError::NetworkError {
            service: "config".to_string(),
            detail: format!("Failed to build HTTP client: {e}"),
        })
}

impl ArmClient {
    pub fn builder(subscription_id: impl Into<String>) -> ArmClientBuilder {
        ArmClientBuilder::new(subscription_id)
    }

    /// Builds a client (and its credential) from a provider configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let http = build_http_client(
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        )?;
        let credential = credential_from_config(config, &http);

        Self::builder(config.subscription_id.clone())
            .endpoint(config.resource_manager_endpoint.clone())
            .http_client(http)
            .credential(credential)
            .poll_options(config.poll)
            .build()
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn poll_options(&self) -> PollOptions {
        self.poll_options
    }

    /// `{endpoint}{path}?api-version={version}&{query}`
    pub(crate) fn url(&self, path: &str, api_version: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}{path}?api-version={api_version}", self.endpoint);
        for (key, value) in query {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// 发送请求（附带令牌、请求 ID 与条件头）
    pub(crate) async fn send(
        &self,
        service: &'static str,
        method: Method,
        url: &str,
        body: Option<String>,
        conditions: Conditions<'_>,
    ) -> Result<HttpResponse> {
        let token = self.credential.get_token(&self.scope).await?;
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&token.token)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(CLIENT_REQUEST_ID, &request_id);

        if let Some(etag) = conditions.if_match {
            request = request.header(reqwest::header::IF_MATCH, etag);
        }
        if let Some(etag) = conditions.if_none_match {
            request = request.header(reqwest::header::IF_NONE_MATCH, etag);
        }
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        log::debug!("[{service}] {CLIENT_REQUEST_ID}: {request_id}");
        HttpUtils::execute_request(request, service, method.as_str(), url).await
    }

    /// 非 2xx 响应映射为错误
    pub(crate) fn check(
        service: &'static str,
        response: HttpResponse,
        context: ErrorContext,
    ) -> Result<HttpResponse> {
        if response.is_success() {
            return Ok(response);
        }
        let err = ArmErrorMapper::new(service).map_error(raw_error(&response), context);
        if err.is_expected() {
            log::warn!("{err}");
        } else {
            log::error!("{err}");
        }
        Err(err)
    }

    /// 发送请求并解析 JSON 响应
    pub(crate) async fn send_json<T, B>(
        &self,
        service: &'static str,
        method: Method,
        url: &str,
        body: Option<&B>,
        conditions: Conditions<'_>,
        context: ErrorContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body.map(|b| HttpUtils::to_json(b, service)).transpose()?;
        let response = self.send(service, method, url, body, conditions).await?;
        let response = Self::check(service, response, context)?;
        HttpUtils::parse_json(&response.body, service)
    }

    /// 执行 GET 请求
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        context: ErrorContext,
    ) -> Result<T> {
        self.send_json::<T, ()>(service, Method::GET, url, None, Conditions::NONE, context)
            .await
    }

    /// Fetches the first page eagerly and returns a cursor over the rest.
    pub(crate) async fn pager<T>(
        &self,
        service: &'static str,
        url: &str,
        context: ErrorContext,
    ) -> Result<Pager<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let first: Page<T> = self.get_json(service, url, context.clone()).await?;
        let client = self.clone();
        Ok(Pager::new(first, move |next_link: String| {
            let client = client.clone();
            let context = context.clone();
            async move { client.get_json(service, &next_link, context).await }.boxed()
        }))
    }

    /// Sends the initiating request of a long-running operation.
    ///
    /// A response that already carries the final result yields a done
    /// handle; otherwise the handle polls according to the response headers.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn begin<T, B>(
        &self,
        service: &'static str,
        operation: &str,
        method: OperationMethod,
        url: &str,
        body: Option<&B>,
        conditions: Conditions<'_>,
        context: ErrorContext,
    ) -> Result<LongRunningOperation<T>>
    where
        T: DeserializeOwned + Send + 'static,
        B: Serialize + ?Sized,
    {
        let body = body.map(|b| HttpUtils::to_json(b, service)).transpose()?;
        let response = self
            .send(service, method.into(), url, body, conditions)
            .await?;
        let response = Self::check(service, response, context)?;

        let Some(strategy) = initial_strategy(service, method, &response)? else {
            let value = match method {
                OperationMethod::Delete => HttpUtils::parse_json("", service)?,
                _ => HttpUtils::parse_json(&response.body, service)?,
            };
            return Ok(LongRunningOperation::done(service, operation, value));
        };

        log::debug!(
            "[{service}] Operation '{operation}' accepted (HTTP {}), polling via {strategy:?}",
            response.status
        );
        let token = OperationToken {
            operation: operation.to_string(),
            method,
            resource_url: url.to_string(),
            strategy,
        };
        Ok(self.resume_operation(service, token, response.headers.retry_after))
    }

    /// Resumes polling a pending operation from a saved token.
    pub fn resume_operation<T>(
        &self,
        service: &'static str,
        token: OperationToken,
        retry_after: Option<Duration>,
    ) -> LongRunningOperation<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let poller = Arc::new(ArmOperationPoller::<T>::new(self.clone(), service));
        LongRunningOperation::pending(service, token, retry_after, poller, self.poll_options)
    }

    /// Client for DNS zones.
    #[cfg(feature = "dns")]
    pub fn zones(&self) -> crate::clients::dns::ZonesClient {
        crate::clients::dns::ZonesClient::new(self.clone())
    }

    /// Client for DNS record sets.
    #[cfg(feature = "dns")]
    pub fn record_sets(&self) -> crate::clients::dns::RecordSetsClient {
        crate::clients::dns::RecordSetsClient::new(self.clone())
    }

    /// Client for DNS resource references.
    #[cfg(feature = "dns")]
    pub fn dns_resource_reference(&self) -> crate::clients::dns::ResourceReferenceClient {
        crate::clients::dns::ResourceReferenceClient::new(self.clone())
    }

    /// Client for subscriptions and subscription aliases.
    #[cfg(feature = "subscription")]
    pub fn subscriptions(&self) -> crate::clients::subscription::SubscriptionClient {
        crate::clients::subscription::SubscriptionClient::new(self.clone())
    }

    /// Client for tags at an arbitrary scope.
    #[cfg(feature = "subscription")]
    pub fn tags(&self) -> crate::clients::subscription::TagsClient {
        crate::clients::subscription::TagsClient::new(self.clone())
    }
}
