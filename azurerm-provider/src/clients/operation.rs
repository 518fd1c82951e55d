//! ARM long-running operation polling
//!
//! Implements [`OperationPoller`] over the three ARM polling patterns:
//! `Azure-AsyncOperation` status documents, `Location` polling and
//! `provisioningState` polling on the resource itself.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::clients::arm::{ArmClient, Conditions};
use crate::clients::models::{CloudErrorBody, OperationStatus, ProvisioningProbe, StatusKind};
use crate::error::{ProviderError, Result};
use crate::http_client::{HttpResponse, HttpUtils};
use crate::lro::{OperationMethod, OperationPoller, OperationToken, PollStatus, PollingStrategy};
use crate::traits::ErrorContext;

impl From<OperationMethod> for Method {
    fn from(method: OperationMethod) -> Self {
        match method {
            OperationMethod::Put => Self::PUT,
            OperationMethod::Patch => Self::PATCH,
            OperationMethod::Post => Self::POST,
            OperationMethod::Delete => Self::DELETE,
        }
    }
}

/// Picks the polling strategy for an accepted initial response.
///
/// `Ok(None)` means the response already carries the final result.
pub(crate) fn initial_strategy(
    service: &str,
    method: OperationMethod,
    response: &HttpResponse,
) -> Result<Option<PollingStrategy>> {
    let headers = &response.headers;

    if let Some(status_url) = &headers.azure_async_operation {
        return Ok(Some(PollingStrategy::AsyncOperation {
            status_url: status_url.clone(),
            location: headers.location.clone(),
        }));
    }

    if response.status == 202 {
        return match &headers.location {
            Some(url) => Ok(Some(PollingStrategy::Location { url: url.clone() })),
            None => Err(ProviderError::ParseError {
                service: service.to_string(),
                detail: format!(
                    "{} returned 202 Accepted without Azure-AsyncOperation or Location header",
                    method.as_str()
                ),
            }),
        };
    }

    if matches!(method, OperationMethod::Put | OperationMethod::Patch) {
        let state = serde_json::from_str::<ProvisioningProbe>(&response.body)
            .ok()
            .and_then(|probe| probe.state().map(StatusKind::of));
        if state == Some(StatusKind::InProgress) {
            return Ok(Some(PollingStrategy::ProvisioningState));
        }
    }

    Ok(None)
}

/// Polls ARM for one operation's status.
pub(crate) struct ArmOperationPoller<T> {
    client: ArmClient,
    service: &'static str,
    _result: PhantomData<fn() -> T>,
}

impl<T> ArmOperationPoller<T> {
    pub fn new(client: ArmClient, service: &'static str) -> Self {
        Self {
            client,
            service,
            _result: PhantomData,
        }
    }

    fn failed(
        &self,
        token: &OperationToken,
        status: &str,
        error: Option<CloudErrorBody>,
    ) -> ProviderError {
        let (raw_code, raw_message) = error.map_or((None, None), |e| (e.code, e.message));
        let err = ProviderError::OperationFailed {
            service: self.service.to_string(),
            operation: token.operation.clone(),
            status: status.to_string(),
            raw_code,
            raw_message,
        };
        log::error!("{err}");
        err
    }

    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.client
            .send(self.service, Method::GET, url, None, Conditions::NONE)
            .await
    }
}

impl<T: DeserializeOwned + Send + 'static> ArmOperationPoller<T> {
    /// 读取最终结果
    async fn final_result(&self, token: &OperationToken, location: Option<&str>) -> Result<T> {
        let url = match token.method {
            OperationMethod::Delete => return HttpUtils::parse_json("", self.service),
            OperationMethod::Put | OperationMethod::Patch => token.resource_url.as_str(),
            OperationMethod::Post => match location {
                Some(url) => url,
                None => return HttpUtils::parse_json("", self.service),
            },
        };
        self.client
            .get_json(self.service, url, ErrorContext::resource(token.resource_url.clone()))
            .await
    }

    async fn poll_async_operation(
        &self,
        token: &OperationToken,
        status_url: &str,
        location: Option<&str>,
    ) -> Result<PollStatus<T>> {
        let response = self.get(status_url).await?;
        let response = ArmClient::check(self.service, response, ErrorContext::default())?;
        let status: OperationStatus = HttpUtils::parse_json(&response.body, self.service)?;
        let Some(state) = status.status.as_deref() else {
            return Err(ProviderError::ParseError {
                service: self.service.to_string(),
                detail: "operation status document without 'status'".to_string(),
            });
        };

        match StatusKind::of(state) {
            StatusKind::Succeeded => Ok(PollStatus::Succeeded(
                self.final_result(token, location).await?,
            )),
            StatusKind::Failed => Err(self.failed(token, state, status.error)),
            StatusKind::InProgress => Ok(PollStatus::InProgress {
                retry_after: response.headers.retry_after,
            }),
        }
    }

    async fn poll_location(&self, token: &mut OperationToken) -> Result<PollStatus<T>> {
        let PollingStrategy::Location { url } = &token.strategy else {
            return Err(ProviderError::ParseError {
                service: self.service.to_string(),
                detail: "location polling without a Location URL".to_string(),
            });
        };
        let response = self.get(url).await?;

        if response.status == 202 {
            if let Some(next) = response.headers.location.clone() {
                token.strategy = PollingStrategy::Location { url: next };
            }
            return Ok(PollStatus::InProgress {
                retry_after: response.headers.retry_after,
            });
        }

        let response = ArmClient::check(
            self.service,
            response,
            ErrorContext::resource(token.resource_url.clone()),
        )?;
        let value = match token.method {
            OperationMethod::Delete => HttpUtils::parse_json("", self.service)?,
            OperationMethod::Put | OperationMethod::Patch if response.body.trim().is_empty() => {
                self.final_result(token, None).await?
            }
            _ => HttpUtils::parse_json(&response.body, self.service)?,
        };
        Ok(PollStatus::Succeeded(value))
    }

    async fn poll_provisioning_state(&self, token: &OperationToken) -> Result<PollStatus<T>> {
        let response = self.get(&token.resource_url).await?;
        let response = ArmClient::check(
            self.service,
            response,
            ErrorContext::resource(token.resource_url.clone()),
        )?;
        let probe: ProvisioningProbe = HttpUtils::parse_json(&response.body, self.service)?;

        match probe.state() {
            Some(state) if StatusKind::of(state) == StatusKind::InProgress => {
                Ok(PollStatus::InProgress {
                    retry_after: response.headers.retry_after,
                })
            }
            Some(state) if StatusKind::of(state) == StatusKind::Failed => {
                Err(self.failed(token, state, None))
            }
            _ => Ok(PollStatus::Succeeded(HttpUtils::parse_json(
                &response.body,
                self.service,
            )?)),
        }
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> OperationPoller<T> for ArmOperationPoller<T> {
    async fn poll(&self, token: &mut OperationToken) -> Result<PollStatus<T>> {
        log::debug!("[{}] Polling operation '{}'", self.service, token.operation);
        match token.strategy.clone() {
            PollingStrategy::AsyncOperation {
                status_url,
                location,
            } => {
                self.poll_async_operation(token, &status_url, location.as_deref())
                    .await
            }
            PollingStrategy::Location { .. } => self.poll_location(token).await,
            PollingStrategy::ProvisioningState => self.poll_provisioning_state(token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::test_server::{MockResponse, MockServer};
    use crate::http_client::PollingHeaders;
    use crate::lro::LongRunningOperation;
    use serde_json::{Value, json};

    fn response(status: u16, headers: PollingHeaders, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers,
            body: body.to_string(),
        }
    }

    #[test]
    fn async_operation_header_wins() {
        let headers = PollingHeaders {
            azure_async_operation: Some("https://arm/op".to_string()),
            location: Some("https://arm/loc".to_string()),
            retry_after: None,
        };
        let strategy = initial_strategy("dns", OperationMethod::Delete, &response(202, headers, ""));
        assert_eq!(
            strategy.ok().flatten(),
            Some(PollingStrategy::AsyncOperation {
                status_url: "https://arm/op".to_string(),
                location: Some("https://arm/loc".to_string()),
            })
        );
    }

    #[test]
    fn accepted_with_location() {
        let headers = PollingHeaders {
            location: Some("https://arm/loc".to_string()),
            ..PollingHeaders::default()
        };
        let strategy = initial_strategy("dns", OperationMethod::Delete, &response(202, headers, ""));
        assert_eq!(
            strategy.ok().flatten(),
            Some(PollingStrategy::Location {
                url: "https://arm/loc".to_string()
            })
        );
    }

    #[test]
    fn accepted_without_headers_is_an_error() {
        let strategy = initial_strategy(
            "dns",
            OperationMethod::Delete,
            &response(202, PollingHeaders::default(), ""),
        );
        assert!(matches!(strategy, Err(ProviderError::ParseError { .. })));
    }

    #[test]
    fn put_with_pending_provisioning_state_polls_resource() {
        let body = r#"{"name":"alias","properties":{"provisioningState":"Accepted"}}"#;
        let strategy = initial_strategy(
            "subscription",
            OperationMethod::Put,
            &response(201, PollingHeaders::default(), body),
        );
        assert_eq!(
            strategy.ok().flatten(),
            Some(PollingStrategy::ProvisioningState)
        );
    }

    #[test]
    fn completed_responses_need_no_polling() {
        let body = r#"{"name":"alias","properties":{"provisioningState":"Succeeded"}}"#;
        let put = initial_strategy(
            "subscription",
            OperationMethod::Put,
            &response(200, PollingHeaders::default(), body),
        );
        assert!(matches!(put, Ok(None)));

        let delete = initial_strategy(
            "dns",
            OperationMethod::Delete,
            &response(204, PollingHeaders::default(), ""),
        );
        assert!(matches!(delete, Ok(None)));
    }

    #[test]
    fn method_conversion() {
        assert_eq!(Method::from(OperationMethod::Patch), Method::PATCH);
        assert_eq!(Method::from(OperationMethod::Delete), Method::DELETE);
    }

    // ============ 针对本地服务器的轮询流程 ============

    const ZONE_PATH: &str =
        "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Network/dnsZones/example.com";

    async fn begin(
        client: &ArmClient,
        method: OperationMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<LongRunningOperation<Value>> {
        let url = client.url(path, "2018-05-01", &[]);
        client
            .begin::<Value, Value>(
                "dns",
                "zones.test",
                method,
                &url,
                body,
                Conditions::NONE,
                ErrorContext::resource("example.com"),
            )
            .await
    }

    #[cfg(feature = "dns")]
    #[tokio::test]
    async fn location_polling_until_final_response() {
        let server = MockServer::start(|base| {
            vec![
                MockResponse::new(202).header("Location", format!("{base}/operations/1")),
                MockResponse::new(202).header("Retry-After", "0"),
                MockResponse::new(200),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let operation = client.zones().delete("rg", "example.com", None).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        assert!(!operation.is_done());

        let result = operation.wait().await;
        assert!(result.is_ok(), "unexpected: {result:?}");
        assert_eq!(
            server.lines(),
            vec![
                format!("DELETE {ZONE_PATH}"),
                "GET /operations/1".to_string(),
                "GET /operations/1".to_string(),
            ]
        );
    }

    #[cfg(feature = "dns")]
    #[tokio::test]
    async fn failed_async_operation_carries_error_code() {
        let server = MockServer::start(|base| {
            vec![
                MockResponse::new(202)
                    .header("Azure-AsyncOperation", format!("{base}/status/1")),
                MockResponse::json(200, json!({ "status": "InProgress" })),
                MockResponse::json(
                    200,
                    json!({
                        "status": "Failed",
                        "error": { "code": "Conflict", "message": "zone is busy" }
                    }),
                ),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let operation = client.zones().delete("rg", "example.com", None).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        let result = operation.wait().await;
        assert!(
            matches!(
                &result,
                Err(ProviderError::OperationFailed { status, raw_code: Some(code), .. })
                    if status == "Failed" && code == "Conflict"
            ),
            "unexpected: {result:?}"
        );
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn error_from_status_endpoint_stops_polling() {
        let server = MockServer::start(|base| {
            vec![
                MockResponse::new(202)
                    .header("Azure-AsyncOperation", format!("{base}/status/1")),
                MockResponse::json(
                    500,
                    json!({ "error": { "code": "InternalServerError", "message": "boom" } }),
                ),
                MockResponse::json(200, json!({ "status": "Succeeded" })),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let operation = begin(&client, OperationMethod::Delete, ZONE_PATH, None).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        let result = operation.wait().await;
        assert!(
            matches!(result, Err(ProviderError::Unknown { status: Some(500), .. })),
            "unexpected: {result:?}"
        );
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn put_reads_resource_after_async_operation() {
        let server = MockServer::start(|base| {
            vec![
                MockResponse::json(
                    201,
                    json!({ "name": "example.com", "properties": { "provisioningState": "Creating" } }),
                )
                .header("Azure-AsyncOperation", format!("{base}/status/1")),
                MockResponse::json(200, json!({ "status": "Succeeded" })),
                MockResponse::json(
                    200,
                    json!({ "name": "example.com", "properties": { "provisioningState": "Succeeded" } }),
                ),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let body = json!({ "location": "global" });
        let operation = begin(&client, OperationMethod::Put, ZONE_PATH, Some(&body)).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        let result = operation.wait().await;
        assert!(result.is_ok(), "unexpected: {result:?}");
        let Ok(zone) = result else { return };
        assert_eq!(
            zone["properties"]["provisioningState"].as_str(),
            Some("Succeeded")
        );

        let requests = server.requests();
        assert_eq!(
            server.lines(),
            vec![
                format!("PUT {ZONE_PATH}"),
                "GET /status/1".to_string(),
                format!("GET {ZONE_PATH}"),
            ]
        );
        assert!(requests[0].body.contains("global"));
    }

    #[tokio::test]
    async fn post_reads_result_from_location() {
        let server = MockServer::start(|base| {
            vec![
                MockResponse::new(202)
                    .header("Azure-AsyncOperation", format!("{base}/status/1"))
                    .header("Location", format!("{base}/results/1")),
                MockResponse::json(200, json!({ "status": "Succeeded" })),
                MockResponse::json(200, json!({ "value": "sub-9" })),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let operation = begin(&client, OperationMethod::Post, "/actions/run", None).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        let result = operation.wait().await;
        assert!(
            matches!(&result, Ok(value) if value["value"] == "sub-9"),
            "unexpected: {result:?}"
        );
        assert_eq!(
            server.lines(),
            vec![
                "POST /actions/run".to_string(),
                "GET /status/1".to_string(),
                "GET /results/1".to_string(),
            ]
        );
    }

    #[cfg(feature = "dns")]
    #[tokio::test]
    async fn delete_completes_without_final_read() {
        let server = MockServer::start(|base| {
            vec![
                MockResponse::new(202)
                    .header("Azure-AsyncOperation", format!("{base}/status/1"))
                    .header("Location", format!("{base}/results/1")),
                MockResponse::json(200, json!({ "status": "Succeeded" })),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let operation = client.zones().delete("rg", "example.com", None).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        let result = operation.wait().await;
        assert!(result.is_ok(), "unexpected: {result:?}");
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn provisioning_state_polls_resource() {
        let server = MockServer::start(|_| {
            vec![
                MockResponse::json(
                    201,
                    json!({ "name": "dev", "properties": { "provisioningState": "Accepted" } }),
                ),
                MockResponse::json(
                    200,
                    json!({ "name": "dev", "properties": { "provisioningState": "Running" } }),
                ),
                MockResponse::json(
                    200,
                    json!({
                        "name": "dev",
                        "properties": { "provisioningState": "Succeeded", "subscriptionId": "sub-9" }
                    }),
                ),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let path = "/providers/Microsoft.Subscription/aliases/dev";
        let body = json!({ "properties": { "workload": "Production" } });
        let operation = begin(&client, OperationMethod::Put, path, Some(&body)).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        let result = operation.wait().await;
        assert!(
            matches!(&result, Ok(alias) if alias["properties"]["subscriptionId"] == "sub-9"),
            "unexpected: {result:?}"
        );
        assert_eq!(
            server.lines(),
            vec![
                format!("PUT {path}"),
                format!("GET {path}"),
                format!("GET {path}"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_provisioning_state_is_an_operation_failure() {
        let server = MockServer::start(|_| {
            vec![
                MockResponse::json(
                    201,
                    json!({ "name": "dev", "properties": { "provisioningState": "Accepted" } }),
                ),
                MockResponse::json(
                    200,
                    json!({ "name": "dev", "properties": { "provisioningState": "Failed" } }),
                ),
            ]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let path = "/providers/Microsoft.Subscription/aliases/dev";
        let operation = begin(&client, OperationMethod::Put, path, Some(&json!({}))).await;
        assert!(operation.is_ok(), "unexpected: {operation:?}");
        let Ok(operation) = operation else { return };
        let result = operation.wait().await;
        assert!(
            matches!(&result, Err(ProviderError::OperationFailed { status, .. }) if status == "Failed"),
            "unexpected: {result:?}"
        );
    }

    #[tokio::test]
    async fn resumed_operation_continues_from_token() {
        let server = MockServer::start(|_| {
            vec![MockResponse::json(200, json!({ "status": "Succeeded" }))]
        })
        .await;
        let Some(server) = server else { return };
        let Some(client) = server.client() else { return };

        let token = OperationToken {
            operation: "zones.delete".to_string(),
            method: OperationMethod::Delete,
            resource_url: client.url(ZONE_PATH, "2018-05-01", &[]),
            strategy: PollingStrategy::AsyncOperation {
                status_url: format!("{}/status/7", server.url()),
                location: None,
            },
        };
        let result = client.resume_operation::<()>("dns", token, None).wait().await;
        assert!(result.is_ok(), "unexpected: {result:?}");
        assert_eq!(server.lines(), vec!["GET /status/7".to_string()]);
    }
}
