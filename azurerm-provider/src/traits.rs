use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{ProviderError, Result};
use crate::types::{InstanceState, ResourceConfig, ResourceMetadata};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP 状态码
    pub status: u16,
    /// ARM 错误码（如 `ResourceNotFound`、`AuthorizationFailed`）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
    /// 出错的字段（ARM `error.target`）
    pub target: Option<String>,
}

impl RawApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
            target: None,
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 资源 ID 或名称（用于 `ResourceNotFound` / `ResourceExists` 等错误）
    pub resource_id: Option<String>,
}

impl ErrorContext {
    pub fn resource(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
        }
    }
}

/// ARM 错误映射 Trait（内部使用）
///
/// ARM 各服务的错误格式一致（`{"error":{"code","message"}}`），
/// 因此映射逻辑以默认实现提供，各客户端只需声明服务名。
pub(crate) trait ProviderErrorMapper {
    /// 返回服务标识符
    fn service_name(&self) -> &'static str;

    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> ProviderError {
        crate::clients::error::map_arm_error(self.service_name(), raw, context)
    }

    /// 快捷方法：参数错误
    fn invalid_parameter(&self, param: &str, detail: impl ToString) -> ProviderError {
        ProviderError::InvalidParameter {
            service: self.service_name().to_string(),
            param: param.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// An OAuth2 bearer token issued for the resource manager audience.
#[derive(Clone)]
pub struct AccessToken {
    /// The raw bearer token.
    pub token: String,
    /// When the token stops being valid, if known.
    pub expires_on: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"******")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for ARM requests.
///
/// The authentication layer is a black box to the clients: every request asks
/// the credential for a token for the `{endpoint}/.default` scope.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Returns a token valid for `scope`.
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// Lifecycle adapter for one resource type, driven by the host runtime.
///
/// The host owns planning and state persistence; an adapter only turns a
/// desired configuration into ARM calls and the observed resource back into a
/// flat [`InstanceState`].
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Resource type name (e.g. `"azurerm_dns_zone"`).
    fn type_name(&self) -> &'static str;

    /// Static schema of this resource type.
    fn metadata() -> ResourceMetadata
    where
        Self: Sized;

    /// Creates the resource.
    ///
    /// Fails with [`ProviderError::ResourceExists`] when the resource is already
    /// present; it has to be imported instead.
    async fn create(&self, config: &ResourceConfig) -> Result<InstanceState>;

    /// Reads the resource. `Ok(None)` means it no longer exists.
    async fn read(&self, id: &str) -> Result<Option<InstanceState>>;

    /// Applies an updated configuration to an existing resource.
    async fn update(&self, id: &str, config: &ResourceConfig) -> Result<InstanceState>;

    /// Deletes the resource. Deleting a resource that is already gone succeeds.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Imports an existing resource by ID.
    async fn import(&self, id: &str) -> Result<InstanceState> {
        self.read(id)
            .await?
            .ok_or_else(|| ProviderError::ResourceNotFound {
                service: self.type_name().to_string(),
                resource_id: id.to_string(),
                raw_message: None,
            })
    }

    /// Whether the resource exists.
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.read(id).await?.is_some())
    }
}
