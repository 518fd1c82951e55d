//! ARM 错误映射

use crate::clients::models::{CloudError, CloudErrorBody};
use crate::error::ProviderError;
use crate::http_client::HttpResponse;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};
use crate::utils::log_sanitizer::truncate_for_log;

/// 配额相关错误码
const QUOTA_CODES: &[&str] = &[
    "QuotaExceeded",
    "QuotaExceededForResource",
    "SubscriptionQuotaExceeded",
    "MaxNumberOfRecordSetsExceeded",
    "MaxNumberOfZonesExceeded",
];

/// 锁定/策略类错误码（409 但并非资源已存在）
const DENIED_CONFLICT_CODES: &[&str] = &["ScopeLocked", "RequestDisallowedByPolicy"];

/// 仅携带服务名的错误映射器
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArmErrorMapper {
    service: &'static str,
}

impl ArmErrorMapper {
    pub const fn new(service: &'static str) -> Self {
        Self { service }
    }
}

impl ProviderErrorMapper for ArmErrorMapper {
    fn service_name(&self) -> &'static str {
        self.service
    }
}

/// 从非 2xx 响应中提取原始错误
///
/// 支持 `{"error":{...}}` 信封和部分服务直接返回的 `{"code","message"}`。
pub(crate) fn raw_error(response: &HttpResponse) -> RawApiError {
    let body = serde_json::from_str::<CloudError>(&response.body)
        .ok()
        .and_then(|e| e.error)
        .or_else(|| {
            serde_json::from_str::<CloudErrorBody>(&response.body)
                .ok()
                .filter(|b| b.code.is_some() || b.message.is_some())
        });

    match body {
        Some(body) => RawApiError {
            status: response.status,
            message: body
                .message
                .unwrap_or_else(|| format!("HTTP {}", response.status)),
            code: body.code,
            target: body.target,
        },
        None if response.body.trim().is_empty() => {
            RawApiError::new(response.status, format!("HTTP {}", response.status))
        }
        None => RawApiError::new(response.status, truncate_for_log(&response.body)),
    }
}

/// 按 HTTP 状态码与 ARM 错误码映射到统一错误类型
pub(crate) fn map_arm_error(
    service: &str,
    raw: RawApiError,
    context: ErrorContext,
) -> ProviderError {
    let service = service.to_string();
    let code = raw.code.as_deref().unwrap_or_default();
    let resource_id = || {
        context
            .resource_id
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string())
    };

    if QUOTA_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)) {
        return ProviderError::QuotaExceeded {
            service,
            raw_message: Some(raw.message),
        };
    }

    match raw.status {
        401 => ProviderError::InvalidCredentials {
            service,
            raw_message: Some(raw.message),
        },
        403 => ProviderError::PermissionDenied {
            service,
            raw_message: Some(raw.message),
        },
        404 => ProviderError::ResourceNotFound {
            service,
            resource_id: resource_id(),
            raw_message: Some(raw.message),
        },
        409 if DENIED_CONFLICT_CODES.iter().any(|c| c.eq_ignore_ascii_case(code)) => {
            ProviderError::PermissionDenied {
                service,
                raw_message: Some(raw.message),
            }
        }
        409 => ProviderError::ResourceExists {
            service,
            resource_id: resource_id(),
            raw_message: Some(raw.message),
        },
        412 => ProviderError::PreconditionFailed {
            service,
            resource_id: resource_id(),
            raw_message: Some(raw.message),
        },
        400 => ProviderError::InvalidParameter {
            service,
            param: raw.target.unwrap_or_else(|| "request".to_string()),
            detail: match raw.code {
                Some(code) => format!("{code}: {}", raw.message),
                None => raw.message,
            },
        },
        status => ProviderError::Unknown {
            service,
            status: Some(status),
            raw_code: raw.code,
            raw_message: raw.message,
        },
    }
}
