use serde::{Deserialize, Serialize};

/// Unified error type for all Azure Resource Manager operations.
///
/// Each variant includes a `service` field identifying which ARM service produced
/// the error (`"dns"`, `"subscription"`, `"resources"`, `"auth"`, ...), plus
/// variant-specific context. All variants are serializable for structured error
/// reporting back to the host runtime.
///
/// # Retries
///
/// Nothing is retried automatically except the "operation not yet complete" loop of
/// a [`LongRunningOperation`](crate::LongRunningOperation). Every variant below is
/// returned to the caller as soon as it is observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Service that produced the error.
        service: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Service that produced the error.
        service: String,
        /// Error details.
        detail: String,
    },

    /// The credentials are invalid or expired (HTTP 401).
    InvalidCredentials {
        /// Service that produced the error.
        service: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The authenticated principal lacks permission for the operation (HTTP 403).
    PermissionDenied {
        /// Service that produced the error.
        service: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The addressed resource does not exist (HTTP 404).
    ResourceNotFound {
        /// Service that produced the error.
        service: String,
        /// Resource ID or name that was not found.
        resource_id: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The resource already exists and has to be imported instead of created.
    ResourceExists {
        /// Service that produced the error.
        service: String,
        /// Resource ID of the existing resource.
        resource_id: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// An `If-Match` / `If-None-Match` precondition failed (HTTP 412).
    PreconditionFailed {
        /// Service that produced the error.
        service: String,
        /// Resource ID the precondition was evaluated against.
        resource_id: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter is invalid (HTTP 400, bad TTL, malformed ID, ...).
    InvalidParameter {
        /// Service that produced the error.
        service: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The subscription's resource quota has been exceeded.
    QuotaExceeded {
        /// Service that produced the error.
        service: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The API rate limit has been exceeded (HTTP 429).
    RateLimited {
        /// Service that produced the error.
        service: String,
        /// Suggested wait time in seconds, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The server reported a terminal `Failed` / `Canceled` state for a
    /// long-running operation.
    OperationFailed {
        /// Service that produced the error.
        service: String,
        /// Operation name (e.g. `"zones.delete"`).
        operation: String,
        /// Terminal status reported by the server.
        status: String,
        /// Error code from the operation status document, if any.
        raw_code: Option<String>,
        /// Error message from the operation status document, if any.
        raw_message: Option<String>,
    },

    /// The result of a long-running operation was requested before it completed.
    OperationIncomplete {
        /// Service that produced the error.
        service: String,
        /// Operation name.
        operation: String,
    },

    /// A long-running operation did not complete within the polling bounds.
    OperationTimedOut {
        /// Service that produced the error.
        service: String,
        /// Operation name.
        operation: String,
        /// Number of status polls issued before giving up.
        attempts: u32,
    },

    /// The caller cancelled a blocking operation.
    Cancelled {
        /// Service that produced the error.
        service: String,
        /// Operation name.
        operation: String,
    },

    /// Failed to parse an API response.
    ParseError {
        /// Service that produced the error.
        service: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Service that produced the error.
        service: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized error from the API.
    ///
    /// This is a catch-all for error codes not mapped to a specific variant.
    Unknown {
        /// Service that produced the error.
        service: String,
        /// HTTP status code, if the error came from an HTTP response.
        status: Option<u16>,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::ResourceNotFound { .. }
                | Self::ResourceExists { .. }
                | Self::PreconditionFailed { .. }
                | Self::InvalidParameter { .. }
                | Self::QuotaExceeded { .. }
                | Self::Cancelled { .. }
        )
    }

    /// Whether this error means the addressed resource is gone.
    ///
    /// Resource adapters use this to turn a read of a deleted resource into
    /// "absent" instead of a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    /// Name of the service that produced this error.
    pub fn service(&self) -> &str {
        match self {
            Self::NetworkError { service, .. }
            | Self::Timeout { service, .. }
            | Self::InvalidCredentials { service, .. }
            | Self::PermissionDenied { service, .. }
            | Self::ResourceNotFound { service, .. }
            | Self::ResourceExists { service, .. }
            | Self::PreconditionFailed { service, .. }
            | Self::InvalidParameter { service, .. }
            | Self::QuotaExceeded { service, .. }
            | Self::RateLimited { service, .. }
            | Self::OperationFailed { service, .. }
            | Self::OperationIncomplete { service, .. }
            | Self::OperationTimedOut { service, .. }
            | Self::Cancelled { service, .. }
            | Self::ParseError { service, .. }
            | Self::SerializationError { service, .. }
            | Self::Unknown { service, .. } => service,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { service, detail } => {
                write!(f, "[{service}] Network error: {detail}")
            }
            Self::Timeout { service, detail } => {
                write!(f, "[{service}] Request timeout: {detail}")
            }
            Self::InvalidCredentials {
                service,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{service}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{service}] Invalid credentials")
                }
            }
            Self::PermissionDenied {
                service,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{service}] Permission denied: {msg}")
                } else {
                    write!(f, "[{service}] Permission denied")
                }
            }
            Self::ResourceNotFound {
                service,
                resource_id,
                ..
            } => {
                write!(f, "[{service}] Resource '{resource_id}' not found")
            }
            Self::ResourceExists {
                service,
                resource_id,
                ..
            } => {
                write!(
                    f,
                    "[{service}] Resource '{resource_id}' already exists and must be imported"
                )
            }
            Self::PreconditionFailed {
                service,
                resource_id,
                ..
            } => {
                write!(f, "[{service}] Precondition failed for '{resource_id}'")
            }
            Self::InvalidParameter {
                service,
                param,
                detail,
            } => {
                write!(f, "[{service}] Invalid parameter '{param}': {detail}")
            }
            Self::QuotaExceeded { service, .. } => {
                write!(f, "[{service}] Quota exceeded")
            }
            Self::RateLimited {
                service,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{service}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{service}] Rate limited")
                }
            }
            Self::OperationFailed {
                service,
                operation,
                status,
                raw_message,
                ..
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{service}] Operation '{operation}' {status}: {msg}")
                } else {
                    write!(f, "[{service}] Operation '{operation}' {status}")
                }
            }
            Self::OperationIncomplete { service, operation } => {
                write!(
                    f,
                    "[{service}] Operation '{operation}' has not completed yet"
                )
            }
            Self::OperationTimedOut {
                service,
                operation,
                attempts,
            } => {
                write!(
                    f,
                    "[{service}] Operation '{operation}' did not complete after {attempts} polls"
                )
            }
            Self::Cancelled { service, operation } => {
                write!(f, "[{service}] Operation '{operation}' cancelled")
            }
            Self::ParseError { service, detail } => {
                write!(f, "[{service}] Parse error: {detail}")
            }
            Self::SerializationError { service, detail } => {
                write!(f, "[{service}] Serialization error: {detail}")
            }
            Self::Unknown {
                service,
                status,
                raw_message,
                ..
            } => {
                if let Some(status) = status {
                    write!(f, "[{service}] HTTP {status}: {raw_message}")
                } else {
                    write!(f, "[{service}] {raw_message}")
                }
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;
