use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::lro::PollOptions;
use crate::utils::log_sanitizer::mask_secret;

/// Resource tags, ordered by key so encodings are stable.
pub type Tags = BTreeMap<String, String>;

/// Desired configuration of a resource as handed over by the host runtime.
pub type ResourceConfig = serde_json::Map<String, serde_json::Value>;

/// Default public-cloud ARM endpoint.
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";
/// Default Azure AD authority.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

// ============ Instance State ============

/// Flat attribute map persisted by the host runtime.
///
/// Maps are stored as `key.%` (entry count) plus `key.<name>`; lists as
/// `key.#` (length) plus `key.<index>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    /// ARM resource ID.
    pub id: String,
    /// Flattened attributes.
    pub attributes: BTreeMap<String, String>,
}

impl InstanceState {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut attributes = BTreeMap::new();
        attributes.insert("id".to_string(), id.clone());
        Self { id, attributes }
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.attributes.insert(key.to_string(), value.to_string());
    }

    /// Sets `key` only when a value is present.
    pub fn set_opt<V: ToString>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.set(key, value);
        }
    }

    pub fn set_map(&mut self, key: &str, map: &BTreeMap<String, String>) {
        self.remove_prefixed(key);
        self.set(&format!("{key}.%"), map.len());
        for (k, v) in map {
            self.set(&format!("{key}.{k}"), v);
        }
    }

    pub fn set_list(&mut self, key: &str, items: &[String]) {
        self.remove_prefixed(key);
        self.set(&format!("{key}.#"), items.len());
        for (i, item) in items.iter().enumerate() {
            self.set(&format!("{key}.{i}"), item);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Rebuilds a map attribute written by [`set_map`](Self::set_map).
    pub fn get_map(&self, key: &str) -> BTreeMap<String, String> {
        let prefix = format!("{key}.");
        self.attributes
            .iter()
            .filter_map(|(k, v)| {
                let name = k.strip_prefix(&prefix)?;
                (name != "%").then(|| (name.to_string(), v.clone()))
            })
            .collect()
    }

    /// Rebuilds a list attribute written by [`set_list`](Self::set_list).
    pub fn get_list(&self, key: &str) -> Vec<String> {
        let len = self
            .get(&format!("{key}.#"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        (0..len)
            .filter_map(|i| self.get(&format!("{key}.{i}")).map(ToString::to_string))
            .collect()
    }

    fn remove_prefixed(&mut self, key: &str) {
        let prefix = format!("{key}.");
        self.attributes.retain(|k, _| !k.starts_with(&prefix));
    }
}

// ============ Resource Metadata Types ============

/// Value type of a resource attribute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Int,
    Map,
    List,
}

/// Schema of a single resource attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSchema {
    /// Attribute name (e.g. `"resource_group_name"`).
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Must be set in the configuration.
    pub required: bool,
    /// Set by the server; may also be configured when `required` is `false`.
    pub computed: bool,
    /// Changing the value replaces the resource.
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl AttributeSchema {
    pub fn required(name: &str, attr_type: AttributeType) -> Self {
        Self {
            name: name.to_string(),
            attr_type,
            required: true,
            computed: false,
            force_new: false,
            help_text: None,
        }
    }

    pub fn optional(name: &str, attr_type: AttributeType) -> Self {
        Self {
            required: false,
            ..Self::required(name, attr_type)
        }
    }

    pub fn computed(name: &str, attr_type: AttributeType) -> Self {
        Self {
            required: false,
            computed: true,
            ..Self::required(name, attr_type)
        }
    }

    #[must_use]
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    #[must_use]
    pub fn help(mut self, text: &str) -> Self {
        self.help_text = Some(text.to_string());
        self
    }
}

/// Static description of a resource type.
///
/// Obtain via [`get_all_resource_metadata()`](crate::get_all_resource_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// Resource type name (e.g. `"azurerm_dns_zone"`).
    pub type_name: String,
    pub description: String,
    pub attributes: Vec<AttributeSchema>,
}

// ============ Configuration Types ============

/// Validation error for provider configuration fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CredentialValidationError {
    /// A required field is missing entirely.
    #[error("Missing required field: {label}")]
    MissingField { field: String, label: String },
    /// A field is present but empty/whitespace-only.
    #[error("Field must not be empty: {label}")]
    EmptyField { field: String, label: String },
    /// A field has an invalid format.
    #[error("{label}: {reason}")]
    InvalidFormat {
        field: String,
        label: String,
        reason: String,
    },
}

impl CredentialValidationError {
    /// Machine-readable key of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field, .. }
            | Self::EmptyField { field, .. }
            | Self::InvalidFormat { field, .. } => field,
        }
    }
}

impl From<CredentialValidationError> for ProviderError {
    fn from(e: CredentialValidationError) -> Self {
        Self::InvalidParameter {
            service: "config".to_string(),
            param: e.field().to_string(),
            detail: e.to_string(),
        }
    }
}

/// How the provider authenticates against Azure AD.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ArmCredentials {
    /// A pre-acquired bearer token.
    #[serde(rename_all = "camelCase")]
    AccessToken { access_token: String },
    /// OAuth2 client-credentials flow for a service principal.
    #[serde(rename_all = "camelCase")]
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl fmt::Debug for ArmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessToken { access_token } => f
                .debug_struct("AccessToken")
                .field("access_token", &mask_secret(access_token))
                .finish(),
            Self::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &mask_secret(client_secret))
                .finish(),
        }
    }
}

/// Provider configuration.
///
/// Serialized with camelCase keys so hosts can persist it as-is:
///
/// ```json
/// {
///   "subscriptionId": "00000000-0000-0000-0000-000000000000",
///   "credentials": { "type": "accessToken", "accessToken": "..." }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Default subscription for subscription-scoped calls.
    pub subscription_id: String,
    pub credentials: ArmCredentials,
    #[serde(default = "default_resource_manager_endpoint")]
    pub resource_manager_endpoint: String,
    #[serde(default = "default_authority_host")]
    pub authority_host: String,
    #[serde(default)]
    pub poll: PollOptions,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_resource_manager_endpoint() -> String {
    DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string()
}

fn default_authority_host() -> String {
    DEFAULT_AUTHORITY_HOST.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    60
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

/// `ARM_*` environment variable → configuration key.
const ENV_KEYS: &[(&str, &str)] = &[
    ("ARM_SUBSCRIPTION_ID", "subscriptionId"),
    ("ARM_TENANT_ID", "tenantId"),
    ("ARM_CLIENT_ID", "clientId"),
    ("ARM_CLIENT_SECRET", "clientSecret"),
    ("ARM_ACCESS_TOKEN", "accessToken"),
    ("ARM_RESOURCE_MANAGER_ENDPOINT", "resourceManagerEndpoint"),
    ("ARM_AUTHORITY_HOST", "authorityHost"),
];

impl ProviderConfig {
    /// A configuration with default endpoints, polling and timeouts.
    pub fn new(subscription_id: impl Into<String>, credentials: ArmCredentials) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            credentials,
            resource_manager_endpoint: default_resource_manager_endpoint(),
            authority_host: default_authority_host(),
            poll: PollOptions::default(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Construct a configuration from a flat key/value map, validating fields.
    ///
    /// `accessToken` takes precedence; otherwise `tenantId`, `clientId` and
    /// `clientSecret` are required.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, CredentialValidationError> {
        let subscription_id = Self::get_required_field(map, "subscriptionId", "Subscription ID")?;

        let credentials = if map.contains_key("accessToken") {
            ArmCredentials::AccessToken {
                access_token: Self::get_required_field(map, "accessToken", "Access Token")?,
            }
        } else {
            ArmCredentials::ClientSecret {
                tenant_id: Self::get_required_field(map, "tenantId", "Tenant ID")?,
                client_id: Self::get_required_field(map, "clientId", "Client ID")?,
                client_secret: Self::get_required_field(map, "clientSecret", "Client Secret")?,
            }
        };

        let mut config = Self::new(subscription_id, credentials);

        if let Some(endpoint) = Self::get_url_field(map, "resourceManagerEndpoint", "Resource Manager Endpoint")? {
            config.resource_manager_endpoint = endpoint;
        }
        if let Some(authority) = Self::get_url_field(map, "authorityHost", "Authority Host")? {
            config.authority_host = authority;
        }
        if let Some(secs) = Self::get_number_field(map, "pollIntervalSecs", "Poll Interval")? {
            config.poll.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = Self::get_number_field(map, "pollTimeoutSecs", "Poll Timeout")? {
            config.poll.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = Self::get_number_field(map, "pollMaxAttempts", "Poll Max Attempts")? {
            config.poll.max_attempts = u32::try_from(n).unwrap_or(u32::MAX);
        }
        if let Some(secs) = Self::get_number_field(map, "requestTimeoutSecs", "Request Timeout")? {
            config.request_timeout_secs = secs;
        }

        Ok(config)
    }

    /// Construct a configuration from the `ARM_*` environment variables.
    pub fn from_env() -> Result<Self, CredentialValidationError> {
        let map: HashMap<String, String> = ENV_KEYS
            .iter()
            .filter_map(|(var, key)| std::env::var(var).ok().map(|v| ((*key).to_string(), v)))
            .collect();
        Self::from_map(&map)
    }

    /// Flatten back into the key/value form accepted by [`from_map`](Self::from_map).
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("subscriptionId".to_string(), self.subscription_id.clone()),
            (
                "resourceManagerEndpoint".to_string(),
                self.resource_manager_endpoint.clone(),
            ),
            ("authorityHost".to_string(), self.authority_host.clone()),
            (
                "pollIntervalSecs".to_string(),
                self.poll.interval.as_secs().to_string(),
            ),
            (
                "pollTimeoutSecs".to_string(),
                self.poll.timeout.as_secs().to_string(),
            ),
            (
                "pollMaxAttempts".to_string(),
                self.poll.max_attempts.to_string(),
            ),
            (
                "requestTimeoutSecs".to_string(),
                self.request_timeout_secs.to_string(),
            ),
        ]
        .into();

        match &self.credentials {
            ArmCredentials::AccessToken { access_token } => {
                map.insert("accessToken".to_string(), access_token.clone());
            }
            ArmCredentials::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                map.insert("tenantId".to_string(), tenant_id.clone());
                map.insert("clientId".to_string(), client_id.clone());
                map.insert("clientSecret".to_string(), client_secret.clone());
            }
        }
        map
    }

    /// `{endpoint}/.default`, the scope requested for ARM tokens.
    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.resource_manager_endpoint.trim_end_matches('/'))
    }

    fn get_required_field(
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<String, CredentialValidationError> {
        match map.get(key) {
            None => Err(CredentialValidationError::MissingField {
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(CredentialValidationError::EmptyField {
                field: key.to_string(),
                label: label.to_string(),
            }),
            Some(v) => Ok(v.trim().to_string()),
        }
    }

    fn get_url_field(
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<Option<String>, CredentialValidationError> {
        let Some(value) = map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        if !(value.starts_with("https://") || value.starts_with("http://")) {
            return Err(CredentialValidationError::InvalidFormat {
                field: key.to_string(),
                label: label.to_string(),
                reason: format!("'{value}' is not an http(s) URL"),
            });
        }
        Ok(Some(value.trim_end_matches('/').to_string()))
    }

    fn get_number_field(
        map: &HashMap<String, String>,
        key: &str,
        label: &str,
    ) -> Result<Option<u64>, CredentialValidationError> {
        let Some(value) = map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| CredentialValidationError::InvalidFormat {
                field: key.to_string(),
                label: label.to_string(),
                reason: format!("'{value}' is not a non-negative integer"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    // ============ ProviderConfig ============

    #[test]
    fn config_from_access_token() {
        let res = ProviderConfig::from_map(&map(&[
            ("subscriptionId", "sub-1"),
            ("accessToken", "tok"),
        ]));
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(config) = res else {
            return;
        };
        assert_eq!(config.subscription_id, "sub-1");
        assert_eq!(
            config.credentials,
            ArmCredentials::AccessToken {
                access_token: "tok".to_string()
            }
        );
        assert_eq!(config.resource_manager_endpoint, DEFAULT_RESOURCE_MANAGER_ENDPOINT);
        assert_eq!(config.poll, PollOptions::default());
    }

    #[test]
    fn config_from_client_secret_with_overrides() {
        let res = ProviderConfig::from_map(&map(&[
            ("subscriptionId", "sub-1"),
            ("tenantId", "tenant"),
            ("clientId", "client"),
            ("clientSecret", "secret"),
            ("resourceManagerEndpoint", "https://management.chinacloudapi.cn/"),
            ("pollIntervalSecs", "5"),
            ("pollMaxAttempts", "12"),
        ]));
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(config) = res else {
            return;
        };
        assert!(matches!(config.credentials, ArmCredentials::ClientSecret { .. }));
        assert_eq!(
            config.resource_manager_endpoint,
            "https://management.chinacloudapi.cn"
        );
        assert_eq!(
            config.token_scope(),
            "https://management.chinacloudapi.cn/.default"
        );
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert_eq!(config.poll.max_attempts, 12);
    }

    #[test]
    fn config_missing_subscription() {
        let res = ProviderConfig::from_map(&map(&[("accessToken", "tok")]));
        assert!(matches!(
            res,
            Err(CredentialValidationError::MissingField { ref field, .. }) if field == "subscriptionId"
        ));
    }

    #[test]
    fn config_missing_client_secret() {
        let res = ProviderConfig::from_map(&map(&[
            ("subscriptionId", "sub-1"),
            ("tenantId", "tenant"),
            ("clientId", "client"),
        ]));
        assert!(matches!(
            res,
            Err(CredentialValidationError::MissingField { ref field, .. }) if field == "clientSecret"
        ));
    }

    #[test]
    fn config_empty_field() {
        let res = ProviderConfig::from_map(&map(&[
            ("subscriptionId", "sub-1"),
            ("accessToken", "   "),
        ]));
        assert!(matches!(
            res,
            Err(CredentialValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn config_invalid_number_and_url() {
        let res = ProviderConfig::from_map(&map(&[
            ("subscriptionId", "sub-1"),
            ("accessToken", "tok"),
            ("pollTimeoutSecs", "ten"),
        ]));
        assert!(matches!(
            res,
            Err(CredentialValidationError::InvalidFormat { ref field, .. }) if field == "pollTimeoutSecs"
        ));

        let res = ProviderConfig::from_map(&map(&[
            ("subscriptionId", "sub-1"),
            ("accessToken", "tok"),
            ("authorityHost", "login.microsoftonline.com"),
        ]));
        assert!(matches!(
            res,
            Err(CredentialValidationError::InvalidFormat { ref field, .. }) if field == "authorityHost"
        ));
    }

    #[test]
    fn config_to_map_round_trips() {
        let original = ProviderConfig::new(
            "sub-1",
            ArmCredentials::ClientSecret {
                tenant_id: "t".to_string(),
                client_id: "c".to_string(),
                client_secret: "s".to_string(),
            },
        );
        let res = ProviderConfig::from_map(&original.to_map());
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(back) = res else {
            return;
        };
        assert_eq!(back, original);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let json = r#"{"subscriptionId":"sub-1","credentials":{"type":"accessToken","accessToken":"tok"}}"#;
        let res: Result<ProviderConfig, _> = serde_json::from_str(json);
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(config) = res else {
            return;
        };
        assert_eq!(config.authority_host, DEFAULT_AUTHORITY_HOST);
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn credentials_debug_masks_secrets() {
        let creds = ArmCredentials::ClientSecret {
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: "super-secret-value".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("tenant"));
    }

    #[test]
    fn validation_error_maps_to_invalid_parameter() {
        let err: ProviderError = CredentialValidationError::MissingField {
            field: "tenantId".to_string(),
            label: "Tenant ID".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            ProviderError::InvalidParameter { ref param, .. } if param == "tenantId"
        ));
    }

    // ============ InstanceState ============

    #[test]
    fn state_flattens_maps_and_lists() {
        let mut state = InstanceState::new("/subscriptions/s");
        let tags: Tags = [
            ("cost_center".to_string(), "MSFT".to_string()),
            ("environment".to_string(), "production".to_string()),
        ]
        .into();
        state.set_map("tags", &tags);
        state.set_list(
            "name_servers",
            &["ns1-01.azure-dns.com.".to_string(), "ns2-01.azure-dns.net.".to_string()],
        );

        assert_eq!(state.get("id"), Some("/subscriptions/s"));
        assert_eq!(state.get("tags.%"), Some("2"));
        assert_eq!(state.get("tags.cost_center"), Some("MSFT"));
        assert_eq!(state.get("name_servers.#"), Some("2"));
        assert_eq!(state.get("name_servers.1"), Some("ns2-01.azure-dns.net."));
        assert_eq!(state.get_map("tags"), tags);
        assert_eq!(state.get_list("name_servers").len(), 2);
    }

    #[test]
    fn state_set_map_replaces_previous_entries() {
        let mut state = InstanceState::new("id");
        state.set_map("tags", &[("a".to_string(), "1".to_string())].into());
        state.set_map("tags", &Tags::new());

        assert_eq!(state.get("tags.%"), Some("0"));
        assert_eq!(state.get("tags.a"), None);
        assert!(state.get_map("tags").is_empty());
    }
}
