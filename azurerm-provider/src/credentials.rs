//! Azure AD token sources
//!
//! [`StaticTokenCredential`] hands out a pre-acquired token,
//! [`ClientSecretCredential`] runs the OAuth2 client-credentials flow for a
//! service principal and caches one token per scope until shortly before it
//! expires.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ProviderError, Result};
use crate::http_client::HttpUtils;
use crate::traits::{AccessToken, TokenCredential};
use crate::types::{ArmCredentials, ProviderConfig};
use crate::utils::log_sanitizer::mask_secret;

const SERVICE: &str = "auth";

/// Tokens are refreshed this long before their reported expiry.
const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// A fixed bearer token (e.g. from `az account get-access-token`).
#[derive(Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenCredential")
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(AccessToken {
            token: self.token.clone(),
            expires_on: None,
        })
    }
}

/// Token endpoint response (`/oauth2/v2.0/token`).
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Token endpoint error body.
#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth2 client-credentials flow against Azure AD.
pub struct ClientSecretCredential {
    client: Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    /// scope -> 令牌
    cache: Mutex<HashMap<String, AccessToken>>,
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("authority_host", &self.authority_host)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_secret(&self.client_secret))
            .finish_non_exhaustive()
    }
}

impl ClientSecretCredential {
    pub fn new(
        client: Client,
        authority_host: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            authority_host: authority_host.into().trim_end_matches('/').to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host, self.tenant_id
        )
    }

    /// 请求新令牌
    async fn request_token(&self, scope: &str) -> Result<AccessToken> {
        let url = self.token_url();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];

        let response =
            HttpUtils::execute_request(self.client.post(&url).form(&form), SERVICE, "POST", &url)
                .await?;

        if !response.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&response.body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {description}", e.error),
                    None => e.error,
                })
                .unwrap_or_else(|_| format!("HTTP {}", response.status));
            log::warn!("[{SERVICE}] Token request for client {} failed", self.client_id);
            return Err(ProviderError::InvalidCredentials {
                service: SERVICE.to_string(),
                raw_message: Some(detail),
            });
        }

        let token: TokenResponse = HttpUtils::parse_json(&response.body, SERVICE)?;
        Ok(AccessToken {
            token: token.access_token,
            expires_on: expiry_after(token.expires_in),
        })
    }
}

/// Expiry of a token issued now with the given lifetime.
///
/// `None` (never expires) when the lifetime does not fit the calendar range.
fn expiry_after(expires_in: u64) -> Option<DateTime<Utc>> {
    let lifetime = ChronoDuration::try_seconds(i64::try_from(expires_in).ok()?)?;
    Utc::now().checked_add_signed(lifetime)
}

/// Whether a cached token can still be handed out.
fn is_fresh(token: &AccessToken) -> bool {
    token.expires_on.is_none_or(|at| {
        at.checked_sub_signed(ChronoDuration::seconds(REFRESH_MARGIN_SECS))
            .is_some_and(|refresh_at| refresh_at > Utc::now())
    })
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(scope).filter(|t| is_fresh(t)) {
            return Ok(token.clone());
        }

        log::debug!(
            "[{SERVICE}] Requesting token for client {} (scope {scope})",
            self.client_id
        );
        let token = self.request_token(scope).await?;
        cache.insert(scope.to_string(), token.clone());
        Ok(token)
    }
}

/// Builds the credential described by the configuration.
pub fn credential_from_config(
    config: &ProviderConfig,
    client: &Client,
) -> Arc<dyn TokenCredential> {
    match &config.credentials {
        ArmCredentials::AccessToken { access_token } => {
            Arc::new(StaticTokenCredential::new(access_token.clone()))
        }
        ArmCredentials::ClientSecret {
            tenant_id,
            client_id,
            client_secret,
        } => Arc::new(ClientSecretCredential::new(
            client.clone(),
            config.authority_host.clone(),
            tenant_id.clone(),
            client_id.clone(),
            client_secret.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned() {
        let credential = StaticTokenCredential::new("abc.def.ghi");
        let token = credential
            .get_token("https://management.azure.com/.default")
            .await;
        assert!(token.is_ok());
        let Ok(token) = token else { return };
        assert_eq!(token.token, "abc.def.ghi");
        assert!(token.expires_on.is_none());
    }

    #[test]
    fn freshness_honours_refresh_margin() {
        let soon = AccessToken {
            token: "t".to_string(),
            expires_on: Some(Utc::now() + ChronoDuration::seconds(60)),
        };
        let later = AccessToken {
            token: "t".to_string(),
            expires_on: Some(Utc::now() + ChronoDuration::seconds(3600)),
        };
        let never = AccessToken {
            token: "t".to_string(),
            expires_on: None,
        };
        assert!(!is_fresh(&soon));
        assert!(is_fresh(&later));
        assert!(is_fresh(&never));
    }

    #[test]
    fn token_url_uses_tenant() {
        let credential = ClientSecretCredential::new(
            Client::new(),
            "https://login.microsoftonline.com/",
            "tenant-1",
            "client-1",
            "secret",
        );
        assert_eq!(
            credential.token_url(),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
        assert!(!format!("{credential:?}").contains("secret\""));
    }

    #[tokio::test]
    async fn cached_token_skips_request() {
        let credential = ClientSecretCredential::new(
            Client::new(),
            "http://127.0.0.1:9",
            "tenant-1",
            "client-1",
            "secret",
        );
        credential.cache.lock().await.insert(
            "scope".to_string(),
            AccessToken {
                token: "cached".to_string(),
                expires_on: Some(Utc::now() + ChronoDuration::seconds(3600)),
            },
        );

        let token = credential.get_token("scope").await;
        assert!(matches!(token, Ok(AccessToken { ref token, .. }) if token == "cached"));
    }

    #[tokio::test]
    async fn cached_token_is_per_scope() {
        // 端口 9 无服务，请求新令牌必然失败
        let credential = ClientSecretCredential::new(
            Client::new(),
            "http://127.0.0.1:9",
            "tenant-1",
            "client-1",
            "secret",
        );
        credential.cache.lock().await.insert(
            "https://management.azure.com/.default".to_string(),
            AccessToken {
                token: "arm".to_string(),
                expires_on: None,
            },
        );

        let other = credential.get_token("https://graph.microsoft.com/.default").await;
        assert!(other.is_err());

        let arm = credential
            .get_token("https://management.azure.com/.default")
            .await;
        assert!(matches!(arm, Ok(AccessToken { ref token, .. }) if token == "arm"));
    }

    #[test]
    fn expiry_of_typical_lifetime() {
        let expiry = expiry_after(3599);
        assert!(expiry.is_some());
        let Some(expiry) = expiry else { return };
        let remaining = expiry - Utc::now();
        assert!(remaining > ChronoDuration::seconds(3500));
        assert!(remaining <= ChronoDuration::seconds(3599));
    }

    #[test]
    fn out_of_range_lifetime_never_expires() {
        assert!(expiry_after(u64::MAX).is_none());
        assert!(expiry_after(u64::try_from(i64::MAX).unwrap_or(u64::MAX)).is_none());
        // 在 Duration 范围内但超出日期范围
        assert!(expiry_after(u64::try_from(i64::MAX / 1000).unwrap_or(u64::MAX)).is_none());
    }
}
