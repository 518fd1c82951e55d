//! # azurerm-provider
//!
//! Azure Resource Manager (ARM) provider library: typed clients for the DNS
//! management API (2018-05-01), subscription aliases and subscription-scope
//! tags, plus resource lifecycle adapters that an infrastructure-as-code host
//! drives with create/read/update/delete/import calls.
//!
//! ## Supported Resources
//!
//! | Resource | Feature Flag | ARM API |
//! |----------|-------------|---------|
//! | `azurerm_dns_zone` | `dns` | `Microsoft.Network/dnsZones` 2018-05-01 |
//! | `azurerm_subscription` | `subscription` | `Microsoft.Subscription/aliases` 2020-09-01 |
//! | `azurerm_subscription_tags` | `subscription` | `Microsoft.Resources/tags` 2021-04-01 |
//!
//! ## Feature Flags
//!
//! ### Service Selection
//!
//! - **`all-services`** *(default)*: enable every service listed above.
//! - **`dns`**: DNS zone, record set and resource reference clients plus the
//!   `azurerm_dns_zone` adapter.
//! - **`subscription`**: subscription, alias and tags clients plus the
//!   `azurerm_subscription` and `azurerm_subscription_tags` adapters.
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use azurerm_provider::{ArmProvider, ProviderConfig, ResourceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Configure from ARM_SUBSCRIPTION_ID, ARM_TENANT_ID, ARM_CLIENT_ID, ...
//!     let provider = ArmProvider::new(ProviderConfig::from_env()?)?;
//!
//!     // 2. Create a DNS zone through its resource adapter
//!     let zones = provider.resource("azurerm_dns_zone")?;
//!     let mut config = ResourceConfig::new();
//!     config.insert("name".into(), "example.com".into());
//!     config.insert("resource_group_name".into(), "rg-dns".into());
//!     let state = zones.create(&config).await?;
//!     println!("{} -> {:?}", state.id, state.get_list("name_servers"));
//!
//!     // 3. Or use the typed clients directly
//!     let mut pager = provider.client().zones().list(None).await?;
//!     while let Some(zone) = pager.next().await {
//!         println!("{:?}", zone?.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Long-Running Operations
//!
//! Operations that ARM completes asynchronously return a
//! [`LongRunningOperation`]. [`wait`](LongRunningOperation::wait) polls until
//! the operation finishes, fails, or exceeds its [`PollOptions`]; the
//! [`OperationToken`] can be persisted and resumed with
//! [`ArmClient::resume_operation`].
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError). ARM
//! `CloudError` responses are mapped onto structured variants:
//!
//! - [`ProviderError::ResourceNotFound`]: 404
//! - [`ProviderError::ResourceExists`]: 409, or a resource that must be imported
//! - [`ProviderError::OperationFailed`]: a long-running operation ended in `Failed`/`Canceled`
//! - [`ProviderError::RateLimited`]: 429, with the server's `Retry-After`
//!
//! Requests are not retried; only long-running operations are polled.

mod credentials;
mod error;
mod factory;
mod http_client;
mod ids;
mod lro;
mod pager;
mod traits;
mod types;
mod utils;

pub mod clients;
pub mod resources;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export factory
pub use factory::{ArmProvider, get_all_resource_metadata, resource_types};

// Re-export traits
pub use traits::{AccessToken, ResourceAdapter, TokenCredential};

// Re-export credentials
pub use credentials::{ClientSecretCredential, StaticTokenCredential, credential_from_config};

// Re-export types
pub use types::{
    ArmCredentials, AttributeSchema, AttributeType, CredentialValidationError,
    DEFAULT_AUTHORITY_HOST, DEFAULT_RESOURCE_MANAGER_ENDPOINT, InstanceState, ProviderConfig,
    ResourceConfig, ResourceMetadata, Tags,
};

// Re-export resource IDs
pub use ids::{DnsZoneId, ResourceIdError, SubscriptionAliasId, SubscriptionTagsId};

// Re-export polling and paging
pub use lro::{
    LongRunningOperation, OperationMethod, OperationPoller, OperationToken, PollOptions,
    PollStatus, PollingStrategy,
};
pub use pager::{Page, PageFetcher, Pager};

pub use clients::{ArmClient, ArmClientBuilder, Conditions};
