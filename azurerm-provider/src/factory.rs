//! Provider entry point, resource registry and metadata.

use std::sync::Arc;

use crate::clients::arm::ArmClient;
use crate::error::{ProviderError, Result};
use crate::traits::ResourceAdapter;
use crate::types::{ProviderConfig, ResourceMetadata};

#[cfg(feature = "dns")]
use crate::resources::DnsZoneResource;
#[cfg(feature = "subscription")]
use crate::resources::{SubscriptionResource, SubscriptionTagsResource};

/// Configured Azure Resource Manager provider.
///
/// Holds one shared [`ArmClient`] and hands out resource adapters by type
/// name.
///
/// # Examples
///
/// ```rust,no_run
/// use azurerm_provider::{ArmProvider, ProviderConfig};
///
/// # async fn example() -> azurerm_provider::Result<()> {
/// let config = ProviderConfig::from_env()?;
/// let provider = ArmProvider::new(config)?;
/// let zone = provider.resource("azurerm_dns_zone")?;
/// let _exists = zone
///     .exists("/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/dnsZones/example.com")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArmProvider {
    client: ArmClient,
}

impl ArmProvider {
    /// Builds the provider and its credential from configuration.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        Ok(Self::from_client(ArmClient::from_config(&config)?))
    }

    pub fn from_client(client: ArmClient) -> Self {
        Self { client }
    }

    /// The shared ARM client.
    pub fn client(&self) -> &ArmClient {
        &self.client
    }

    /// Returns the adapter for a resource type.
    pub fn resource(&self, type_name: &str) -> Result<Arc<dyn ResourceAdapter>> {
        let client = self.client.clone();
        let adapter: Arc<dyn ResourceAdapter> = match type_name {
            #[cfg(feature = "dns")]
            "azurerm_dns_zone" => Arc::new(DnsZoneResource::new(client)),
            #[cfg(feature = "subscription")]
            "azurerm_subscription" => Arc::new(SubscriptionResource::new(client)),
            #[cfg(feature = "subscription")]
            "azurerm_subscription_tags" => Arc::new(SubscriptionTagsResource::new(client)),
            _ => {
                return Err(ProviderError::InvalidParameter {
                    service: "provider".to_string(),
                    param: "type_name".to_string(),
                    detail: format!(
                        "unsupported resource type '{type_name}', expected one of: {}",
                        resource_types().join(", ")
                    ),
                });
            }
        };
        Ok(adapter)
    }
}

/// Names of all resource types enabled via feature flags.
pub fn resource_types() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "dns")]
        "azurerm_dns_zone",
        #[cfg(feature = "subscription")]
        "azurerm_subscription",
        #[cfg(feature = "subscription")]
        "azurerm_subscription_tags",
    ]
}

/// Returns metadata for all resource types enabled via feature flags.
///
/// Useful for hosts that build their schema dynamically.
pub fn get_all_resource_metadata() -> Vec<ResourceMetadata> {
    vec![
        #[cfg(feature = "dns")]
        DnsZoneResource::metadata(),
        #[cfg(feature = "subscription")]
        SubscriptionResource::metadata(),
        #[cfg(feature = "subscription")]
        SubscriptionTagsResource::metadata(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticTokenCredential;

    fn provider() -> Option<ArmProvider> {
        ArmClient::builder("sub-1")
            .credential(Arc::new(StaticTokenCredential::new("token")))
            .build()
            .ok()
            .map(ArmProvider::from_client)
    }

    #[test]
    fn metadata_matches_registry() {
        let names: Vec<String> = get_all_resource_metadata()
            .into_iter()
            .map(|m| m.type_name)
            .collect();
        assert_eq!(names, resource_types());
    }

    #[test]
    fn every_registered_type_resolves() {
        let Some(provider) = provider() else { return };
        for name in resource_types() {
            let adapter = provider.resource(name);
            assert!(adapter.is_ok(), "{name} did not resolve");
            let Ok(adapter) = adapter else { return };
            assert_eq!(adapter.type_name(), name);
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let Some(provider) = provider() else { return };
        let result = provider.resource("azurerm_storage_account");
        assert!(matches!(
            result,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "type_name"
        ));
    }
}
