//! Subscription and subscription alias operations

use reqwest::Method;

use super::{
    ALIAS_API_VERSION, PutAliasRequest, RenamedSubscriptionId, SERVICE, SUBSCRIPTION_API_VERSION,
    Subscription, SubscriptionAlias, SubscriptionName,
};
use crate::clients::arm::{ArmClient, Conditions};
use crate::error::Result;
use crate::ids::SubscriptionAliasId;
use crate::lro::{LongRunningOperation, OperationMethod};
use crate::traits::{ErrorContext, ProviderErrorMapper};

/// Client for subscriptions and `Microsoft.Subscription/aliases`.
#[derive(Debug, Clone)]
pub struct SubscriptionClient {
    arm: ArmClient,
}

impl ProviderErrorMapper for SubscriptionClient {
    fn service_name(&self) -> &'static str {
        SERVICE
    }
}

impl SubscriptionClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    fn alias_url(&self, alias: &str) -> String {
        let id = SubscriptionAliasId::new(urlencoding::encode(alias));
        self.arm.url(&id.to_string(), ALIAS_API_VERSION, &[])
    }

    fn require(&self, param: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(self.invalid_parameter(param, "must not be empty"));
        }
        Ok(())
    }

    /// Gets a subscription.
    pub async fn get(&self, subscription_id: &str) -> Result<Subscription> {
        self.require("subscription_id", subscription_id)?;
        let path = format!("/subscriptions/{}", urlencoding::encode(subscription_id));
        let url = self.arm.url(&path, SUBSCRIPTION_API_VERSION, &[]);
        self.arm
            .get_json(SERVICE, &url, ErrorContext::resource(subscription_id))
            .await
    }

    /// Creates an alias, either for a new subscription under a billing scope
    /// or for an existing subscription.
    ///
    /// Subscription creation is asynchronous; the returned handle resolves to
    /// the alias once provisioning has finished.
    pub async fn create_alias(
        &self,
        alias: &str,
        request: &PutAliasRequest,
    ) -> Result<LongRunningOperation<SubscriptionAlias>> {
        self.require("alias", alias)?;
        let Some(properties) = request.properties.as_ref() else {
            return Err(self.invalid_parameter("properties", "must be set"));
        };
        if properties.billing_scope.is_none() && properties.subscription_id.is_none() {
            return Err(self.invalid_parameter(
                "properties",
                "either billing_scope or subscription_id must be set",
            ));
        }

        let url = self.alias_url(alias);
        self.arm
            .begin(
                SERVICE,
                "aliases.create",
                OperationMethod::Put,
                &url,
                Some(request),
                Conditions::NONE,
                ErrorContext::resource(alias),
            )
            .await
    }

    /// Gets an alias.
    pub async fn get_alias(&self, alias: &str) -> Result<SubscriptionAlias> {
        self.require("alias", alias)?;
        let url = self.alias_url(alias);
        self.arm
            .get_json(SERVICE, &url, ErrorContext::resource(alias))
            .await
    }

    /// Deletes an alias. The subscription itself is left in place.
    pub async fn delete_alias(&self, alias: &str) -> Result<()> {
        self.require("alias", alias)?;
        let url = self.alias_url(alias);
        let response = self
            .arm
            .send(SERVICE, Method::DELETE, &url, None, Conditions::NONE)
            .await?;
        ArmClient::check(SERVICE, response, ErrorContext::resource(alias))?;
        Ok(())
    }

    /// Changes the display name of a subscription.
    pub async fn rename(&self, subscription_id: &str, name: &str) -> Result<RenamedSubscriptionId> {
        self.require("subscription_id", subscription_id)?;
        self.require("subscription_name", name)?;
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.Subscription/rename",
            urlencoding::encode(subscription_id)
        );
        let url = self.arm.url(&path, ALIAS_API_VERSION, &[]);
        let body = SubscriptionName {
            subscription_name: Some(name.to_string()),
        };
        self.arm
            .send_json(
                SERVICE,
                Method::POST,
                &url,
                Some(&body),
                Conditions::NONE,
                ErrorContext::resource(subscription_id),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::subscription::PutAliasRequestProperties;
    use crate::credentials::StaticTokenCredential;
    use crate::error::ProviderError;
    use std::sync::Arc;

    fn subscriptions() -> Option<SubscriptionClient> {
        ArmClient::builder("sub-1")
            .credential(Arc::new(StaticTokenCredential::new("token")))
            .build()
            .ok()
            .map(SubscriptionClient::new)
    }

    #[test]
    fn alias_url_shape() {
        let Some(client) = subscriptions() else { return };
        assert_eq!(
            client.alias_url("testAcc-42"),
            "https://management.azure.com/providers/Microsoft.Subscription/aliases/testAcc-42?api-version=2020-09-01"
        );
    }

    #[tokio::test]
    async fn create_alias_requires_target() {
        let Some(client) = subscriptions() else { return };

        let result = client.create_alias("dev", &PutAliasRequest::default()).await;
        assert!(matches!(
            result,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "properties"
        ));

        let request = PutAliasRequest {
            properties: Some(PutAliasRequestProperties {
                display_name: Some("Dev".to_string()),
                ..PutAliasRequestProperties::default()
            }),
        };
        let result = client.create_alias("dev", &request).await;
        assert!(matches!(result, Err(ProviderError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn empty_arguments_are_rejected() {
        let Some(client) = subscriptions() else { return };
        assert!(matches!(
            client.get_alias(" ").await,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "alias"
        ));
        assert!(matches!(
            client.rename("sub-1", "").await,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "subscription_name"
        ));
        assert!(matches!(
            client.get("").await,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "subscription_id"
        ));
    }
}
