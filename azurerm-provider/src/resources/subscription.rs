//! `azurerm_subscription`

use async_trait::async_trait;

use super::{ConfigReader, found, invalid_id, requires_import};
use crate::clients::arm::ArmClient;
use crate::clients::subscription::{
    PutAliasRequest, PutAliasRequestProperties, Subscription, SubscriptionAlias,
    SubscriptionClient, SubscriptionState, TagsClient, Workload,
};
use crate::error::{ProviderError, Result};
use crate::ids::SubscriptionAliasId;
use crate::traits::ResourceAdapter;
use crate::types::{
    AttributeSchema, AttributeType, InstanceState, ResourceConfig, ResourceMetadata, Tags,
};

const TYPE_NAME: &str = "azurerm_subscription";

/// A subscription managed through an alias.
///
/// Either aliases an existing subscription (`subscription_id`) or creates a
/// new one under a billing scope (`billing_scope_id`).
#[derive(Debug, Clone)]
pub struct SubscriptionResource {
    subscriptions: SubscriptionClient,
    tags: TagsClient,
}

/// Desired state read from the configuration.
#[derive(Debug)]
struct SubscriptionSpec<'a> {
    alias: &'a str,
    name: &'a str,
    subscription_id: Option<&'a str>,
    billing_scope_id: Option<&'a str>,
    workload: Workload,
    tags: Tags,
}

impl<'a> SubscriptionSpec<'a> {
    fn from_config(config: &'a ResourceConfig) -> Result<Self> {
        let reader = ConfigReader::new(TYPE_NAME, config);
        let subscription_id = reader.optional_str("subscription_id")?;
        let billing_scope_id = reader.optional_str("billing_scope_id")?;

        if subscription_id.is_some() == billing_scope_id.is_some() {
            return Err(invalid(
                "billing_scope_id",
                "exactly one of subscription_id or billing_scope_id must be set",
            ));
        }

        let workload = match reader.optional_str("workload")? {
            None => Workload::default(),
            Some(w) if w.eq_ignore_ascii_case("production") => Workload::Production,
            Some(w) if w.eq_ignore_ascii_case("devtest") => Workload::DevTest,
            Some(other) => {
                return Err(invalid(
                    "workload",
                    format!("'{other}' is not one of Production, DevTest"),
                ));
            }
        };

        Ok(Self {
            alias: reader.required_str("alias")?,
            name: reader.required_str("subscription_name")?,
            subscription_id,
            billing_scope_id,
            workload,
            tags: reader.tags("tags")?.unwrap_or_default(),
        })
    }

    fn alias_request(&self) -> PutAliasRequest {
        PutAliasRequest {
            properties: Some(PutAliasRequestProperties {
                display_name: Some(self.name.to_string()),
                workload: Some(self.workload),
                billing_scope: self.billing_scope_id.map(ToString::to_string),
                subscription_id: self.subscription_id.map(ToString::to_string),
                reseller_id: None,
            }),
        }
    }
}

fn invalid(param: &str, detail: impl Into<String>) -> ProviderError {
    ProviderError::InvalidParameter {
        service: TYPE_NAME.to_string(),
        param: param.to_string(),
        detail: detail.into(),
    }
}

fn scope(subscription_id: &str) -> String {
    format!("/subscriptions/{subscription_id}")
}

fn flatten(
    id: &SubscriptionAliasId,
    subscription_id: &str,
    subscription: Option<&Subscription>,
    tags: &Tags,
) -> InstanceState {
    let mut state = InstanceState::new(id.to_string());
    state.set("alias", &id.alias);
    state.set("subscription_id", subscription_id);
    if let Some(subscription) = subscription {
        state.set_opt("subscription_name", subscription.display_name.as_deref());
        state.set_opt("tenant_id", subscription.tenant_id.as_deref());
        state.set_opt("state", subscription.state.as_ref().map(SubscriptionState::as_str));
    }
    state.set_map("tags", tags);
    state
}

impl SubscriptionResource {
    pub fn new(arm: ArmClient) -> Self {
        Self {
            subscriptions: SubscriptionClient::new(arm.clone()),
            tags: TagsClient::new(arm),
        }
    }

    fn parse_id(id: &str) -> Result<SubscriptionAliasId> {
        id.parse().map_err(|e| invalid_id(TYPE_NAME, &e))
    }

    fn aliased_subscription(
        id: &SubscriptionAliasId,
        alias: &SubscriptionAlias,
    ) -> Result<String> {
        alias
            .subscription_id()
            .map(ToString::to_string)
            .ok_or_else(|| ProviderError::ParseError {
                service: TYPE_NAME.to_string(),
                detail: format!("alias {id} does not reference a subscription"),
            })
    }

    /// Renames the subscription when its display name differs.
    async fn apply_name(&self, subscription_id: &str, name: &str) -> Result<()> {
        let current = self.subscriptions.get(subscription_id).await?;
        if current.display_name.as_deref() == Some(name) {
            return Ok(());
        }
        log::info!("[{TYPE_NAME}] Renaming subscription {subscription_id} to '{name}'");
        self.subscriptions.rename(subscription_id, name).await?;
        Ok(())
    }

    /// Replaces the subscription-scope tags; an empty set removes them.
    async fn apply_tags(&self, subscription_id: &str, tags: &Tags) -> Result<()> {
        let scope = scope(subscription_id);
        if tags.is_empty() {
            return found(self.tags.delete_at_scope(&scope).await).map(|_| ());
        }
        self.tags.create_or_update_at_scope(&scope, tags).await?;
        Ok(())
    }

    async fn read_state(&self, id: &SubscriptionAliasId) -> Result<Option<InstanceState>> {
        let Some(alias) = found(self.subscriptions.get_alias(&id.alias).await)? else {
            log::warn!("[{TYPE_NAME}] {id} was not found, removing from state");
            return Ok(None);
        };
        let subscription_id = Self::aliased_subscription(id, &alias)?;
        let subscription = found(self.subscriptions.get(&subscription_id).await)?;
        let tags = found(self.tags.get_at_scope(&scope(&subscription_id)).await)?
            .map(|resource| resource.tags())
            .unwrap_or_default();
        Ok(Some(flatten(
            id,
            &subscription_id,
            subscription.as_ref(),
            &tags,
        )))
    }

    async fn require_state(&self, id: &SubscriptionAliasId) -> Result<InstanceState> {
        self.read_state(id)
            .await?
            .ok_or_else(|| ProviderError::ResourceNotFound {
                service: TYPE_NAME.to_string(),
                resource_id: id.to_string(),
                raw_message: None,
            })
    }
}

#[async_trait]
impl ResourceAdapter for SubscriptionResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn metadata() -> ResourceMetadata {
        ResourceMetadata {
            type_name: TYPE_NAME.to_string(),
            description: "Manages a subscription through a subscription alias.".to_string(),
            attributes: vec![
                AttributeSchema::required("alias", AttributeType::String).force_new(),
                AttributeSchema::required("subscription_name", AttributeType::String)
                    .help("Display name of the subscription"),
                AttributeSchema::optional("subscription_id", AttributeType::String)
                    .force_new()
                    .help("Existing subscription to alias; conflicts with billing_scope_id"),
                AttributeSchema::optional("billing_scope_id", AttributeType::String)
                    .force_new()
                    .help("Billing scope a new subscription is created under"),
                AttributeSchema::optional("workload", AttributeType::String)
                    .force_new()
                    .help("Production (default) or DevTest"),
                AttributeSchema::optional("tags", AttributeType::Map),
                AttributeSchema::computed("tenant_id", AttributeType::String),
                AttributeSchema::computed("state", AttributeType::String),
            ],
        }
    }

    async fn create(&self, config: &ResourceConfig) -> Result<InstanceState> {
        let spec = SubscriptionSpec::from_config(config)?;
        let id = SubscriptionAliasId::new(spec.alias);

        if found(self.subscriptions.get_alias(spec.alias).await)?.is_some() {
            return Err(requires_import(TYPE_NAME, &id.to_string()));
        }

        log::info!("[{TYPE_NAME}] Creating {id}");
        let alias = self
            .subscriptions
            .create_alias(spec.alias, &spec.alias_request())
            .await?
            .wait()
            .await?;
        let subscription_id = Self::aliased_subscription(&id, &alias)?;

        if spec.subscription_id.is_some() {
            self.apply_name(&subscription_id, spec.name).await?;
        }
        self.apply_tags(&subscription_id, &spec.tags).await?;
        self.require_state(&id).await
    }

    async fn read(&self, id: &str) -> Result<Option<InstanceState>> {
        let id = Self::parse_id(id)?;
        self.read_state(&id).await
    }

    async fn update(&self, id: &str, config: &ResourceConfig) -> Result<InstanceState> {
        let id = Self::parse_id(id)?;
        let spec = SubscriptionSpec::from_config(config)?;
        if spec.alias != id.alias {
            return Err(invalid(
                "alias",
                format!(
                    "changing '{}' to '{}' requires replacing the alias",
                    id.alias, spec.alias
                ),
            ));
        }

        let alias = self.subscriptions.get_alias(&id.alias).await?;
        let subscription_id = Self::aliased_subscription(&id, &alias)?;
        self.apply_name(&subscription_id, spec.name).await?;
        self.apply_tags(&subscription_id, &spec.tags).await?;
        self.require_state(&id).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = Self::parse_id(id)?;
        log::info!("[{TYPE_NAME}] Deleting {id}");
        found(self.subscriptions.delete_alias(&id.alias).await).map(|_| ())
    }
}
