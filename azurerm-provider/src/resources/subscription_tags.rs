//! `azurerm_subscription_tags`

use async_trait::async_trait;

use super::{ConfigReader, found, invalid_id, requires_import};
use crate::clients::arm::ArmClient;
use crate::clients::subscription::{TagsClient, TagsPatchOperation};
use crate::error::Result;
use crate::ids::SubscriptionTagsId;
use crate::traits::ResourceAdapter;
use crate::types::{
    AttributeSchema, AttributeType, InstanceState, ResourceConfig, ResourceMetadata, Tags,
};

const TYPE_NAME: &str = "azurerm_subscription_tags";

/// Tags applied at subscription scope.
///
/// The tags resource always exists on ARM; an empty tag set is treated as
/// "not present".
#[derive(Debug, Clone)]
pub struct SubscriptionTagsResource {
    tags: TagsClient,
}

impl SubscriptionTagsResource {
    pub fn new(arm: ArmClient) -> Self {
        Self {
            tags: TagsClient::new(arm),
        }
    }

    fn parse_id(id: &str) -> Result<SubscriptionTagsId> {
        id.parse().map_err(|e| invalid_id(TYPE_NAME, &e))
    }
}

/// Accepts a bare subscription GUID or a `/subscriptions/{id}` path.
fn subscription_id_of(value: &str) -> &str {
    let value = value.trim().trim_end_matches('/');
    value
        .strip_prefix("/subscriptions/")
        .or_else(|| value.strip_prefix("subscriptions/"))
        .unwrap_or(value)
}

fn flatten(id: &SubscriptionTagsId, tags: &Tags) -> InstanceState {
    let mut state = InstanceState::new(id.to_string());
    state.set("subscription_id", &id.subscription_id);
    state.set_map("tags", tags);
    state
}

#[async_trait]
impl ResourceAdapter for SubscriptionTagsResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn metadata() -> ResourceMetadata {
        ResourceMetadata {
            type_name: TYPE_NAME.to_string(),
            description: "Manages the tags of a subscription.".to_string(),
            attributes: vec![
                AttributeSchema::required("subscription_id", AttributeType::String).force_new(),
                AttributeSchema::required("tags", AttributeType::Map),
            ],
        }
    }

    async fn create(&self, config: &ResourceConfig) -> Result<InstanceState> {
        let reader = ConfigReader::new(TYPE_NAME, config);
        let subscription_id = subscription_id_of(reader.required_str("subscription_id")?);
        let tags = reader.tags("tags")?.unwrap_or_default();
        let id = SubscriptionTagsId::new(subscription_id);

        let existing = found(self.tags.get_at_scope(&id.scope()).await)?;
        if existing.is_some_and(|resource| !resource.tags().is_empty()) {
            return Err(requires_import(TYPE_NAME, &id.to_string()));
        }

        log::info!("[{TYPE_NAME}] Applying {} tag(s) to {}", tags.len(), id.scope());
        let resource = self
            .tags
            .update_at_scope(&id.scope(), TagsPatchOperation::Merge, &tags)
            .await?;
        Ok(flatten(&id, &resource.tags()))
    }

    async fn read(&self, id: &str) -> Result<Option<InstanceState>> {
        let id = Self::parse_id(id)?;
        let tags = found(self.tags.get_at_scope(&id.scope()).await)?
            .map(|resource| resource.tags())
            .filter(|tags| !tags.is_empty());
        Ok(tags.map(|tags| flatten(&id, &tags)))
    }

    async fn update(&self, id: &str, config: &ResourceConfig) -> Result<InstanceState> {
        let id = Self::parse_id(id)?;
        let tags = ConfigReader::new(TYPE_NAME, config)
            .tags("tags")?
            .unwrap_or_default();

        if tags.is_empty() {
            self.tags.delete_at_scope(&id.scope()).await?;
            return Ok(flatten(&id, &tags));
        }
        let resource = self
            .tags
            .update_at_scope(&id.scope(), TagsPatchOperation::Replace, &tags)
            .await?;
        Ok(flatten(&id, &resource.tags()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = Self::parse_id(id)?;
        log::info!("[{TYPE_NAME}] Removing tags from {}", id.scope());
        found(self.tags.delete_at_scope(&id.scope()).await).map(|_| ())
    }
}
