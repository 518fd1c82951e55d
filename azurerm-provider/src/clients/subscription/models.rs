//! Subscription, subscription alias and tags data model

use serde::{Deserialize, Serialize};

use crate::types::Tags;

// ============ Aliases (Microsoft.Subscription 2020-09-01) ============

/// Intended use of a new subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Workload {
    #[default]
    Production,
    DevTest,
}

impl Workload {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "Production",
            Self::DevTest => "DevTest",
        }
    }
}

/// Body of an alias create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutAliasRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PutAliasRequestProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutAliasRequestProperties {
    /// Display name of a new subscription.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload: Option<Workload>,
    /// Billing scope the new subscription is created under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_scope: Option<String>,
    /// Existing subscription to alias instead of creating one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reseller_id: Option<String>,
}

/// Provisioning state of an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasProvisioningState {
    Accepted,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A subscription alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionAlias {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing)]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SubscriptionAliasProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAliasProperties {
    /// Subscription the alias points at (read-only).
    #[serde(default, skip_serializing)]
    pub subscription_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<AliasProvisioningState>,
}

impl SubscriptionAlias {
    pub fn subscription_id(&self) -> Option<&str> {
        self.properties.as_ref()?.subscription_id.as_deref()
    }
}

// ============ Subscriptions (2020-01-01) ============

/// State of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionState {
    Enabled,
    Warned,
    PastDue,
    Disabled,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl SubscriptionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Warned => "Warned",
            Self::PastDue => "PastDue",
            Self::Disabled => "Disabled",
            Self::Deleted => "Deleted",
            Self::Unknown => "Unknown",
        }
    }
}

/// A subscription (read-only view).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub state: Option<SubscriptionState>,
}

/// Body of a rename request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_name: Option<String>,
}

/// Response of subscription operations that return the affected ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedSubscriptionId {
    #[serde(default)]
    pub value: Option<String>,
}

// ============ Tags (Microsoft.Resources 2021-04-01) ============

/// Tag dictionary wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// The tags resource of a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsResource {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing)]
    pub resource_type: Option<String>,
    pub properties: TagsProperties,
}

impl TagsResource {
    pub fn new(tags: Tags) -> Self {
        Self {
            properties: TagsProperties { tags: Some(tags) },
            ..Self::default()
        }
    }

    /// The tags, empty when none are set.
    pub fn tags(&self) -> Tags {
        self.properties.tags.clone().unwrap_or_default()
    }
}

/// How a tags patch combines with the existing tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagsPatchOperation {
    /// Add new tags and overwrite values of existing keys.
    Merge,
    /// Replace the whole tag set.
    Replace,
    /// Remove the given tags (matched by key and value).
    Delete,
}

/// Body of a tags patch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsPatchResource {
    pub operation: TagsPatchOperation,
    pub properties: TagsProperties,
}
