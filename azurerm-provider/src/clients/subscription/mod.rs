//! Subscription, subscription alias and tags clients

pub mod models;
mod subscriptions;
mod tags;

pub use models::*;
pub use subscriptions::SubscriptionClient;
pub use tags::TagsClient;

pub(crate) const SERVICE: &str = "subscription";
pub(crate) const TAGS_SERVICE: &str = "resources";

/// `Microsoft.Subscription` aliases and rename.
pub(crate) const ALIAS_API_VERSION: &str = "2020-09-01";
/// `Microsoft.Resources/subscriptions` get.
pub(crate) const SUBSCRIPTION_API_VERSION: &str = "2020-01-01";
/// `Microsoft.Resources/tags`.
pub(crate) const TAGS_API_VERSION: &str = "2021-04-01";
