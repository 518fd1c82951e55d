//! Resource lifecycle adapters
//!
//! Each adapter translates a declarative configuration into ARM client calls
//! and flattens the result into an [`InstanceState`](crate::InstanceState).

#[cfg(feature = "dns")]
mod dns_zone;
#[cfg(feature = "subscription")]
mod subscription;
#[cfg(feature = "subscription")]
mod subscription_tags;

#[cfg(feature = "dns")]
pub use dns_zone::DnsZoneResource;
#[cfg(feature = "subscription")]
pub use subscription::SubscriptionResource;
#[cfg(feature = "subscription")]
pub use subscription_tags::SubscriptionTagsResource;

use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::ids::ResourceIdError;
use crate::types::{ResourceConfig, Tags};

/// Typed access to a resource configuration.
pub(crate) struct ConfigReader<'a> {
    resource: &'static str,
    config: &'a ResourceConfig,
}

impl<'a> ConfigReader<'a> {
    pub fn new(resource: &'static str, config: &'a ResourceConfig) -> Self {
        Self { resource, config }
    }

    fn invalid(&self, key: &str, detail: impl Into<String>) -> ProviderError {
        ProviderError::InvalidParameter {
            service: self.resource.to_string(),
            param: key.to_string(),
            detail: detail.into(),
        }
    }

    /// A string attribute; absent, `null` and blank values read as `None`.
    pub fn optional_str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.config.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.invalid(key, format!("expected a string, got {other}"))),
        }
    }

    pub fn required_str(&self, key: &str) -> Result<&'a str> {
        self.optional_str(key)?
            .ok_or_else(|| self.invalid(key, "is required"))
    }

    /// A string map. Absent reads as `None`; numbers and booleans are
    /// stringified the way the host stores them.
    pub fn tags(&self, key: &str) -> Result<Option<Tags>> {
        let object = match self.config.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(object)) => object,
            Some(other) => {
                return Err(self.invalid(key, format!("expected a map, got {other}")));
            }
        };
        object
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                Value::Number(n) => Ok((k.clone(), n.to_string())),
                Value::Bool(b) => Ok((k.clone(), b.to_string())),
                _ => Err(self.invalid(&format!("{key}.{k}"), "expected a string value")),
            })
            .collect::<Result<Tags>>()
            .map(Some)
    }
}

/// Maps an ID parse failure to an `InvalidParameter` on `id`.
pub(crate) fn invalid_id(resource: &'static str, err: &ResourceIdError) -> ProviderError {
    ProviderError::InvalidParameter {
        service: resource.to_string(),
        param: "id".to_string(),
        detail: err.to_string(),
    }
}

/// `ResourceNotFound` becomes `Ok(None)`.
pub(crate) fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Error returned by `create` when the resource already exists.
pub(crate) fn requires_import(resource: &'static str, id: &str) -> ProviderError {
    ProviderError::ResourceExists {
        service: resource.to_string(),
        resource_id: id.to_string(),
        raw_message: Some(format!(
            "A resource with the ID \"{id}\" already exists - to be managed via this provider it needs to be imported into the state"
        )),
    }
}
