//! ARM resource IDs
//!
//! Parsing and formatting of the IDs the resource adapters store as state.
//! Segment keys (`resourceGroups`, `providers`, `dnsZones`, ...) are compared
//! case-insensitively since ARM returns them in varying case
//! (`dnszones` vs `dnsZones`).

use std::fmt;
use std::str::FromStr;

/// Error parsing a resource ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceIdError {
    #[error("resource ID is empty")]
    Empty,
    #[error("resource ID '{id}' must start with '/'")]
    NotAbsolute { id: String },
    #[error("resource ID '{id}' is not a {kind} ID: expected segment '{expected}'")]
    UnexpectedSegment {
        id: String,
        kind: &'static str,
        expected: &'static str,
    },
    #[error("resource ID '{id}' has an empty value for '{segment}'")]
    EmptyValue { id: String, segment: &'static str },
}

/// Matches `id` against `(name, captures)` pairs: fixed keys compare by name,
/// captured segments are returned in order.
fn parse_segments(
    id: &str,
    kind: &'static str,
    pattern: &[(&'static str, bool)],
) -> Result<Vec<String>, ResourceIdError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ResourceIdError::Empty);
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Err(ResourceIdError::NotAbsolute { id: id.to_string() });
    };

    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    let mut values = Vec::new();
    let mut iter = segments.iter();

    for &(name, captures) in pattern {
        let Some(segment) = iter.next() else {
            return Err(ResourceIdError::UnexpectedSegment {
                id: id.to_string(),
                kind,
                expected: name,
            });
        };
        if captures {
            if segment.is_empty() {
                return Err(ResourceIdError::EmptyValue {
                    id: id.to_string(),
                    segment: name,
                });
            }
            values.push((*segment).to_string());
        } else if !segment.eq_ignore_ascii_case(name) {
            return Err(ResourceIdError::UnexpectedSegment {
                id: id.to_string(),
                kind,
                expected: name,
            });
        }
    }

    if let Some(extra) = iter.next() {
        log::debug!("Trailing segment '{extra}' in {kind} ID '{id}'");
        return Err(ResourceIdError::UnexpectedSegment {
            id: id.to_string(),
            kind,
            expected: "end of ID",
        });
    }

    Ok(values)
}

/// `/subscriptions/{subscription}/resourceGroups/{group}/providers/Microsoft.Network/dnsZones/{zone}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsZoneId {
    pub subscription_id: String,
    pub resource_group: String,
    pub zone_name: String,
}

impl DnsZoneId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        zone_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            zone_name: zone_name.into(),
        }
    }
}

impl fmt::Display for DnsZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones/{}",
            self.subscription_id, self.resource_group, self.zone_name
        )
    }
}

impl FromStr for DnsZoneId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_segments(
            s,
            "DNS zone",
            &[
                ("subscriptions", false),
                ("subscriptionId", true),
                ("resourceGroups", false),
                ("resourceGroupName", true),
                ("providers", false),
                ("Microsoft.Network", false),
                ("dnsZones", false),
                ("zoneName", true),
            ],
        )?;
        let [subscription_id, resource_group, zone_name]: [String; 3] =
            values.try_into().map_err(|_| ResourceIdError::Empty)?;
        Ok(Self {
            subscription_id,
            resource_group,
            zone_name,
        })
    }
}

/// `/providers/Microsoft.Subscription/aliases/{alias}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionAliasId {
    pub alias: String,
}

impl SubscriptionAliasId {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }
}

impl fmt::Display for SubscriptionAliasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/providers/Microsoft.Subscription/aliases/{}", self.alias)
    }
}

impl FromStr for SubscriptionAliasId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = parse_segments(
            s,
            "subscription alias",
            &[
                ("providers", false),
                ("Microsoft.Subscription", false),
                ("aliases", false),
                ("aliasName", true),
            ],
        )?;
        let alias = values.pop().ok_or(ResourceIdError::Empty)?;
        Ok(Self { alias })
    }
}

/// `/subscriptions/{subscription}/providers/Microsoft.Resources/tags/default`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionTagsId {
    pub subscription_id: String,
}

impl SubscriptionTagsId {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
        }
    }

    /// The scope the tags are attached to (`/subscriptions/{id}`).
    pub fn scope(&self) -> String {
        format!("/subscriptions/{}", self.subscription_id)
    }
}

impl fmt::Display for SubscriptionTagsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/providers/Microsoft.Resources/tags/default",
            self.subscription_id
        )
    }
}

impl FromStr for SubscriptionTagsId {
    type Err = ResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut values = parse_segments(
            s,
            "subscription tags",
            &[
                ("subscriptions", false),
                ("subscriptionId", true),
                ("providers", false),
                ("Microsoft.Resources", false),
                ("tags", false),
                ("default", false),
            ],
        )?;
        let subscription_id = values.pop().ok_or(ResourceIdError::Empty)?;
        Ok(Self { subscription_id })
    }
}
