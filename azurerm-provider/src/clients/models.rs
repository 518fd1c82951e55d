//! ARM shapes shared by every service

use serde::{Deserialize, Serialize};

/// Reference to another ARM resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    /// Resource ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }
}

/// Error envelope returned by ARM (`{"error": {...}}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CloudErrorBody>,
}

/// Error details returned by ARM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudErrorBody {
    /// Programmatic error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Offending property, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<CloudErrorBody>,
}

/// `Azure-AsyncOperation` status document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OperationStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<CloudErrorBody>,
}

/// Just enough of a resource body to read its `provisioningState`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProvisioningProbe {
    #[serde(default)]
    pub properties: Option<ProvisioningProbeProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProvisioningProbeProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

impl ProvisioningProbe {
    pub fn state(&self) -> Option<&str> {
        self.properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
    }
}

/// Terminal classification of an ARM status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Succeeded,
    Failed,
    InProgress,
}

impl StatusKind {
    pub fn of(status: &str) -> Self {
        if status.eq_ignore_ascii_case("succeeded") {
            Self::Succeeded
        } else if ["failed", "canceled", "cancelled"]
            .iter()
            .any(|s| status.eq_ignore_ascii_case(s))
        {
            Self::Failed
        } else {
            Self::InProgress
        }
    }
}
