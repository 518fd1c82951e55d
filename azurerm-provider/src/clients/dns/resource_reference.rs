//! DNS resource reference lookup

use reqwest::Method;

use super::{API_VERSION, ResourceReferenceRequest, ResourceReferenceResult, SERVICE};
use crate::clients::arm::{ArmClient, Conditions};
use crate::error::Result;
use crate::traits::{ErrorContext, ProviderErrorMapper};

/// Finds the DNS record sets that point at given Azure resources.
#[derive(Debug, Clone)]
pub struct ResourceReferenceClient {
    arm: ArmClient,
}

impl ProviderErrorMapper for ResourceReferenceClient {
    fn service_name(&self) -> &'static str {
        SERVICE
    }
}

impl ResourceReferenceClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    /// Returns the DNS resource references of each target resource.
    pub async fn get_by_target_resources(
        &self,
        request: &ResourceReferenceRequest,
    ) -> Result<ResourceReferenceResult> {
        let has_targets = request
            .properties
            .as_ref()
            .and_then(|p| p.target_resources.as_ref())
            .is_some_and(|t| !t.is_empty());
        if !has_targets {
            return Err(self.invalid_parameter(
                "target_resources",
                "at least one target resource is required",
            ));
        }

        let path = format!(
            "/subscriptions/{}/providers/Microsoft.Network/getDnsResourceReference",
            self.arm.subscription_id()
        );
        let url = self.arm.url(&path, API_VERSION, &[]);
        self.arm
            .send_json(
                SERVICE,
                Method::POST,
                &url,
                Some(request),
                Conditions::NONE,
                ErrorContext::default(),
            )
            .await
    }
}
