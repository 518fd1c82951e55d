//! DNS zone operations

use reqwest::Method;

use super::{API_VERSION, SERVICE, Zone, ZoneUpdate, top_query};
use crate::clients::arm::{ArmClient, Conditions};
use crate::error::Result;
use crate::ids::DnsZoneId;
use crate::lro::{LongRunningOperation, OperationMethod};
use crate::pager::Pager;
use crate::traits::{ErrorContext, ProviderErrorMapper};

/// Client for `Microsoft.Network/dnsZones`.
#[derive(Debug, Clone)]
pub struct ZonesClient {
    arm: ArmClient,
}

impl ProviderErrorMapper for ZonesClient {
    fn service_name(&self) -> &'static str {
        SERVICE
    }
}

impl ZonesClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    fn zone_url(&self, resource_group: &str, zone_name: &str) -> String {
        let id = DnsZoneId::new(
            self.arm.subscription_id(),
            urlencoding::encode(resource_group),
            urlencoding::encode(zone_name),
        );
        self.arm.url(&id.to_string(), API_VERSION, &[])
    }

    fn validate(&self, resource_group: &str, zone_name: &str) -> Result<()> {
        if resource_group.trim().is_empty() {
            return Err(self.invalid_parameter("resource_group", "must not be empty"));
        }
        if zone_name.trim().is_empty() {
            return Err(self.invalid_parameter("zone_name", "must not be empty"));
        }
        Ok(())
    }

    /// Creates or replaces a zone. Record sets are not affected.
    ///
    /// `if_match` guards against concurrent changes (ETag of the last-seen
    /// version); `if_none_match = "*"` refuses to overwrite an existing zone.
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        zone_name: &str,
        zone: &Zone,
        conditions: Conditions<'_>,
    ) -> Result<Zone> {
        self.validate(resource_group, zone_name)?;
        let url = self.zone_url(resource_group, zone_name);
        self.arm
            .send_json(
                SERVICE,
                Method::PUT,
                &url,
                Some(zone),
                conditions,
                ErrorContext::resource(zone_name),
            )
            .await
    }

    /// Updates the tags of a zone.
    pub async fn update(
        &self,
        resource_group: &str,
        zone_name: &str,
        update: &ZoneUpdate,
        if_match: Option<&str>,
    ) -> Result<Zone> {
        self.validate(resource_group, zone_name)?;
        let url = self.zone_url(resource_group, zone_name);
        self.arm
            .send_json(
                SERVICE,
                Method::PATCH,
                &url,
                Some(update),
                Conditions {
                    if_match,
                    if_none_match: None,
                },
                ErrorContext::resource(zone_name),
            )
            .await
    }

    /// Deletes a zone and all of its record sets. Cannot be undone.
    pub async fn delete(
        &self,
        resource_group: &str,
        zone_name: &str,
        if_match: Option<&str>,
    ) -> Result<LongRunningOperation<()>> {
        self.validate(resource_group, zone_name)?;
        let url = self.zone_url(resource_group, zone_name);
        self.arm
            .begin::<(), ()>(
                SERVICE,
                "zones.delete",
                OperationMethod::Delete,
                &url,
                None,
                Conditions {
                    if_match,
                    if_none_match: None,
                },
                ErrorContext::resource(zone_name),
            )
            .await
    }

    /// Gets a zone. Record sets are not included.
    pub async fn get(&self, resource_group: &str, zone_name: &str) -> Result<Zone> {
        self.validate(resource_group, zone_name)?;
        let url = self.zone_url(resource_group, zone_name);
        self.arm
            .get_json(SERVICE, &url, ErrorContext::resource(zone_name))
            .await
    }

    /// Lists the zones of a resource group.
    pub async fn list_by_resource_group(
        &self,
        resource_group: &str,
        top: Option<u32>,
    ) -> Result<Pager<Zone>> {
        if resource_group.trim().is_empty() {
            return Err(self.invalid_parameter("resource_group", "must not be empty"));
        }
        let path = format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones",
            self.arm.subscription_id(),
            urlencoding::encode(resource_group)
        );
        let url = self.arm.url(&path, API_VERSION, &top_query(top));
        self.arm
            .pager(SERVICE, &url, ErrorContext::resource(resource_group))
            .await
    }

    /// Lists the zones of the subscription.
    pub async fn list(&self, top: Option<u32>) -> Result<Pager<Zone>> {
        let path = format!(
            "/subscriptions/{}/providers/Microsoft.Network/dnszones",
            self.arm.subscription_id()
        );
        let url = self.arm.url(&path, API_VERSION, &top_query(top));
        self.arm
            .pager(SERVICE, &url, ErrorContext::resource(self.arm.subscription_id()))
            .await
    }
}
