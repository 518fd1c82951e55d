//! DNS record set operations

use reqwest::Method;

use super::{API_VERSION, RecordSet, RecordType, SERVICE};
use crate::clients::arm::{ArmClient, Conditions};
use crate::error::Result;
use crate::ids::DnsZoneId;
use crate::pager::Pager;
use crate::traits::{ErrorContext, ProviderErrorMapper};

/// Query options shared by the record set list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSetListOptions {
    /// Maximum number of record sets per page (`$top`).
    pub top: Option<u32>,
    /// Only return record sets ending with `.<suffix>` (`$recordsetnamesuffix`).
    pub record_set_name_suffix: Option<String>,
}

impl RecordSetListOptions {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(top) = self.top {
            query.push(("$top", top.to_string()));
        }
        if let Some(suffix) = self.record_set_name_suffix.as_deref().filter(|s| !s.is_empty()) {
            query.push(("$recordsetnamesuffix", suffix.to_string()));
        }
        query
    }
}

/// Client for record sets within a DNS zone.
#[derive(Debug, Clone)]
pub struct RecordSetsClient {
    arm: ArmClient,
}

impl ProviderErrorMapper for RecordSetsClient {
    fn service_name(&self) -> &'static str {
        SERVICE
    }
}

impl RecordSetsClient {
    pub fn new(arm: ArmClient) -> Self {
        Self { arm }
    }

    fn zone_path(&self, resource_group: &str, zone_name: &str) -> String {
        DnsZoneId::new(
            self.arm.subscription_id(),
            urlencoding::encode(resource_group),
            urlencoding::encode(zone_name),
        )
        .to_string()
    }

    fn record_set_url(
        &self,
        resource_group: &str,
        zone_name: &str,
        relative_name: &str,
        record_type: RecordType,
    ) -> String {
        let path = format!(
            "{}/{record_type}/{}",
            self.zone_path(resource_group, zone_name),
            urlencoding::encode(relative_name)
        );
        self.arm.url(&path, API_VERSION, &[])
    }

    fn validate(
        &self,
        resource_group: &str,
        zone_name: &str,
        relative_name: Option<&str>,
    ) -> Result<()> {
        if resource_group.trim().is_empty() {
            return Err(self.invalid_parameter("resource_group", "must not be empty"));
        }
        if zone_name.trim().is_empty() {
            return Err(self.invalid_parameter("zone_name", "must not be empty"));
        }
        if relative_name.is_some_and(|n| n.trim().is_empty()) {
            return Err(self.invalid_parameter(
                "relative_record_set_name",
                "must not be empty (use '@' for the zone apex)",
            ));
        }
        Ok(())
    }

    /// Creates or replaces a record set.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_or_update(
        &self,
        resource_group: &str,
        zone_name: &str,
        relative_name: &str,
        record_type: RecordType,
        record_set: &RecordSet,
        conditions: Conditions<'_>,
    ) -> Result<RecordSet> {
        self.validate(resource_group, zone_name, Some(relative_name))?;
        let url = self.record_set_url(resource_group, zone_name, relative_name, record_type);
        self.arm
            .send_json(
                SERVICE,
                Method::PUT,
                &url,
                Some(record_set),
                conditions,
                ErrorContext::resource(format!("{zone_name}/{record_type}/{relative_name}")),
            )
            .await
    }

    /// Patches a record set; omitted properties are left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        resource_group: &str,
        zone_name: &str,
        relative_name: &str,
        record_type: RecordType,
        record_set: &RecordSet,
        if_match: Option<&str>,
    ) -> Result<RecordSet> {
        self.validate(resource_group, zone_name, Some(relative_name))?;
        let url = self.record_set_url(resource_group, zone_name, relative_name, record_type);
        self.arm
            .send_json(
                SERVICE,
                Method::PATCH,
                &url,
                Some(record_set),
                Conditions {
                    if_match,
                    if_none_match: None,
                },
                ErrorContext::resource(format!("{zone_name}/{record_type}/{relative_name}")),
            )
            .await
    }

    /// Deletes a record set. SOA and apex NS record sets cannot be deleted.
    pub async fn delete(
        &self,
        resource_group: &str,
        zone_name: &str,
        relative_name: &str,
        record_type: RecordType,
        if_match: Option<&str>,
    ) -> Result<()> {
        self.validate(resource_group, zone_name, Some(relative_name))?;
        let apex = relative_name == "@";
        if record_type == RecordType::Soa || (record_type == RecordType::Ns && apex) {
            return Err(self.invalid_parameter(
                "record_type",
                format!("the {record_type} record set at the zone apex is managed by Azure DNS"),
            ));
        }
        let url = self.record_set_url(resource_group, zone_name, relative_name, record_type);
        let response = self
            .arm
            .send(
                SERVICE,
                Method::DELETE,
                &url,
                None,
                Conditions {
                    if_match,
                    if_none_match: None,
                },
            )
            .await?;
        ArmClient::check(
            SERVICE,
            response,
            ErrorContext::resource(format!("{zone_name}/{record_type}/{relative_name}")),
        )?;
        Ok(())
    }

    /// Gets a record set.
    pub async fn get(
        &self,
        resource_group: &str,
        zone_name: &str,
        relative_name: &str,
        record_type: RecordType,
    ) -> Result<RecordSet> {
        self.validate(resource_group, zone_name, Some(relative_name))?;
        let url = self.record_set_url(resource_group, zone_name, relative_name, record_type);
        self.arm
            .get_json(
                SERVICE,
                &url,
                ErrorContext::resource(format!("{zone_name}/{record_type}/{relative_name}")),
            )
            .await
    }

    /// Lists the record sets of one type in a zone.
    pub async fn list_by_type(
        &self,
        resource_group: &str,
        zone_name: &str,
        record_type: RecordType,
        options: &RecordSetListOptions,
    ) -> Result<Pager<RecordSet>> {
        self.validate(resource_group, zone_name, None)?;
        let path = format!("{}/{record_type}", self.zone_path(resource_group, zone_name));
        self.list(&path, zone_name, options).await
    }

    /// Lists all record sets in a zone.
    pub async fn list_by_dns_zone(
        &self,
        resource_group: &str,
        zone_name: &str,
        options: &RecordSetListOptions,
    ) -> Result<Pager<RecordSet>> {
        self.validate(resource_group, zone_name, None)?;
        let path = format!("{}/recordsets", self.zone_path(resource_group, zone_name));
        self.list(&path, zone_name, options).await
    }

    /// Lists all record sets in a zone, including alias record sets.
    pub async fn list_all_by_dns_zone(
        &self,
        resource_group: &str,
        zone_name: &str,
        options: &RecordSetListOptions,
    ) -> Result<Pager<RecordSet>> {
        self.validate(resource_group, zone_name, None)?;
        let path = format!("{}/all", self.zone_path(resource_group, zone_name));
        self.list(&path, zone_name, options).await
    }

    async fn list(
        &self,
        path: &str,
        zone_name: &str,
        options: &RecordSetListOptions,
    ) -> Result<Pager<RecordSet>> {
        let url = self.arm.url(path, API_VERSION, &options.query());
        self.arm
            .pager(SERVICE, &url, ErrorContext::resource(zone_name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticTokenCredential;
    use crate::error::ProviderError;
    use std::sync::Arc;

    fn record_sets() -> Option<RecordSetsClient> {
        ArmClient::builder("sub-1")
            .credential(Arc::new(StaticTokenCredential::new("token")))
            .build()
            .ok()
            .map(RecordSetsClient::new)
    }

    #[test]
    fn record_set_url_encodes_apex_name() {
        let Some(client) = record_sets() else { return };
        assert_eq!(
            client.record_set_url("rg", "example.com", "@", RecordType::Txt),
            "https://management.azure.com/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Network/dnsZones/example.com/TXT/%40?api-version=2018-05-01"
        );
    }

    #[test]
    fn list_options_query() {
        let options = RecordSetListOptions {
            top: Some(50),
            record_set_name_suffix: Some("internal".to_string()),
        };
        assert_eq!(
            options.query(),
            vec![
                ("$top", "50".to_string()),
                ("$recordsetnamesuffix", "internal".to_string())
            ]
        );
        assert!(RecordSetListOptions::default().query().is_empty());
    }

    #[tokio::test]
    async fn apex_soa_and_ns_cannot_be_deleted() {
        let Some(client) = record_sets() else { return };
        let result = client
            .delete("rg", "example.com", "@", RecordType::Soa, None)
            .await;
        assert!(matches!(
            result,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "record_type"
        ));

        let result = client
            .delete("rg", "example.com", "@", RecordType::Ns, None)
            .await;
        assert!(matches!(result, Err(ProviderError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn empty_relative_name_is_rejected() {
        let Some(client) = record_sets() else { return };
        let result = client.get("rg", "example.com", "", RecordType::A).await;
        assert!(matches!(
            result,
            Err(ProviderError::InvalidParameter { ref param, .. }) if param == "relative_record_set_name"
        ));
    }
}
