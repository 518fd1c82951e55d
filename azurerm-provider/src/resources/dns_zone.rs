//! `azurerm_dns_zone`

use async_trait::async_trait;

use super::{ConfigReader, found, invalid_id, requires_import};
use crate::clients::arm::{ArmClient, Conditions};
use crate::clients::dns::{Zone, ZoneUpdate, ZonesClient};
use crate::error::{ProviderError, Result};
use crate::ids::DnsZoneId;
use crate::traits::ResourceAdapter;
use crate::types::{
    AttributeSchema, AttributeType, InstanceState, ResourceConfig, ResourceMetadata,
};

const TYPE_NAME: &str = "azurerm_dns_zone";

/// Public DNS zone.
#[derive(Debug, Clone)]
pub struct DnsZoneResource {
    zones: ZonesClient,
    subscription_id: String,
}

impl DnsZoneResource {
    pub fn new(arm: ArmClient) -> Self {
        Self {
            subscription_id: arm.subscription_id().to_string(),
            zones: ZonesClient::new(arm),
        }
    }

    fn parse_id(id: &str) -> Result<DnsZoneId> {
        id.parse().map_err(|e| invalid_id(TYPE_NAME, &e))
    }
}

/// 将 Zone 展平为状态属性
fn flatten(id: &DnsZoneId, zone: &Zone) -> InstanceState {
    let mut state = InstanceState::new(id.to_string());
    state.set("name", &id.zone_name);
    state.set("resource_group_name", &id.resource_group);
    state.set_map("tags", &zone.tags.clone().unwrap_or_default());

    if let Some(props) = &zone.properties {
        state.set_opt("number_of_record_sets", props.number_of_record_sets);
        state.set_opt("max_number_of_record_sets", props.max_number_of_record_sets);
        state.set_opt(
            "max_number_of_records_per_record_set",
            props.max_number_of_records_per_record_set,
        );
        state.set_list(
            "name_servers",
            props.name_servers.as_deref().unwrap_or_default(),
        );
    }
    state
}

#[async_trait]
impl ResourceAdapter for DnsZoneResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn metadata() -> ResourceMetadata {
        ResourceMetadata {
            type_name: TYPE_NAME.to_string(),
            description: "Manages a public DNS zone.".to_string(),
            attributes: vec![
                AttributeSchema::required("name", AttributeType::String)
                    .force_new()
                    .help("Zone name, e.g. example.com"),
                AttributeSchema::required("resource_group_name", AttributeType::String)
                    .force_new(),
                AttributeSchema::optional("tags", AttributeType::Map),
                AttributeSchema::computed("number_of_record_sets", AttributeType::Int),
                AttributeSchema::computed("max_number_of_record_sets", AttributeType::Int),
                AttributeSchema::computed(
                    "max_number_of_records_per_record_set",
                    AttributeType::Int,
                ),
                AttributeSchema::computed("name_servers", AttributeType::List),
            ],
        }
    }

    async fn create(&self, config: &ResourceConfig) -> Result<InstanceState> {
        let reader = ConfigReader::new(TYPE_NAME, config);
        let name = reader.required_str("name")?;
        let resource_group = reader.required_str("resource_group_name")?;
        let tags = reader.tags("tags")?;
        let id = DnsZoneId::new(&self.subscription_id, resource_group, name);

        if found(self.zones.get(resource_group, name).await)?.is_some() {
            return Err(requires_import(TYPE_NAME, &id.to_string()));
        }

        log::info!("[{TYPE_NAME}] Creating {id}");
        let zone = self
            .zones
            .create_or_update(
                resource_group,
                name,
                &Zone::global(tags),
                Conditions::if_none_match("*"),
            )
            .await?;
        Ok(flatten(&id, &zone))
    }

    async fn read(&self, id: &str) -> Result<Option<InstanceState>> {
        let id = Self::parse_id(id)?;
        let zone = found(self.zones.get(&id.resource_group, &id.zone_name).await)?;
        if zone.is_none() {
            log::warn!("[{TYPE_NAME}] {id} was not found, removing from state");
        }
        Ok(zone.map(|zone| flatten(&id, &zone)))
    }

    async fn update(&self, id: &str, config: &ResourceConfig) -> Result<InstanceState> {
        let id = Self::parse_id(id)?;
        let reader = ConfigReader::new(TYPE_NAME, config);

        for (key, current) in [
            ("name", &id.zone_name),
            ("resource_group_name", &id.resource_group),
        ] {
            if let Some(wanted) = reader.optional_str(key)?
                && !wanted.eq_ignore_ascii_case(current)
            {
                return Err(ProviderError::InvalidParameter {
                    service: TYPE_NAME.to_string(),
                    param: key.to_string(),
                    detail: format!(
                        "changing '{current}' to '{wanted}' requires replacing the zone"
                    ),
                });
            }
        }

        let update = ZoneUpdate {
            tags: Some(reader.tags("tags")?.unwrap_or_default()),
        };
        let zone = self
            .zones
            .update(&id.resource_group, &id.zone_name, &update, None)
            .await?;
        Ok(flatten(&id, &zone))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = Self::parse_id(id)?;
        log::info!("[{TYPE_NAME}] Deleting {id}");
        match self
            .zones
            .delete(&id.resource_group, &id.zone_name, None)
            .await
        {
            Ok(operation) => found(operation.wait().await).map(|_| ()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err),
        }
    }
}
