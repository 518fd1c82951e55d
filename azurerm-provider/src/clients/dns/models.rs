//! Azure DNS 2018-05-01 data model
//!
//! Field presence follows the wire format: every optional field is an
//! `Option` omitted from the encoding when `None`, and read-only fields are
//! decoded but never sent back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clients::models::SubResource;
use crate::error::{ProviderError, Result};
use crate::types::Tags;

// ============ Record Types ============

/// DNS record type, in the form used as a URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Srv,
    Txt,
}

impl RecordType {
    pub const ALL: [Self; 10] = [
        Self::A,
        Self::Aaaa,
        Self::Caa,
        Self::Cname,
        Self::Mx,
        Self::Ns,
        Self::Ptr,
        Self::Soa,
        Self::Srv,
        Self::Txt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Caa => "CAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Ptr => "PTR",
            Self::Soa => "SOA",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ProviderError;

    /// Accepts the bare type (`"cname"`) or an ARM resource type
    /// (`"Microsoft.Network/dnszones/CNAME"`).
    fn from_str(s: &str) -> Result<Self> {
        let name = s.rsplit('/').next().unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ProviderError::InvalidParameter {
                service: "dns".to_string(),
                param: "record_type".to_string(),
                detail: format!("unsupported record type '{s}'"),
            })
    }
}

// ============ Record Shapes ============

/// An A record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ARecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
}

/// An AAAA record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaaaRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
}

/// A CAA record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaaRecord {
    /// Flags (0-255).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<i32>,
    /// Property tag (`issue`, `issuewild`, `iodef`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A CNAME record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnameRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
}

/// An MX record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<i32>,
    /// Domain name of the mail host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
}

/// An NS record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsdname: Option<String>,
}

/// A PTR record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtrRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptrdname: Option<String>,
}

/// An SOA record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoaRecord {
    /// Authoritative name server (read-only on updates).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
    #[serde(rename = "minimumTTL", skip_serializing_if = "Option::is_none")]
    pub minimum_ttl: Option<i64>,
}

/// An SRV record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrvRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// A TXT record. Long values are split into strings of at most 255 bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<String>>,
}

/// One record of any type, as projected by [`RecordSetProperties::records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(ARecord),
    Aaaa(AaaaRecord),
    Caa(CaaRecord),
    Cname(CnameRecord),
    Mx(MxRecord),
    Ns(NsRecord),
    Ptr(PtrRecord),
    Soa(SoaRecord),
    Srv(SrvRecord),
    Txt(TxtRecord),
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::Aaaa(_) => RecordType::Aaaa,
            Self::Caa(_) => RecordType::Caa,
            Self::Cname(_) => RecordType::Cname,
            Self::Mx(_) => RecordType::Mx,
            Self::Ns(_) => RecordType::Ns,
            Self::Ptr(_) => RecordType::Ptr,
            Self::Soa(_) => RecordType::Soa,
            Self::Srv(_) => RecordType::Srv,
            Self::Txt(_) => RecordType::Txt,
        }
    }
}

// ============ Record Sets ============

/// Properties of a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Tags>,
    /// Time-to-live in seconds.
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    /// Fully qualified domain name (read-only).
    #[serde(default, skip_serializing)]
    pub fqdn: Option<String>,
    /// Provisioning state (read-only).
    #[serde(rename = "provisioningState", default, skip_serializing)]
    pub provisioning_state: Option<String>,
    /// Azure resource this alias record set points to.
    #[serde(rename = "targetResource", skip_serializing_if = "Option::is_none")]
    pub target_resource: Option<SubResource>,
    #[serde(rename = "ARecords", skip_serializing_if = "Option::is_none")]
    pub a_records: Option<Vec<ARecord>>,
    #[serde(rename = "AAAARecords", skip_serializing_if = "Option::is_none")]
    pub aaaa_records: Option<Vec<AaaaRecord>>,
    #[serde(rename = "MXRecords", skip_serializing_if = "Option::is_none")]
    pub mx_records: Option<Vec<MxRecord>>,
    #[serde(rename = "NSRecords", skip_serializing_if = "Option::is_none")]
    pub ns_records: Option<Vec<NsRecord>>,
    #[serde(rename = "PTRRecords", skip_serializing_if = "Option::is_none")]
    pub ptr_records: Option<Vec<PtrRecord>>,
    #[serde(rename = "SRVRecords", skip_serializing_if = "Option::is_none")]
    pub srv_records: Option<Vec<SrvRecord>>,
    #[serde(rename = "TXTRecords", skip_serializing_if = "Option::is_none")]
    pub txt_records: Option<Vec<TxtRecord>>,
    #[serde(rename = "CNAMERecord", skip_serializing_if = "Option::is_none")]
    pub cname_record: Option<CnameRecord>,
    #[serde(rename = "SOARecord", skip_serializing_if = "Option::is_none")]
    pub soa_record: Option<SoaRecord>,
    #[serde(rename = "caaRecords", skip_serializing_if = "Option::is_none")]
    pub caa_records: Option<Vec<CaaRecord>>,
}

fn push_all<R: Clone>(
    out: &mut Vec<RecordData>,
    records: Option<&Vec<R>>,
    wrap: fn(R) -> RecordData,
) {
    out.extend(records.into_iter().flatten().cloned().map(wrap));
}

impl RecordSetProperties {
    /// Flattens every record collection into one list, in record-type order.
    pub fn records(&self) -> Vec<RecordData> {
        let mut out = Vec::new();
        push_all(&mut out, self.a_records.as_ref(), RecordData::A);
        push_all(&mut out, self.aaaa_records.as_ref(), RecordData::Aaaa);
        push_all(&mut out, self.caa_records.as_ref(), RecordData::Caa);
        out.extend(self.cname_record.clone().map(RecordData::Cname));
        push_all(&mut out, self.mx_records.as_ref(), RecordData::Mx);
        push_all(&mut out, self.ns_records.as_ref(), RecordData::Ns);
        push_all(&mut out, self.ptr_records.as_ref(), RecordData::Ptr);
        out.extend(self.soa_record.clone().map(RecordData::Soa));
        push_all(&mut out, self.srv_records.as_ref(), RecordData::Srv);
        push_all(&mut out, self.txt_records.as_ref(), RecordData::Txt);
        out
    }

    /// Builds properties from a list of records.
    ///
    /// Only the collections that receive records are set. CNAME and SOA hold a
    /// single record; supplying more than one of either is rejected.
    pub fn from_records(ttl: Option<i64>, records: Vec<RecordData>) -> Result<Self> {
        let mut props = Self {
            ttl,
            ..Self::default()
        };

        for record in records {
            match record {
                RecordData::A(r) => props.a_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Aaaa(r) => props.aaaa_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Caa(r) => props.caa_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Mx(r) => props.mx_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Ns(r) => props.ns_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Ptr(r) => props.ptr_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Srv(r) => props.srv_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Txt(r) => props.txt_records.get_or_insert_with(Vec::new).push(r),
                RecordData::Cname(r) => {
                    if props.cname_record.replace(r).is_some() {
                        return Err(single_record_error(RecordType::Cname));
                    }
                }
                RecordData::Soa(r) => {
                    if props.soa_record.replace(r).is_some() {
                        return Err(single_record_error(RecordType::Soa));
                    }
                }
            }
        }
        Ok(props)
    }
}

fn single_record_error(record_type: RecordType) -> ProviderError {
    ProviderError::InvalidParameter {
        service: "dns".to_string(),
        param: "records".to_string(),
        detail: format!("a {record_type} record set holds exactly one record"),
    }
}

/// A DNS record set (records of one type sharing a relative name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    /// Relative name, `@` for the zone apex (read-only).
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    /// ARM resource type, e.g. `Microsoft.Network/dnszones/A` (read-only).
    #[serde(rename = "type", default, skip_serializing)]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<RecordSetProperties>,
}

impl RecordSet {
    pub fn new(properties: RecordSetProperties) -> Self {
        Self {
            properties: Some(properties),
            ..Self::default()
        }
    }

    /// Record type parsed from the ARM resource type.
    pub fn record_type(&self) -> Option<RecordType> {
        self.resource_type.as_deref()?.parse().ok()
    }
}

/// Parameters supplied to update a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSetUpdateParameters {
    #[serde(rename = "RecordSet", skip_serializing_if = "Option::is_none")]
    pub record_set: Option<RecordSet>,
}

// ============ Zones ============

/// Zone visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneType {
    #[default]
    Public,
    Private,
}

/// Properties of a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProperties {
    /// Quota of record sets (read-only).
    #[serde(default, skip_serializing)]
    pub max_number_of_record_sets: Option<i64>,
    /// Quota of records per record set (read-only).
    #[serde(default, skip_serializing)]
    pub max_number_of_records_per_record_set: Option<i64>,
    /// Current number of record sets (read-only).
    #[serde(default, skip_serializing)]
    pub number_of_record_sets: Option<i64>,
    /// Name servers assigned to the zone (read-only).
    #[serde(default, skip_serializing)]
    pub name_servers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<ZoneType>,
    /// Virtual networks registering hostnames (private zones only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_virtual_networks: Option<Vec<SubResource>>,
    /// Virtual networks resolving records (private zones only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_virtual_networks: Option<Vec<SubResource>>,
}

/// A DNS zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing)]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Always `global` for DNS zones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ZoneProperties>,
}

impl Zone {
    /// A public zone in the `global` location.
    pub fn global(tags: Option<Tags>) -> Self {
        Self {
            location: Some("global".to_string()),
            tags,
            properties: Some(ZoneProperties {
                zone_type: Some(ZoneType::Public),
                ..ZoneProperties::default()
            }),
            ..Self::default()
        }
    }
}

/// A request to update a zone. Only tags can be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

// ============ Resource References ============

/// Request for the DNS records that point at a set of Azure resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReferenceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceReferenceRequestProperties>,
}

impl ResourceReferenceRequest {
    pub fn for_targets(targets: Vec<SubResource>) -> Self {
        Self {
            properties: Some(ResourceReferenceRequestProperties {
                target_resources: Some(targets),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReferenceRequestProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_resources: Option<Vec<SubResource>>,
}

/// DNS resources referencing one target resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_resources: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_resource: Option<SubResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReferenceResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceReferenceResultProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReferenceResultProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_resource_references: Option<Vec<ResourceReference>>,
}
