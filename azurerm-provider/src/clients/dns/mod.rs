//! Azure DNS management (`Microsoft.Network/dnsZones`, api-version 2018-05-01)

pub mod models;
mod record_sets;
mod resource_reference;
mod zones;

pub use models::*;
pub use record_sets::{RecordSetListOptions, RecordSetsClient};
pub use resource_reference::ResourceReferenceClient;
pub use zones::ZonesClient;

pub(crate) const SERVICE: &str = "dns";
pub(crate) const API_VERSION: &str = "2018-05-01";

/// `$top` query parameter, when set.
fn top_query(top: Option<u32>) -> Vec<(&'static str, String)> {
    top.map(|n| vec![("$top", n.to_string())]).unwrap_or_default()
}
