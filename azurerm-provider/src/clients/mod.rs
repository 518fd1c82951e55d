//! Azure Resource Manager clients

pub mod arm;
pub(crate) mod error;
pub mod models;
pub(crate) mod operation;
#[cfg(test)]
pub(crate) mod test_server;

#[cfg(feature = "dns")]
pub mod dns;
#[cfg(feature = "subscription")]
pub mod subscription;

pub use arm::{ArmClient, ArmClientBuilder, Conditions};
pub use models::{CloudError, CloudErrorBody, SubResource};
