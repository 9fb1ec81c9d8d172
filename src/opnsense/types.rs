use serde::{Deserialize, Serialize};

use crate::endpoint::null_as_default;

/// One Unbound host override row, exactly as the OPNsense API stores it.
///
/// Field names are matched case-insensitively by the API's own clients, so
/// the capitalised spellings are accepted on input too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostOverride {
    #[serde(default, alias = "Uuid", alias = "UUID", skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default, alias = "Hostname")]
    pub hostname: String,
    #[serde(default, alias = "Domain")]
    pub domain: String,
    /// e.g. "A (IPv4 address)"; only the first token is the record type.
    #[serde(default, alias = "Rr", skip_serializing_if = "String::is_empty")]
    pub rr: String,
    #[serde(default, alias = "Server")]
    pub server: String,
    #[serde(default, alias = "Enabled")]
    pub enabled: String, // "1" / "0"
    #[serde(default, alias = "Description")]
    pub description: String,
}

impl HostOverride {
    pub fn dns_name(&self) -> String {
        format!("{}.{}", self.hostname, self.domain)
    }
}

// GET searchHostOverride
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchHostResponse {
    #[serde(default, alias = "Rows", deserialize_with = "null_as_default")]
    pub rows: Vec<HostOverride>,
}

// POST addHostOverride
#[derive(Debug, Serialize, Deserialize)]
pub struct AddOverrideRequest {
    pub host: HostOverride,
}

/// `{"result": "..."}` returned by every write endpoint.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OperationResponse {
    #[serde(default, alias = "Result")]
    pub result: String,
}
