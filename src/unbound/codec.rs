//! Mapping between Unbound host overrides and desired-state endpoints.
//!
//! Unbound has no TXT records, so the ownership value of a name rides in the
//! description of its address override as `"<prefix> <base64(value)>"`.
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::{debug, warn};

use super::cache::OwnershipCache;
use crate::endpoint::{Endpoint, RecordType};
use crate::opnsense::types::HostOverride;

/// Marks a description as carrying an encoded ownership value.
pub const DESCRIPTION_PREFIX: &str = "Managed by K8s external-dns";

/// Prefix external-dns puts in front of the TXT name it pairs with an A record.
pub const ALIAS_PREFIX: &str = "a-";

pub const LABEL_DESCRIPTION: &str = "description";

/// Why a description could not be turned back into an ownership value.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("description does not start with {DESCRIPTION_PREFIX:?}")]
    MissingPrefix,
    #[error("invalid base64 ownership payload: {0}")]
    InvalidBase64(String),
}

/// `"<prefix> <base64(value)>"`. An empty value still gets the separating space.
pub fn frame_description(value: &str) -> String {
    format!("{} {}", DESCRIPTION_PREFIX, BASE64.encode(value.as_bytes()))
}

/// Inverse of [`frame_description`]. The prefix, including its single
/// separating space, must match exactly.
pub fn unframe_description(description: &str) -> Result<String, DescriptionError> {
    let payload = description
        .strip_prefix(DESCRIPTION_PREFIX)
        .and_then(|rest| rest.strip_prefix(' '))
        .ok_or(DescriptionError::MissingPrefix)?;

    let decoded = BASE64
        .decode(payload.trim())
        .map_err(|e| DescriptionError::InvalidBase64(e.to_string()))?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

/// Turn overrides read from Unbound into endpoints.
///
/// Each row yields its address record. A row whose description carries an
/// ownership value additionally yields two TXT records with that value: one
/// under the row's name, one under the alias-prefixed name.
pub fn decode(rows: &[HostOverride]) -> Vec<Endpoint> {
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let dns_name = row.dns_name();
        // "A (IPv4 address)" -> "A"
        let rr = row.rr.split(' ').next().unwrap_or_default();

        let mut record = Endpoint::new(dns_name.clone(), RecordType::from(rr), row.server.clone())
            .with_set_identifier(row.uuid.clone());
        if !row.description.is_empty() {
            record
                .labels
                .insert(LABEL_DESCRIPTION.to_string(), row.description.clone());
        }
        out.push(record);

        if row.description.is_empty() {
            continue;
        }
        match unframe_description(&row.description) {
            Ok(owner) => {
                out.push(Endpoint::new(dns_name.clone(), RecordType::Txt, owner.clone()));
                out.push(Endpoint::new(
                    format!("{ALIAS_PREFIX}{dns_name}"),
                    RecordType::Txt,
                    owner,
                ));
            }
            Err(DescriptionError::MissingPrefix) => {
                debug!(%dns_name, "description carries no ownership value");
            }
            Err(err) => {
                warn!(%dns_name, error = %err, "unable to decode ownership from description");
            }
        }
    }

    out
}

/// One override payload per target of `endpoint`, each stamped with the
/// ownership the cache currently holds for the name.
///
/// `host.example.com` splits into hostname `host` and domain `example.com`;
/// a name without a dot gets an empty domain.
pub fn encode(endpoint: &Endpoint, cache: &OwnershipCache) -> Vec<HostOverride> {
    let (hostname, domain) = endpoint
        .dns_name
        .split_once('.')
        .unwrap_or((endpoint.dns_name.as_str(), ""));
    let description = cache.describe(&endpoint.dns_name);

    endpoint
        .targets
        .iter()
        .map(|target| HostOverride {
            uuid: String::new(),
            hostname: hostname.to_string(),
            domain: domain.to_string(),
            rr: endpoint.record_type.to_string(),
            server: target.clone(),
            enabled: "1".to_string(),
            description: description.clone(),
        })
        .collect()
}
