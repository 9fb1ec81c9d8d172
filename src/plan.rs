//! Change-sets for the one-shot CLI commands.
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use tracing::{debug, info};

use crate::endpoint::{Changes, Endpoint, RecordType};
use crate::error::UnboundError;

/// Pair `--host` values with `--target` values by position.
pub fn host_mappings(
    hosts: &[String],
    targets: &[String],
) -> Result<BTreeMap<String, String>, UnboundError> {
    if hosts.len() != targets.len() {
        return Err(UnboundError::missing_input(format!(
            "the hosts and targets must have the same length ({} hosts, {} targets)",
            hosts.len(),
            targets.len()
        )));
    }
    Ok(hosts.iter().cloned().zip(targets.iter().cloned()).collect())
}

/// Hosts to delete, as a set. At least one is required.
pub fn host_set(hosts: &[String]) -> Result<BTreeSet<String>, UnboundError> {
    if hosts.is_empty() {
        return Err(UnboundError::missing_input("1 host or more is required"));
    }
    Ok(hosts.iter().cloned().collect())
}

/// Bring `existing` in line with `wanted` without touching anything else.
///
/// An existing address record already pointing at the wanted target is left
/// alone; one pointing elsewhere is deleted and recreated.
pub fn upsert_changes(existing: &[Endpoint], mut wanted: BTreeMap<String, String>) -> Changes {
    let mut changes = Changes::default();

    for record in existing.iter().filter(|r| r.record_type.is_address()) {
        let Some(target) = wanted.get(&record.dns_name) else {
            continue;
        };
        if record.targets.first() == Some(target) {
            wanted.remove(&record.dns_name);
        } else {
            changes.delete.push(record.clone());
        }
    }

    changes.create = wanted
        .into_iter()
        .map(|(host, target)| {
            let kind = record_type_for(&target);
            Endpoint::new(host, kind, target)
        })
        .collect();

    info!(
        creates = changes.create.len(),
        deletes = changes.delete.len(),
        "upsert plan created"
    );
    changes
}

/// Delete every existing override (records with a remote id) named in `hosts`.
pub fn delete_changes(existing: &[Endpoint], hosts: &BTreeSet<String>) -> Changes {
    let delete = existing
        .iter()
        .filter(|r| hosts.contains(&r.dns_name) && !r.set_identifier.is_empty())
        .inspect(|r| {
            debug!(dns_name = %r.dns_name, set_identifier = %r.set_identifier, "found existing record to delete")
        })
        .cloned()
        .collect();

    Changes {
        delete,
        ..Default::default()
    }
}

fn record_type_for(target: &str) -> RecordType {
    match target.parse::<IpAddr>() {
        Ok(IpAddr::V6(_)) => RecordType::Aaaa,
        _ => RecordType::A,
    }
}
