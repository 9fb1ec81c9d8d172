//! Best-effort projection of ownership (TXT) values per DNS name.
use std::collections::HashMap;

use tracing::debug;

use super::codec::{ALIAS_PREFIX, frame_description};
use crate::endpoint::{Changes, Endpoint, RecordType};

/// Ownership strings keyed by fully qualified name, pre-encoding.
///
/// Never authoritative: rebuilt wholesale on every read and merged after
/// every apply.
#[derive(Debug, Default, Clone)]
pub struct OwnershipCache {
    owners: HashMap<String, String>,
}

impl OwnershipCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with what a fresh read says.
    pub fn rebuild_from_read(&mut self, read: &[Endpoint]) {
        self.owners = extract(read);
        debug!(entries = self.owners.len(), "ownership cache rebuilt from read");
    }

    /// Forget deleted address records, then merge ownership from creates and updates.
    ///
    /// Replaced (`update_old`) records are not forgotten: their new values
    /// arrive through `update_new`.
    pub fn apply_change_set(&mut self, changes: &Changes) {
        for deleted in changes.delete.iter().filter(|e| e.record_type.is_address()) {
            self.owners.remove(&deleted.dns_name);
        }

        let incoming: Vec<Endpoint> = changes.additions().cloned().collect();
        let merged = extract(&incoming);
        debug!(?merged, "updating ownership cache");
        self.owners.extend(merged);
        debug!(cache = ?self.owners, "current ownership cache");
    }

    pub fn get(&self, dns_name: &str) -> Option<&str> {
        self.owners.get(dns_name).map(String::as_str)
    }

    /// Framed, base64 encoded ownership string for an outgoing override
    /// description. Names without an entry get the framed empty value.
    pub fn describe(&self, dns_name: &str) -> String {
        frame_description(self.get(dns_name).unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

// A TXT name starting with the alias prefix is either a real name or the
// alias external-dns generated for its sibling. The two cannot be told
// apart, so the value is stored under both the name and the stripped name.
// A real name that happens to start with "a-" can therefore lend its
// ownership to the name without the prefix.
fn extract(records: &[Endpoint]) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for record in records.iter().filter(|r| r.record_type == RecordType::Txt) {
        let value = record.targets_string();
        if let Some(stripped) = record.dns_name.strip_prefix(ALIAS_PREFIX) {
            out.insert(stripped.to_string(), value.clone());
        }
        out.insert(record.dns_name.clone(), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unbound::codec::DESCRIPTION_PREFIX;

    const HERITAGE: &str = "heritage=external-dns,external-dns/owner=default";

    fn txt(name: &str, value: &str) -> Endpoint {
        Endpoint::new(name, RecordType::Txt, value)
    }

    fn a(name: &str, target: &str) -> Endpoint {
        Endpoint::new(name, RecordType::A, target)
    }

    #[test]
    fn rebuild_keeps_only_txt_and_writes_alias_twice() {
        let mut cache = OwnershipCache::new();
        cache.rebuild_from_read(&[
            a("foo.example.com", "10.0.0.1"),
            txt("foo.example.com", HERITAGE),
            txt("a-bar.example.com", "owner=bar"),
        ]);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("foo.example.com"), Some(HERITAGE));
        assert_eq!(cache.get("a-bar.example.com"), Some("owner=bar"));
        assert_eq!(cache.get("bar.example.com"), Some("owner=bar"));
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let mut cache = OwnershipCache::new();
        cache.rebuild_from_read(&[txt("old.example.com", "x")]);
        cache.rebuild_from_read(&[txt("new.example.com", "y")]);

        assert_eq!(cache.get("old.example.com"), None);
        assert_eq!(cache.get("new.example.com"), Some("y"));

        cache.rebuild_from_read(&[a("bare.example.com", "10.0.0.1")]);
        assert!(cache.is_empty());
    }

    #[test]
    fn change_set_is_a_delta_merge() {
        let mut cache = OwnershipCache::new();
        cache.rebuild_from_read(&[
            txt("keep.example.com", "k"),
            txt("gone.example.com", "g"),
        ]);

        cache.apply_change_set(&Changes {
            delete: vec![a("gone.example.com", "1.1.1.1")],
            create: vec![txt("new.example.com", "n")],
            update_new: vec![txt("keep.example.com", "k2")],
            ..Default::default()
        });

        assert_eq!(cache.get("gone.example.com"), None);
        assert_eq!(cache.get("new.example.com"), Some("n"));
        assert_eq!(cache.get("keep.example.com"), Some("k2"));
    }

    #[test]
    fn deleting_a_txt_record_keeps_the_entry() {
        let mut cache = OwnershipCache::new();
        cache.rebuild_from_read(&[txt("foo.example.com", "v")]);

        cache.apply_change_set(&Changes {
            delete: vec![txt("foo.example.com", "v")],
            ..Default::default()
        });

        assert_eq!(cache.get("foo.example.com"), Some("v"));
    }

    #[test]
    fn multi_target_txt_values_are_joined() {
        let mut cache = OwnershipCache::new();
        let mut record = txt("foo.example.com", "one");
        record.targets.push("two".into());
        cache.rebuild_from_read(&[record]);

        assert_eq!(cache.get("foo.example.com"), Some("one;two"));
    }

    #[test]
    fn describe_frames_base64_and_defaults_to_empty() {
        let mut cache = OwnershipCache::new();
        cache.rebuild_from_read(&[txt("foo.example.com", "hello")]);

        assert_eq!(
            cache.describe("foo.example.com"),
            format!("{DESCRIPTION_PREFIX} aGVsbG8=")
        );
        assert_eq!(cache.describe("unknown.example.com"), format!("{DESCRIPTION_PREFIX} "));
    }
}
