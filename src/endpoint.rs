//! Desired-state records and change-sets, in the shape the external-dns
//! webhook protocol puts on the wire.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Record kind of an [`Endpoint`].
///
/// Only the address families are ever written to Unbound. `Txt` is the
/// ownership layer carried in the override description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    A,
    Aaaa,
    Txt,
    Other(String),
}

impl RecordType {
    /// True for the kinds Unbound overrides can hold natively.
    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Aaaa)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Txt => "TXT",
            RecordType::Other(s) => s,
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        match s {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "TXT" => RecordType::Txt,
            other => RecordType::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        RecordType::from(s.as_str())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A desired-state DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "dnsName")]
    pub dns_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub targets: Vec<String>,
    #[serde(rename = "recordType")]
    pub record_type: RecordType,
    /// Remote override uuid for records read back from Unbound.
    #[serde(rename = "setIdentifier", default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,
    #[serde(rename = "recordTTL", default, skip_serializing_if = "is_zero")]
    pub record_ttl: i64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(
        rename = "providerSpecific",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

/// Opaque per-provider key/value carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

// Go encodes nil slices and maps as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Endpoint {
    pub fn new(dns_name: impl Into<String>, record_type: RecordType, target: impl Into<String>) -> Self {
        Self {
            dns_name: dns_name.into(),
            targets: vec![target.into()],
            record_type,
            set_identifier: String::new(),
            record_ttl: 0,
            labels: BTreeMap::new(),
            provider_specific: Vec::new(),
        }
    }

    pub fn with_set_identifier(mut self, id: impl Into<String>) -> Self {
        self.set_identifier = id.into();
        self
    }

    /// Targets joined the way external-dns renders a target list.
    pub fn targets_string(&self) -> String {
        self.targets.join(";")
    }
}

/// A change-set. An update is a paired `update_old` delete and `update_new` create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    #[serde(rename = "Create", alias = "create", default, deserialize_with = "null_as_default")]
    pub create: Vec<Endpoint>,
    #[serde(rename = "UpdateOld", alias = "updateOld", default, deserialize_with = "null_as_default")]
    pub update_old: Vec<Endpoint>,
    #[serde(rename = "UpdateNew", alias = "updateNew", default, deserialize_with = "null_as_default")]
    pub update_new: Vec<Endpoint>,
    #[serde(rename = "Delete", alias = "delete", default, deserialize_with = "null_as_default")]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    pub fn has_changes(&self) -> bool {
        !(self.create.is_empty()
            && self.update_old.is_empty()
            && self.update_new.is_empty()
            && self.delete.is_empty())
    }

    /// Records leaving the resolver, in the order they are deleted.
    pub fn removals(&self) -> impl Iterator<Item = &Endpoint> {
        self.delete.iter().chain(self.update_old.iter())
    }

    /// Records entering the resolver, in the order they are created.
    pub fn additions(&self) -> impl Iterator<Item = &Endpoint> {
        self.create.iter().chain(self.update_new.iter())
    }
}

/// Domains this provider is responsible for, as handed to external-dns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFilter {
    #[serde(rename = "include", default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl DomainFilter {
    /// Normalises entries: trimmed, lower-cased, no trailing dot, blanks dropped.
    pub fn new(filters: &[String], exclude: &[String]) -> Self {
        Self {
            filters: normalize_domains(filters),
            exclude: normalize_domains(exclude),
        }
    }
}

fn normalize_domains(domains: &[String]) -> Vec<String> {
    domains
        .iter()
        .map(|d| d.trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_roundtrips_known_and_unknown_kinds() {
        assert_eq!(RecordType::from("AAAA"), RecordType::Aaaa);
        assert_eq!(RecordType::from("MX"), RecordType::Other("MX".into()));
        assert_eq!(String::from(RecordType::Txt), "TXT");
        assert!(RecordType::A.is_address());
        assert!(!RecordType::Txt.is_address());
        assert!(!RecordType::Other("CNAME".into()).is_address());
    }

    #[test]
    fn endpoint_uses_webhook_field_names() {
        let ep = Endpoint::new("foo.example.com", RecordType::A, "10.0.0.1").with_set_identifier("abc");
        let json = serde_json::to_value(&ep).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "dnsName": "foo.example.com",
                "targets": ["10.0.0.1"],
                "recordType": "A",
                "setIdentifier": "abc",
            })
        );
    }

    #[test]
    fn changes_accept_both_key_spellings() {
        let upper: Changes = serde_json::from_str(
            r#"{"Create":[{"dnsName":"a.b","targets":["1.2.3.4"],"recordType":"A"}]}"#,
        )
        .unwrap();
        let lower: Changes = serde_json::from_str(
            r#"{"create":[{"dnsName":"a.b","targets":["1.2.3.4"],"recordType":"A"}]}"#,
        )
        .unwrap();
        assert_eq!(upper, lower);
        assert!(upper.has_changes());
        assert!(upper.update_old.is_empty());
        assert!(!Changes::default().has_changes());
    }

    #[test]
    fn null_lists_read_as_empty() {
        let changes: Changes = serde_json::from_str(
            r#"{"Create":null,"UpdateOld":null,"UpdateNew":null,"Delete":[{"dnsName":"a.b","targets":null,"recordType":"A","labels":null}]}"#,
        )
        .unwrap();
        assert!(changes.create.is_empty());
        assert!(changes.delete[0].targets.is_empty());
        assert!(changes.delete[0].labels.is_empty());
    }

    #[test]
    fn removals_list_deletes_before_replaced_records() {
        let changes = Changes {
            delete: vec![Endpoint::new("d.example", RecordType::A, "1.1.1.1")],
            update_old: vec![Endpoint::new("o.example", RecordType::A, "2.2.2.2")],
            ..Default::default()
        };
        let names: Vec<_> = changes.removals().map(|e| e.dns_name.as_str()).collect();
        assert_eq!(names, ["d.example", "o.example"]);
    }

    #[test]
    fn domain_filter_serializes_include_and_exclude() {
        let filter = DomainFilter::new(
            &["Example.com.".to_string(), " ".to_string()],
            &[],
        );
        assert_eq!(filter.filters, ["example.com"]);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, serde_json::json!({ "include": ["example.com"] }));
    }
}
