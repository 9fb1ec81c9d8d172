//! Reconciliation of desired records against OPNsense Unbound host overrides.
//!
//! Unbound cannot hold TXT records; ownership values are folded into the
//! description of the sibling address override (see [`codec`]) and a cache
//! of them is kept between reads and applies (see [`cache`]).
//!
//! Applying a change-set is a saga without compensation: deletes, then
//! creates, then one reconfigure call, strictly in sequence. A failure stops
//! the saga where it is and leaves earlier steps applied.

pub mod cache;
pub mod codec;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::endpoint::{Changes, DomainFilter, Endpoint};
use crate::error::UnboundError;
use crate::opnsense::client::OpnsenseClient;
use crate::provider::Provider;
use cache::OwnershipCache;

/// Unbound provider.
///
/// The ownership cache sits behind an async mutex held for the whole of a
/// read or an apply, so one instance runs one reconciliation at a time.
#[derive(Debug)]
pub struct Unbound {
    client: OpnsenseClient,
    domain_filter: DomainFilter,
    cache: Mutex<OwnershipCache>,
}

impl Unbound {
    pub fn new(client: OpnsenseClient, domain_filter: DomainFilter) -> Self {
        Self {
            client,
            domain_filter,
            cache: Mutex::new(OwnershipCache::new()),
        }
    }

    /// Provider for the OPNsense instance and filter in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self, UnboundError> {
        let client = OpnsenseClient::new(
            config.opnsense.base_url.clone(),
            &config.opnsense.creds,
            config.opnsense.timeout(),
        )?;
        Ok(Self::new(client, config.domain_filter()))
    }

    /// Read every override, decode it and rebuild the ownership cache.
    pub async fn read(&self) -> Result<Vec<Endpoint>, UnboundError> {
        let mut cache = self.cache.lock().await;

        let rows = self.client.search_overrides().await?;
        let endpoints = codec::decode(&rows);
        debug!(rows = rows.len(), endpoints = endpoints.len(), "decoded overrides");

        cache.rebuild_from_read(&endpoints);
        Ok(endpoints)
    }

    /// Push `changes` to Unbound: deletes, creates, then reconfigure.
    pub async fn apply(&self, changes: &Changes) -> Result<(), UnboundError> {
        if !changes.has_changes() {
            debug!("no changes to apply");
            return Ok(());
        }

        let mut cache = self.cache.lock().await;
        cache.apply_change_set(changes);

        for endpoint in changes.removals() {
            if !endpoint.record_type.is_address() {
                debug!(dns_name = %endpoint.dns_name, record_type = %endpoint.record_type, "skipping delete, unsupported record type");
                continue;
            }
            self.client
                .del_override(&endpoint.set_identifier)
                .await
                .map_err(|e| e.for_record(&endpoint.dns_name))?;
        }

        for endpoint in changes.additions() {
            if !endpoint.record_type.is_address() {
                debug!(dns_name = %endpoint.dns_name, record_type = %endpoint.record_type, "skipping create, unsupported record type");
                continue;
            }
            for host in codec::encode(endpoint, &cache) {
                info!(dns_name = %endpoint.dns_name, target = %host.server, "creating override");
                self.client
                    .add_override(&host)
                    .await
                    .map_err(|e| e.for_record(&endpoint.dns_name))?;
            }
        }

        // Nothing is rolled back if this fails; the edits above are already staged.
        self.client.reconfigure().await?;
        Ok(())
    }
}

#[async_trait]
impl Provider for Unbound {
    fn domain_filter(&self) -> DomainFilter {
        self.domain_filter.clone()
    }

    async fn records(&self) -> Result<Vec<Endpoint>, UnboundError> {
        self.read().await
    }

    async fn apply_changes(&self, changes: &Changes) -> Result<(), UnboundError> {
        self.apply(changes).await
    }
}
