//! The operations an external-dns webhook server exposes.
use async_trait::async_trait;

use crate::endpoint::{Changes, DomainFilter, Endpoint};
use crate::error::UnboundError;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Domains this provider handles.
    fn domain_filter(&self) -> DomainFilter;

    /// Current records, including synthesized ownership records.
    async fn records(&self) -> Result<Vec<Endpoint>, UnboundError>;

    async fn apply_changes(&self, changes: &Changes) -> Result<(), UnboundError>;

    /// Canonicalize candidate endpoints before external-dns plans against them.
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<Vec<Endpoint>, UnboundError> {
        Ok(endpoints)
    }
}
