//! Crate entrypoint wiring together configuration, the OPNsense client, the
//! Unbound provider, and the webhook API.

pub mod api;
pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod opnsense;
pub mod plan;
pub mod provider;
pub mod unbound;
pub mod validation;

use provider::Provider;

use std::sync::Arc;

/// Dependencies shared across webhook handlers.
pub struct AppState {
    pub provider: Box<dyn Provider>,
}

impl AppState {
    pub fn new(provider: impl Provider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
