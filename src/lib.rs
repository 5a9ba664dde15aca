//! Staybnb application library
//!
//! Marketplace modules (users, spots, reviews, bookings) over an in-memory
//! store, plus the lifecycle that serves them.

pub mod modules;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testutils;

use anyhow::Context;
use staybnb_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use store::Store;

/// A registry holding every marketplace module, sharing `store`.
pub fn build_registry(store: &Store) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

/// Initialize, start and serve every module until shutdown.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = Store::new();
    let registry = build_registry(&store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = staybnb_http::start_server(&registry, &settings)
        .await
        .context("server terminated with an error");

    registry.stop_all().await?;
    served
}
