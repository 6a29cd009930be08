use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::{
    sources::{ExternalSource, InventoryLookup, LocalSource, RecipeLookup, RecipeStore},
    Aggregator,
};

/// Deadlines and switches for the two aggregation branches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchSettings {
    pub local_deadline: Duration,
    pub external_deadline: Duration,
    pub external_enabled: bool,
}

impl Default for BranchSettings {
    fn default() -> Self {
        Self {
            local_deadline: Duration::from_secs(3),
            external_deadline: Duration::from_secs(12),
            external_enabled: true,
        }
    }
}

impl From<&Config> for BranchSettings {
    fn from(config: &Config) -> Self {
        Self {
            local_deadline: config.local_deadline(),
            external_deadline: config.external_deadline(),
            external_enabled: config.external_enabled,
        }
    }
}

/// Shared application state
///
/// Holds no per-request data; everything inside is immutable and cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    pub inventory: Arc<dyn InventoryLookup>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        lookup: Arc<dyn RecipeLookup>,
        inventory: Arc<dyn InventoryLookup>,
        settings: BranchSettings,
    ) -> Self {
        let aggregator = Aggregator::new(
            LocalSource::new(store),
            ExternalSource::new(lookup, settings.external_enabled),
            settings.local_deadline,
            settings.external_deadline,
        );

        Self {
            aggregator,
            inventory,
        }
    }
}
