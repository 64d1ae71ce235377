use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::store::{AnimalStore, StoreConfig};

#[derive(Clone)]
pub struct EndpointState {
    pub store: Arc<AnimalStore>,
    pub default_history_limit: usize,
    pub overview_history_limit: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub animal_data: EndpointState,
    pub latest_animal: EndpointState,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        let endpoint = |store_config: StoreConfig| EndpointState {
            store: Arc::new(AnimalStore::new(store_config)),
            default_history_limit: config.default_history_limit,
            overview_history_limit: config.overview_history_limit,
        };
        Self {
            animal_data: endpoint(StoreConfig::with_history(config.max_history)),
            latest_animal: endpoint(StoreConfig::latest_only()),
        }
    }
}
