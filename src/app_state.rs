use crate::{
    config::Config,
    models::common::Platform,
    services::{
        DedupStore, InMemoryDedupStore, PicoValidator, PlaceholderSigner, PurchaseValidator,
        RequestSigner, SimulatedValidator,
    },
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub dedup: Arc<dyn DedupStore>,
    pub pico_validator: Arc<dyn PurchaseValidator>,
    pub simulated_validator: Arc<dyn PurchaseValidator>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let signer: Arc<dyn RequestSigner> = Arc::new(PlaceholderSigner::new());
        let ttl = Duration::from_secs(config.cache.ttl_hours * 60 * 60);

        Self {
            dedup: Arc::new(InMemoryDedupStore::new(ttl)),
            pico_validator: Arc::new(PicoValidator::new(&config.pico, signer)),
            simulated_validator: Arc::new(SimulatedValidator::new()),
            config: Arc::new(config),
        }
    }

    pub fn validator_for(&self, platform: Platform) -> Arc<dyn PurchaseValidator> {
        match platform {
            Platform::Pico => self.pico_validator.clone(),
            Platform::Simulated => self.simulated_validator.clone(),
        }
    }
}
