use printshop_catalog::PricingEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PricingEngine>,
}

impl AppState {
    pub fn new(engine: PricingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
