use std::sync::Arc;

use crate::services::pipeline::Pipeline;
use crate::store::MarketStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketStore>,
    pub pipeline: Arc<Pipeline>,
}
