//! Shared state for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::gateway::market::MarketGateway;
use crate::gateway::weather::WeatherGateway;
use crate::pipeline::classify::Classifier;

/// Shared context for all API routes.
///
/// The classifier sits behind a trait object so a trained model can
/// replace the mock without touching any handler.
#[derive(Clone)]
pub struct ApiContext {
    pub classifier: Arc<dyn Classifier>,
    pub weather: Arc<WeatherGateway>,
    pub market: Arc<MarketGateway>,
    pub db: Arc<Mutex<Connection>>,
}

impl ApiContext {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        weather: WeatherGateway,
        market: MarketGateway,
        db: Connection,
    ) -> Self {
        Self {
            classifier,
            weather: Arc::new(weather),
            market: Arc::new(market),
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("store lock poisoned".into()))
    }
}
