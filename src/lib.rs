pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Store;
use crate::routes::events::ConnectionCounter;
use crate::services::{
    booking_service::BookingService,
    expert_service::ExpertService,
    notification_service::{BroadcastNotifier, Notifier},
    reservation_service::ReservationService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub notifier: Arc<dyn Notifier>,
    pub expert_service: ExpertService,
    pub reservation_service: ReservationService,
    pub booking_service: BookingService,
    pub allowed_origins: Arc<Vec<String>>,
    pub connections: ConnectionCounter,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self::with_notifier(store, Arc::new(BroadcastNotifier::default()), config)
    }

    pub fn with_notifier(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self {
        let timeout = config.store_timeout;

        let expert_service = ExpertService::new(store.clone(), timeout);
        let reservation_service =
            ReservationService::new(store.clone(), notifier.clone(), timeout);
        let booking_service = BookingService::new(store.clone(), timeout);

        Self {
            store,
            notifier,
            expert_service,
            reservation_service,
            booking_service,
            allowed_origins: Arc::new(config.allowed_origins.clone()),
            connections: ConnectionCounter::default(),
        }
    }
}
