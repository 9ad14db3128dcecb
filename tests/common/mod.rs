#![allow(dead_code)]

use std::sync::Arc;

use bazaar_api::{
    config::AppConfig,
    models::ProductSnapshot,
    money::Money,
    services::{
        cart_service::CartService, pricing::PricingPolicy, session_service::SessionService,
    },
    state::AppState,
    store::MemoryStore,
};
use chrono::Duration;
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        host: "127.0.0.1".into(),
        port: 0,
        session_token_duration: Duration::hours(1),
        pricing: PricingPolicy::new(Money::from_minor(500), Decimal::new(10, 2)),
        cookie_secure: false,
    }
}

pub fn cart_service(store: &Arc<MemoryStore>) -> CartService {
    CartService::new(store.clone(), store.clone(), test_config().pricing)
}

pub fn session_service(store: &Arc<MemoryStore>) -> SessionService {
    SessionService::new(store.clone(), test_config().session_token_duration)
}

pub fn app_state(store: &Arc<MemoryStore>) -> AppState {
    AppState::new(store.clone(), &test_config())
}

pub async fn seed_product(store: &MemoryStore, name: &str, price: &str) -> Uuid {
    let id = Uuid::new_v4();
    store
        .insert_product(ProductSnapshot {
            id,
            name: name.to_string(),
            description: Some(format!("{name} description")),
            price: price.parse().expect("valid price"),
            image_url: Some(format!("/images/{id}.png")),
        })
        .await;
    id
}
