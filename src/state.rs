use std::sync::Arc;

use crate::{
    config::AppConfig,
    services::{cart_service::CartService, session_service::SessionService},
    store::{CartStore, ProductStore, SessionStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionService,
    pub carts: CartService,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wires every service to one store that implements all the adapters.
    pub fn new<S>(store: Arc<S>, config: &AppConfig) -> Self
    where
        S: UserStore + SessionStore + ProductStore + CartStore + 'static,
    {
        Self {
            users: store.clone(),
            sessions: SessionService::new(store.clone(), config.session_token_duration),
            carts: CartService::new(store.clone(), store, config.pricing),
            cookie_secure: config.cookie_secure,
        }
    }
}
