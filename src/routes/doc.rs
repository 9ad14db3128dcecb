use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, RegisterRequest, SessionResponse},
        cart::{AddToCartRequest, CartCount, UpdateQuantityRequest},
    },
    middleware::auth::SESSION_COOKIE,
    models::{CartLine, ProductSnapshot, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, health},
    services::pricing::{CartLineView, CartSummary},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_token",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("UUID")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::refresh,
        auth::me,
        cart::get_cart,
        cart::count_cart,
        cart::get_cart_line,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart
    ),
    components(
        schemas(
            User,
            ProductSnapshot,
            CartLine,
            CartLineView,
            CartSummary,
            CartCount,
            RegisterRequest,
            LoginRequest,
            SessionResponse,
            AddToCartRequest,
            UpdateQuantityRequest,
            Meta,
            ApiResponse<User>,
            ApiResponse<CartSummary>,
            ApiResponse<CartLine>,
            ApiResponse<SessionResponse>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and session endpoints"),
        (name = "Cart", description = "Cart endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
