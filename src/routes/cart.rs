use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartCount, UpdateQuantityRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartLine,
    response::{ApiResponse, Meta},
    services::pricing::{CartLineView, CartSummary},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart))
        .route("/count", get(count_cart))
        .route(
            "/{product_id}",
            get(get_cart_line)
                .put(update_quantity)
                .delete(remove_from_cart),
        )
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Priced cart for the current user", body = ApiResponse<CartSummary>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "A product in the cart no longer exists")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartSummary>>> {
    let summary = state.carts.get_cart(user.user_id).await?;
    let meta = Meta::count(summary.products.len());
    Ok(Json(ApiResponse::success("OK", summary, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/cart/count",
    responses(
        (status = 200, description = "Number of items in the cart", body = ApiResponse<CartCount>),
        (status = 401, description = "Not authenticated")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn count_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartCount>>> {
    let count = state.carts.count_products(user.user_id).await?;
    Ok(Json(ApiResponse::success(
        "OK",
        CartCount { count },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "One priced cart line", body = ApiResponse<CartLineView>),
        (status = 404, description = "Product is not in the cart")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart_line(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartLineView>>> {
    let line = state.carts.get_line(user.user_id, product_id).await?;
    Ok(Json(ApiResponse::success("OK", line, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add a product, accumulating onto an existing line", body = ApiResponse<CartLine>),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Product not found")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartLine>>> {
    let line = state
        .carts
        .add_product(user.user_id, payload.product_id, payload.quantity)
        .await?;
    Ok(Json(ApiResponse::success("OK", line, None)))
}

#[utoipa::path(
    put,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Overwrite the line quantity", body = ApiResponse<CartLine>),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Product is not in the cart")
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<CartLine>>> {
    let line = state
        .carts
        .set_quantity(user.user_id, product_id, payload.quantity)
        .await?;
    Ok(Json(ApiResponse::success("OK", line, None)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed, or was not in the cart", body = ApiResponse<serde_json::Value>),
    ),
    security(("session_token" = []), ("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    state
        .carts
        .remove_product(user.user_id, product_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}
