use crate::{
    abstract_trait::cart::DynCartService,
    domain::{
        requests::cart::{AddCartItemRequest, CheckoutRequest, UpdateCartItemRequest},
        response::{cart::CartResponse, order::OrderResponse},
    },
    middleware::UserId,
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use shared::{domain::responses::ApiResponse, errors::HttpError, middleware::SimpleValidatedJson};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/cart/current",
    tag = "Cart",
    params(
        ("X-User-Id" = Option<i64>, Header, description = "User ID"),
        ("userId" = Option<i64>, Query, description = "User ID when the header is absent")
    ),
    responses(
        (status = 200, description = "Current cart", body = ApiResponse<CartResponse>),
        (status = 400, description = "User ID missing")
    )
)]
pub async fn get_cart(
    Extension(service): Extension<DynCartService>,
    UserId(user_id): UserId,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.get_cart(user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    tag = "Cart",
    params(("X-User-Id" = Option<i64>, Header, description = "User ID")),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Item added", body = ApiResponse<CartResponse>),
        (status = 400, description = "Invalid quantity or unavailable product"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn add_item(
    Extension(service): Extension<DynCartService>,
    UserId(user_id): UserId,
    SimpleValidatedJson(body): SimpleValidatedJson<AddCartItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.add_item(user_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart/update",
    tag = "Cart",
    params(("X-User-Id" = Option<i64>, Header, description = "User ID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<CartResponse>),
        (status = 404, description = "Cart or item not found")
    )
)]
pub async fn update_item(
    Extension(service): Extension<DynCartService>,
    UserId(user_id): UserId,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_item(user_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    tag = "Cart",
    params(
        ("product_id" = i64, Path, description = "Product ID"),
        ("X-User-Id" = Option<i64>, Header, description = "User ID")
    ),
    responses(
        (status = 200, description = "Item removed", body = ApiResponse<CartResponse>),
        (status = 404, description = "Cart or item not found")
    )
)]
pub async fn remove_item(
    Extension(service): Extension<DynCartService>,
    UserId(user_id): UserId,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.remove_item(user_id, product_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/clear",
    tag = "Cart",
    params(("X-User-Id" = Option<i64>, Header, description = "User ID")),
    responses(
        (status = 200, description = "Cart cleared", body = ApiResponse<CartResponse>),
        (status = 404, description = "Cart not found")
    )
)]
pub async fn clear_cart(
    Extension(service): Extension<DynCartService>,
    UserId(user_id): UserId,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.clear_cart(user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart/checkout",
    tag = "Cart",
    params(("X-User-Id" = Option<i64>, Header, description = "User ID")),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created from cart", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Empty cart or insufficient stock"),
        (status = 404, description = "Cart not found")
    )
)]
pub async fn checkout(
    Extension(service): Extension<DynCartService>,
    UserId(user_id): UserId,
    SimpleValidatedJson(body): SimpleValidatedJson<CheckoutRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.checkout(user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub fn cart_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/cart/current", get(get_cart))
        .route("/api/cart/add", post(add_item))
        .route("/api/cart/update", post(update_item))
        .route("/api/cart/items/{product_id}", delete(remove_item))
        .route("/api/cart/clear", delete(clear_cart))
        .route("/api/cart/checkout", post(checkout))
        .layer(Extension(app_state.di_container.cart_service.clone()))
}
