use crate::{
    abstract_trait::product::service::{DynProductCommandService, DynProductQueryService},
    domain::{requests::stock::StockQuantityQuery, response::stock::StockAdjustmentResponse},
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use shared::{
    domain::responses::{ApiResponse, ProductResponse},
    errors::HttpError,
    middleware::SimpleValidatedQuery,
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Product",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product details", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_product(
    Extension(service): Extension<DynProductQueryService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reserve",
    tag = "Product",
    params(("id" = i64, Path, description = "Product ID"), StockQuantityQuery),
    responses(
        (status = 200, description = "Stock reserved", body = ApiResponse<StockAdjustmentResponse>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Insufficient stock", body = ApiResponse<StockAdjustmentResponse>)
    )
)]
pub async fn reserve_stock(
    Extension(service): Extension<DynProductCommandService>,
    Path(id): Path<i64>,
    SimpleValidatedQuery(params): SimpleValidatedQuery<StockQuantityQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.reserve_stock(id, params.quantity).await?;

    let status = if response.data.applied {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };

    Ok((status, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/release",
    tag = "Product",
    params(("id" = i64, Path, description = "Product ID"), StockQuantityQuery),
    responses(
        (status = 200, description = "Stock released", body = ApiResponse<StockAdjustmentResponse>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn release_stock(
    Extension(service): Extension<DynProductCommandService>,
    Path(id): Path<i64>,
    SimpleValidatedQuery(params): SimpleValidatedQuery<StockQuantityQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.release_stock(id, params.quantity).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn product_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/products/{id}", get(get_product))
        .route("/api/products/{id}/reserve", post(reserve_stock))
        .route("/api/products/{id}/release", post(release_stock))
        .layer(Extension(app_state.di_container.product_query.clone()))
        .layer(Extension(app_state.di_container.product_command.clone()))
}
