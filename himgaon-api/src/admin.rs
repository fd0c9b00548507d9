use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use himgaon_catalog::{Product, ProductDraft};
use himgaon_core::Dashboard;
use himgaon_order::{AdminCapability, Order, OrderStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    #[serde(default)]
    pub notes: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/dashboard", get(dashboard))
        .route("/v1/admin/orders", get(list_orders))
        .route("/v1/admin/orders/{id}", get(get_order))
        .route("/v1/admin/orders/{id}/accept", post(accept_order))
        .route("/v1/admin/orders/{id}/reject", post(reject_order))
        .route("/v1/admin/orders/{id}/deliver", post(deliver_order))
        .route("/v1/admin/products", post(create_product))
        .route(
            "/v1/admin/products/{id}",
            put(update_product).delete(delete_product),
        )
}

// ============================================================================
// Orders
// ============================================================================

/// GET /v1/admin/dashboard
async fn dashboard(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(
        state
            .orders
            .dashboard(&admin, state.low_stock_threshold)
            .await?,
    ))
}

/// GET /v1/admin/orders?status=Pending
async fn list_orders(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(s) => Some(s.parse::<OrderStatus>()?),
    };

    Ok(Json(state.orders.list_orders(&admin, status).await?))
}

/// GET /v1/admin/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    state
        .orders
        .get_order(&admin, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", id)))
}

/// POST /v1/admin/orders/{id}/accept
async fn accept_order(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Path(id): Path<Uuid>,
    body: Option<Json<NotesRequest>>,
) -> Result<Json<Order>, AppError> {
    let notes = body.map(|Json(req)| req.notes).unwrap_or_default();
    Ok(Json(state.orders.accept_order(&admin, id, &notes).await?))
}

/// POST /v1/admin/orders/{id}/reject
async fn reject_order(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Path(id): Path<Uuid>,
    body: Option<Json<NotesRequest>>,
) -> Result<Json<Order>, AppError> {
    let notes = body.map(|Json(req)| req.notes).unwrap_or_default();
    Ok(Json(state.orders.reject_order(&admin, id, &notes).await?))
}

/// POST /v1/admin/orders/{id}/deliver
async fn deliver_order(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.deliver_order(&admin, id).await?))
}

// ============================================================================
// Products
// ============================================================================

/// POST /v1/admin/products
async fn create_product(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.products.create_product(&admin, draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /v1/admin/products/{id}
async fn update_product(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Path(id): Path<Uuid>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.products.update_product(&admin, id, draft).await?))
}

/// DELETE /v1/admin/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminCapability>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.products.delete_product(&admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
