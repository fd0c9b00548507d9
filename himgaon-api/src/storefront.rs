use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use himgaon_catalog::Product;
use himgaon_order::{Cart, CartLine, ContactInfo, Order, OrderError, PlacedOrder};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct TrackOrderRequest {
    pub order_code: String,
    pub phone: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products))
        .route("/v1/products/{id}", get(get_product))
        .route("/v1/orders", post(place_order))
        .route("/v1/orders/track", post(track_order))
}

/// GET /v1/products
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.products.list_products().await?))
}

/// GET /v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    state
        .products
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Product {} not found", id)))
}

/// POST /v1/orders
///
/// Each line is priced from the catalog at the moment the request arrives; that price is
/// what the order records even if an admin edits the product mid-checkout.
async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>), AppError> {
    let mut cart = Cart::new();
    for line in &req.items {
        let product = state
            .products
            .get_product(line.product_id)
            .await?
            .ok_or(OrderError::ProductUnavailable(line.product_id))?;
        cart.add(CartLine::new(product.id, line.quantity, product.price_paise))?;
    }

    let contact = ContactInfo::new(req.customer_name, req.email, req.phone, req.address);
    let placed = state.orders.place_order(contact, &mut cart).await?;

    Ok((StatusCode::CREATED, Json(placed)))
}

/// POST /v1/orders/track
async fn track_order(
    State(state): State<AppState>,
    Json(req): Json<TrackOrderRequest>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(
        state.orders.track_order(&req.order_code, &req.phone).await?,
    ))
}
