use axum::{
    Json, Router,
    extract::State,
    routing::post,
};

use crate::{
    dto::{
        orders::OrderWithItems,
        payments::{CreateOrderData, CreateOrderRequest, VerifyPaymentRequest},
    },
    error::AppResult,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/verify", post(verify_payment))
}

#[utoipa::path(
    post,
    path = "/api/payments/create-order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Pending order and gateway order created", body = ApiResponse<CreateOrderData>),
        (status = 400, description = "Invalid cart or customer details"),
        (status = 502, description = "Gateway order creation failed"),
    ),
    tag = "Payments"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<CreateOrderData>>> {
    let response = payment_service::create_payment_order(&state, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/payments/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified, order confirmed", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Signature mismatch"),
        (status = 404, description = "Unknown gateway order id"),
    ),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let response = payment_service::verify_payment(&state, payload).await?;
    Ok(Json(response))
}
