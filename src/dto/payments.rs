use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::handshake::CheckoutOptions;

/// One cart line as submitted by the client. Quantities are validated
/// server-side; prices are never accepted from the client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CartLineInput {
    pub id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CustomerDetailsInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Defaults to the shipping address when absent.
    pub billing_address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<CartLineInput>,
    pub shipping_address: String,
    pub customer_details: CustomerDetailsInput,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GatewayOrderSummary {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderData {
    pub order: GatewayOrderSummary,
    pub key_id: String,
    /// Everything the client feeds the hosted UI constructor, plus the
    /// internal order reference for the confirmation page.
    pub checkout: CheckoutOptions,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    /// Internal order id from intake; cross-checked against the order the
    /// gateway order id resolves to when present.
    pub order_ref: Option<Uuid>,
}
