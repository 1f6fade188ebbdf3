use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{
        orders::OrderWithItems,
        payments::{CreateOrderData, CreateOrderRequest, GatewayOrderSummary, VerifyPaymentRequest},
    },
    entity::{
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    handshake::{CheckoutOptions, CheckoutPrefill, CheckoutTheme},
    response::ApiResponse,
    services::order_service::{order_from_entity, order_item_from_entity},
    signature,
    state::AppState,
};

const GATEWAY_NOT_CONFIGURED: &str = "Payment gateway is not configured";

/// Order intake: validate the cart, recompute the total from catalog prices,
/// persist the pending order with item snapshots, and open a gateway order.
/// The gateway call happens inside the transaction, so a gateway failure
/// rolls the local order back and never strands a pending order.
pub async fn create_payment_order(
    state: &AppState,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreateOrderData>> {
    validate_request(&payload)?;

    let key_id = state
        .config
        .razorpay_key_id
        .clone()
        .ok_or_else(|| AppError::PaymentGateway(GATEWAY_NOT_CONFIGURED.into()))?;
    let gateway = state
        .gateway
        .clone()
        .ok_or_else(|| AppError::PaymentGateway(GATEWAY_NOT_CONFIGURED.into()))?;

    let txn = state.orm.begin().await?;

    let ids: Vec<Uuid> = payload.items.iter().map(|line| line.id).collect();
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    // The charged amount comes from catalog prices only; a client-supplied
    // total is never part of the request.
    let mut total_amount: i64 = 0;
    for line in &payload.items {
        let product = products
            .get(&line.id)
            .ok_or_else(|| AppError::Validation(format!("Unknown product {}", line.id)))?;
        total_amount += product.price * i64::from(line.quantity);
    }

    let details = &payload.customer_details;
    let billing_address = details
        .billing_address
        .clone()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| payload.shipping_address.clone());

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_name: Set(details.name.clone()),
        customer_email: Set(details.email.clone()),
        customer_phone: Set(details.phone.clone()),
        shipping_address: Set(payload.shipping_address.clone()),
        billing_address: Set(billing_address),
        total_amount: Set(total_amount),
        payment_method: Set("razorpay".into()),
        payment_status: Set("pending".into()),
        status: Set("pending".into()),
        razorpay_order_id: Set(None),
        razorpay_payment_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for line in &payload.items {
        let product = &products[&line.id];
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            product_name: Set(product.name.clone()),
            product_slug: Set(product.slug.clone()),
            quantity: Set(line.quantity),
            price: Set(product.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    let receipt = order.id.to_string();
    let gateway_order = match gateway
        .create_order(total_amount, &state.config.currency, &receipt)
        .await
    {
        Ok(gw) => gw,
        Err(err) => {
            tracing::error!(error = %err, order_id = %order.id, "gateway order creation failed");
            txn.rollback().await.ok();
            return Err(AppError::PaymentGateway("Failed to create payment order".into()));
        }
    };

    let mut active: OrderActive = order.into();
    active.razorpay_order_id = Set(Some(gateway_order.id.clone()));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(order.id),
        "payment_order_created",
        Some(json!({
            "razorpay_order_id": gateway_order.id,
            "amount": total_amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let checkout = CheckoutOptions {
        key: key_id.clone(),
        amount: gateway_order.amount,
        currency: gateway_order.currency.clone(),
        order_id: gateway_order.id.clone(),
        name: state.config.store_name.clone(),
        prefill: CheckoutPrefill {
            name: details.name.clone(),
            email: details.email.clone(),
            contact: details.phone.clone(),
        },
        theme: CheckoutTheme::default(),
        order_ref: order.id,
    };

    Ok(ApiResponse::success(
        CreateOrderData {
            order: GatewayOrderSummary {
                id: gateway_order.id,
                amount: gateway_order.amount,
                currency: gateway_order.currency,
            },
            key_id,
            checkout,
        },
        None,
    ))
}

/// Verification & finalization: authenticate the gateway callback, then in
/// one transaction mark the order paid/confirmed and decrement stock with a
/// single-statement clamp at zero per item.
pub async fn verify_payment(
    state: &AppState,
    payload: VerifyPaymentRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let secret = state
        .config
        .razorpay_key_secret
        .as_deref()
        .ok_or_else(|| AppError::PaymentGateway(GATEWAY_NOT_CONFIGURED.into()))?;

    if !signature::verify_payment_signature(
        secret,
        &payload.razorpay_order_id,
        &payload.razorpay_payment_id,
        &payload.razorpay_signature,
    ) {
        tracing::warn!(
            razorpay_order_id = %payload.razorpay_order_id,
            "payment callback rejected: signature mismatch"
        );
        if let Err(err) = log_audit(
            &state.orm,
            payload.order_ref,
            "payment_rejected",
            Some(json!({
                "razorpay_order_id": payload.razorpay_order_id,
                "razorpay_payment_id": payload.razorpay_payment_id,
            })),
        )
        .await
        {
            tracing::warn!(error = %err, "audit log failed");
        }
        return Err(AppError::SignatureMismatch);
    }

    let txn = state.orm.begin().await?;

    let order = Orders::find()
        .filter(OrderCol::RazorpayOrderId.eq(payload.razorpay_order_id.clone()))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(order_ref) = payload.order_ref {
        if order_ref != order.id {
            return Err(AppError::Validation(
                "Order reference does not match this payment".into(),
            ));
        }
    }

    // Repeat delivery of an already-applied callback returns the finalized
    // order without touching stock again.
    if order.payment_status == "paid" {
        if order.razorpay_payment_id.as_deref() == Some(payload.razorpay_payment_id.as_str()) {
            let items =
                crate::services::order_service::load_items(&txn, order.id).await?;
            return Ok(ApiResponse::success(
                OrderWithItems {
                    order: order_from_entity(order),
                    items,
                },
                None,
            ));
        }
        return Err(AppError::Validation("Order is already paid".into()));
    }

    let mut active: OrderActive = order.into();
    active.payment_status = Set("paid".into());
    active.status = Set("confirmed".into());
    active.razorpay_payment_id = Set(Some(payload.razorpay_payment_id.clone()));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    let item_models = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;

    for item in &item_models {
        let result = Products::update_many()
            .col_expr(
                ProdCol::Stock,
                Expr::cust_with_values("GREATEST(stock - ?, 0)", [item.quantity]),
            )
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            tracing::warn!(
                product_id = %item.product_id,
                order_id = %order.id,
                "stock update skipped: product row missing"
            );
        }
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(order.id),
        "payment_confirmed",
        Some(json!({
            "razorpay_order_id": payload.razorpay_order_id,
            "razorpay_payment_id": payload.razorpay_payment_id,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        OrderWithItems {
            order: order_from_entity(order),
            items: item_models.into_iter().map(order_item_from_entity).collect(),
        },
        None,
    ))
}

fn validate_request(payload: &CreateOrderRequest) -> Result<(), AppError> {
    if payload.items.is_empty() {
        return Err(AppError::Validation("Cart is empty".into()));
    }
    for line in &payload.items {
        if line.quantity <= 0 {
            return Err(AppError::Validation(format!(
                "Invalid quantity for product {}",
                line.id
            )));
        }
    }
    let details = &payload.customer_details;
    for (field, value) in [
        ("name", &details.name),
        ("email", &details.email),
        ("phone", &details.phone),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("Customer {field} is required")));
        }
    }
    if payload.shipping_address.trim().is_empty() {
        return Err(AppError::Validation("Shipping address is required".into()));
    }
    Ok(())
}
