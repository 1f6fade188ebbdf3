use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    dto::orders::OrderWithItems,
    entity::{
        order_items::{
            Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel,
        },
        orders::{Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    models::{Order, OrderItem},
    response::ApiResponse,
    state::AppState,
};

/// Order lookup for the post-payment confirmation page. Checkout is a guest
/// flow, so the opaque order id is the access key.
pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = load_items(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        None,
    ))
}

pub(crate) async fn load_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .all(conn)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();
    Ok(items)
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        customer_name: model.customer_name,
        customer_email: model.customer_email,
        customer_phone: model.customer_phone,
        shipping_address: model.shipping_address,
        billing_address: model.billing_address,
        total_amount: model.total_amount,
        payment_method: model.payment_method,
        payment_status: model.payment_status,
        status: model.status,
        razorpay_order_id: model.razorpay_order_id,
        razorpay_payment_id: model.razorpay_payment_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        product_name: model.product_name,
        product_slug: model.product_slug,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
