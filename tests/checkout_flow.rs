use std::sync::Arc;

use async_trait::async_trait;
use saree_commerce_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::payments::{CartLineInput, CreateOrderRequest, CustomerDetailsInput, VerifyPaymentRequest},
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        products::{ActiveModel as ProductActive, Entity as Products, Model as ProductModel},
    },
    error::AppError,
    gateway::{GatewayOrder, PaymentGateway},
    services::payment_service,
    signature,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

const TEST_SECRET: &str = "test_key_secret";

struct MockGateway;

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        _receipt: &str,
    ) -> anyhow::Result<GatewayOrder> {
        Ok(GatewayOrder {
            id: format!("order_mock_{}", Uuid::new_v4().simple()),
            amount,
            currency: currency.to_string(),
        })
    }
}

struct FailingGateway;

#[async_trait]
impl PaymentGateway for FailingGateway {
    async fn create_order(
        &self,
        _amount: i64,
        _currency: &str,
        _receipt: &str,
    ) -> anyhow::Result<GatewayOrder> {
        anyhow::bail!("gateway unreachable")
    }
}

// Intake recomputes the total from catalog prices, a verified callback
// confirms the order and decrements stock, and a repeat of the same callback
// changes nothing further.
#[tokio::test]
async fn checkout_verify_and_stock_decrement_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(MockGateway)).await? else {
        return Ok(());
    };

    let product = seed_product(&state, 500000, 10).await?;
    let email = unique_email("asha");

    let intake = payment_service::create_payment_order(
        &state,
        request(vec![line(product.id, 2)], &email),
    )
    .await?;
    let data = intake.data.unwrap();
    assert_eq!(data.order.amount, 1000000);
    assert_eq!(data.order.currency, "INR");
    assert_eq!(data.checkout.amount, 1000000);
    assert_eq!(data.checkout.order_id, data.order.id);
    assert_eq!(data.checkout.prefill.email, email);

    // The pending order is persisted with the recomputed total.
    let pending = Orders::find_by_id(data.checkout.order_ref)
        .one(&state.orm)
        .await?
        .expect("pending order persisted");
    assert_eq!(pending.total_amount, 1000000);
    assert_eq!(pending.payment_status, "pending");
    assert_eq!(pending.status, "pending");
    assert!(pending.razorpay_payment_id.is_none());
    // No billing address was submitted, so it defaults to shipping.
    assert_eq!(pending.billing_address, pending.shipping_address);

    let payment_id = format!("pay_{}", Uuid::new_v4().simple());
    let verified = payment_service::verify_payment(
        &state,
        signed_callback(&data.order.id, &payment_id, Some(data.checkout.order_ref)),
    )
    .await?;
    let order = verified.data.unwrap().order;
    assert_eq!(order.payment_status, "paid");
    assert_eq!(order.status, "confirmed");
    assert_eq!(order.razorpay_payment_id.as_deref(), Some(payment_id.as_str()));
    assert_eq!(stock_of(&state, product.id).await?, 8);

    // Repeat delivery of the same callback must not decrement stock again.
    let repeated = payment_service::verify_payment(
        &state,
        signed_callback(&data.order.id, &payment_id, None),
    )
    .await?;
    assert_eq!(repeated.data.unwrap().order.payment_status, "paid");
    assert_eq!(stock_of(&state, product.id).await?, 8);

    Ok(())
}

// Intake does not check stock; finalization floors the counter at zero
// instead of going negative.
#[tokio::test]
async fn over_ordering_floors_stock_at_zero() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(MockGateway)).await? else {
        return Ok(());
    };

    let product = seed_product(&state, 320000, 10).await?;
    let email = unique_email("meera");

    let intake = payment_service::create_payment_order(
        &state,
        request(vec![line(product.id, 20)], &email),
    )
    .await?;
    let data = intake.data.unwrap();
    assert_eq!(data.order.amount, 6400000);

    let payment_id = format!("pay_{}", Uuid::new_v4().simple());
    payment_service::verify_payment(
        &state,
        signed_callback(&data.order.id, &payment_id, None),
    )
    .await?;

    assert_eq!(stock_of(&state, product.id).await?, 0);
    Ok(())
}

// A tampered signature is fatal for the callback: the order stays pending
// and stock is untouched.
#[tokio::test]
async fn tampered_signature_leaves_order_pending() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(MockGateway)).await? else {
        return Ok(());
    };

    let product = seed_product(&state, 540000, 5).await?;
    let email = unique_email("kavya");

    let intake = payment_service::create_payment_order(
        &state,
        request(vec![line(product.id, 1)], &email),
    )
    .await?;
    let data = intake.data.unwrap();

    let payment_id = format!("pay_{}", Uuid::new_v4().simple());
    let mut callback = signed_callback(&data.order.id, &payment_id, None);
    callback.razorpay_signature = signature::payment_signature(
        "wrong_secret",
        &data.order.id,
        &payment_id,
    );

    let err = payment_service::verify_payment(&state, callback)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SignatureMismatch));

    let order = Orders::find_by_id(data.checkout.order_ref)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(order.payment_status, "pending");
    assert!(order.razorpay_payment_id.is_none());
    assert_eq!(stock_of(&state, product.id).await?, 5);
    Ok(())
}

// A blank billing address counts as absent and falls back to the shipping
// address; an actual billing address is stored as submitted.
#[tokio::test]
async fn blank_billing_address_defaults_to_shipping() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(MockGateway)).await? else {
        return Ok(());
    };

    let product = seed_product(&state, 210000, 6).await?;

    let mut blank = request(vec![line(product.id, 1)], &unique_email("lata"));
    blank.customer_details.billing_address = Some("  ".into());
    let intake = payment_service::create_payment_order(&state, blank).await?;
    let order = Orders::find_by_id(intake.data.unwrap().checkout.order_ref)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(order.billing_address, "12 MG Road, Bengaluru 560001");

    let mut distinct = request(vec![line(product.id, 1)], &unique_email("lata"));
    distinct.customer_details.billing_address = Some("45 Park Street, Kolkata 700016".into());
    let intake = payment_service::create_payment_order(&state, distinct).await?;
    let order = Orders::find_by_id(intake.data.unwrap().checkout.order_ref)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(order.billing_address, "45 Park Street, Kolkata 700016");

    Ok(())
}

// A correctly signed callback naming a gateway order we never opened is
// rejected as not found and changes nothing.
#[tokio::test]
async fn unknown_gateway_order_id_is_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(MockGateway)).await? else {
        return Ok(());
    };

    let product = seed_product(&state, 430000, 9).await?;
    let email = unique_email("indu");

    let intake = payment_service::create_payment_order(
        &state,
        request(vec![line(product.id, 1)], &email),
    )
    .await?;
    let data = intake.data.unwrap();

    let payment_id = format!("pay_{}", Uuid::new_v4().simple());
    let bogus_order_id = format!("order_mock_{}", Uuid::new_v4().simple());
    let err = payment_service::verify_payment(
        &state,
        signed_callback(&bogus_order_id, &payment_id, None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let order = Orders::find_by_id(data.checkout.order_ref)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(order.payment_status, "pending");
    assert!(order.razorpay_payment_id.is_none());
    assert_eq!(stock_of(&state, product.id).await?, 9);
    Ok(())
}

#[tokio::test]
async fn unknown_product_persists_no_order() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(MockGateway)).await? else {
        return Ok(());
    };

    let email = unique_email("nila");
    let err = payment_service::create_payment_order(
        &state,
        request(vec![line(Uuid::new_v4(), 1)], &email),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let count = Orders::find()
        .filter(OrderCol::CustomerEmail.eq(email))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

// Gateway failure during intake rolls the local order back; nothing is
// stranded for reconciliation.
#[tokio::test]
async fn gateway_failure_rolls_back_pending_order() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(FailingGateway)).await? else {
        return Ok(());
    };

    let product = seed_product(&state, 850000, 7).await?;
    let email = unique_email("riya");

    let err = payment_service::create_payment_order(
        &state,
        request(vec![line(product.id, 1)], &email),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::PaymentGateway(_)));

    let count = Orders::find()
        .filter(OrderCol::CustomerEmail.eq(email))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 0);
    assert_eq!(stock_of(&state, product.id).await?, 7);
    Ok(())
}

// A paid order rejects a callback carrying a different payment id.
#[tokio::test]
async fn different_payment_id_for_paid_order_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state(Arc::new(MockGateway)).await? else {
        return Ok(());
    };

    let product = seed_product(&state, 125000, 4).await?;
    let email = unique_email("devi");

    let intake = payment_service::create_payment_order(
        &state,
        request(vec![line(product.id, 1)], &email),
    )
    .await?;
    let data = intake.data.unwrap();

    let payment_id = format!("pay_{}", Uuid::new_v4().simple());
    payment_service::verify_payment(
        &state,
        signed_callback(&data.order.id, &payment_id, None),
    )
    .await?;

    let other_payment_id = format!("pay_{}", Uuid::new_v4().simple());
    let err = payment_service::verify_payment(
        &state,
        signed_callback(&data.order.id, &other_payment_id, None),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(stock_of(&state, product.id).await?, 3);
    Ok(())
}

async fn setup_state(
    gateway: Arc<dyn PaymentGateway>,
) -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let config = AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        razorpay_key_id: Some("rzp_test_key".into()),
        razorpay_key_secret: Some(TEST_SECRET.into()),
        currency: "INR".into(),
        store_name: "Saree Studio".into(),
    };

    Ok(Some(AppState {
        orm,
        config,
        gateway: Some(gateway),
    }))
}

async fn seed_product(state: &AppState, price: i64, stock: i32) -> anyhow::Result<ProductModel> {
    let suffix = Uuid::new_v4().simple().to_string();
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Test Saree {suffix}")),
        slug: Set(format!("test-saree-{suffix}")),
        description: Set(Some("A saree for testing".into())),
        price: Set(price),
        stock: Set(stock),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product exists");
    Ok(product.stock)
}

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

fn line(id: Uuid, quantity: i32) -> CartLineInput {
    CartLineInput { id, quantity }
}

fn request(items: Vec<CartLineInput>, email: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        items,
        shipping_address: "12 MG Road, Bengaluru 560001".into(),
        customer_details: CustomerDetailsInput {
            name: "Test Customer".into(),
            email: email.to_string(),
            phone: "+919999999999".into(),
            billing_address: None,
        },
    }
}

fn signed_callback(
    gateway_order_id: &str,
    payment_id: &str,
    order_ref: Option<Uuid>,
) -> VerifyPaymentRequest {
    VerifyPaymentRequest {
        razorpay_order_id: gateway_order_id.to_string(),
        razorpay_payment_id: payment_id.to_string(),
        razorpay_signature: signature::payment_signature(TEST_SECRET, gateway_order_id, payment_id),
        order_ref,
    }
}
