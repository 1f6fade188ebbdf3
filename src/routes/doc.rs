use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        orders::OrderWithItems,
        payments::{
            CartLineInput, CreateOrderData, CreateOrderRequest, CustomerDetailsInput,
            GatewayOrderSummary, VerifyPaymentRequest,
        },
        products::ProductList,
    },
    handshake::{CheckoutOptions, CheckoutPrefill, CheckoutTheme},
    models::{Order, OrderItem, Product},
    response::{ApiResponse, Meta},
    routes::{health, orders, params, payments, products},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        orders::get_order,
        payments::create_order,
        payments::verify_payment,
    ),
    components(
        schemas(
            Product,
            Order,
            OrderItem,
            ProductList,
            OrderWithItems,
            CartLineInput,
            CustomerDetailsInput,
            CreateOrderRequest,
            CreateOrderData,
            GatewayOrderSummary,
            VerifyPaymentRequest,
            CheckoutOptions,
            CheckoutPrefill,
            CheckoutTheme,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<CreateOrderData>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog read endpoints"),
        (name = "Orders", description = "Order confirmation lookup"),
        (name = "Payments", description = "Checkout payment handshake"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
