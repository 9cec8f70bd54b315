use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartLineAdded, CartList, UpdateCartLineRequest},
        feedback::{FeedbackCreated, SubmitFeedbackRequest},
        orders::{
            CheckoutRequest, CheckoutResponse, OrderDetail, OrderItemView, OrderList,
            VendorOrderDetail, VendorOrderList,
        },
    },
    models::{CartLine, Feedback, InventoryAdjustment, Order, OrderItem, Payment, Product},
    response::ApiResponse,
    routes::{cart, feedback, health, orders, vendor},
    services::inventory_service::{AdjustmentList, StockChange},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_line,
        cart::remove_cart_line,
        cart::clear_cart,
        orders::checkout,
        orders::list_orders,
        vendor::list_vendor_orders,
        vendor::update_order_status,
        vendor::adjust_inventory,
        vendor::inventory_history,
        vendor::list_products,
        vendor::create_product,
        vendor::update_product,
        feedback::submit_feedback
    ),
    components(
        schemas(
            Product,
            CartLine,
            Order,
            OrderItem,
            Payment,
            InventoryAdjustment,
            Feedback,
            AddToCartRequest,
            UpdateCartLineRequest,
            CartLineAdded,
            CartList,
            CheckoutRequest,
            CheckoutResponse,
            OrderItemView,
            OrderDetail,
            OrderList,
            VendorOrderDetail,
            VendorOrderList,
            SubmitFeedbackRequest,
            FeedbackCreated,
            StockChange,
            AdjustmentList,
            vendor::UpdateOrderStatusRequest,
            vendor::InventoryAdjustRequest,
            vendor::CreateProductRequest,
            vendor::UpdateProductRequest,
            vendor::ProductList,
            ApiResponse<CartList>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderList>,
            ApiResponse<VendorOrderList>,
            ApiResponse<StockChange>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cart", description = "Student cart endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Vendor", description = "Order fulfillment, inventory and products"),
        (name = "Feedback", description = "Post-delivery feedback"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
