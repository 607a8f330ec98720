use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        address::{AddressList, CreateAddressRequest, UpdateAddressRequest},
        auth::{LoginRequest, MeResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
        orders::{
            AdminOrder, AdminOrderItem, AdminOrderList, CreateOrderRequest, OrderCustomer,
            OrderItemInput, OrderList, OrderWithItems, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        uploads::UploadResponse,
    },
    middleware::session::SESSION_COOKIE_NAME,
    models::{Address, CartItem, Order, OrderItem, OrderStatus, OrderTotals, Product, User},
    response::{ApiResponse, ErrorData, Meta},
    routes::{address, auth, cart, health, orders, params, products, uploads},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::logout,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        address::create_address,
        address::list_addresses,
        address::update_address,
        address::delete_address,
        orders::create_order,
        orders::list_my_orders,
        orders::get_order,
        orders::list_all_orders,
        orders::update_order_status,
        uploads::upload_image
    ),
    components(
        schemas(
            User,
            Product,
            CartItem,
            Address,
            Order,
            OrderItem,
            OrderStatus,
            OrderTotals,
            RegisterRequest,
            LoginRequest,
            MeResponse,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateAddressRequest,
            UpdateAddressRequest,
            AddressList,
            OrderItemInput,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            OrderCustomer,
            AdminOrderItem,
            AdminOrder,
            AdminOrderList,
            UploadResponse,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ErrorData,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartList>,
            ApiResponse<AddressList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<AdminOrderList>,
            ApiResponse<MeResponse>,
            ApiResponse<UploadResponse>
        )
    ),
    security(
        ("cookie_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and session endpoints"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Address", description = "Shipping address endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Admin", description = "Admin order management"),
        (name = "Uploads", description = "Image upload endpoint"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
