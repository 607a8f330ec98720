use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Address, Order, OrderItem, OrderStatus, OrderTotals};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub address_id: Uuid,
    pub items: Vec<OrderItemInput>,
    pub payment_method: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCustomer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
}

/// Item line as the admin dashboard renders it: the product snapshot fields
/// are nullable because the product may have left the catalog since.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderItem {
    pub product_id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrder {
    pub id: Uuid,
    pub user: Option<OrderCustomer>,
    pub address: Option<Address>,
    pub items: Vec<AdminOrderItem>,
    pub totals: OrderTotals,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderList {
    pub items: Vec<AdminOrder>,
}
