use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{AdminOrder, AdminOrderItem, AdminOrderList, OrderCustomer, UpdateOrderStatusRequest},
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Address, Order, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::order_service::order_from_entity,
    state::AppState,
};

#[derive(FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: String,
    mobile: String,
}

#[derive(FromRow)]
struct AddressRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    state: String,
    pincode: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: i64,
    product_name: Option<String>,
    product_image: Option<String>,
}

/// All orders joined with the customer, the shipping address, and the item
/// product snapshots, newest first. The joins are three batch lookups keyed
/// by the page's ids, not per-order queries.
pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<AdminOrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        let status = OrderStatus::parse(status)
            .ok_or_else(|| AppError::Validation(format!("unknown order status {status:?}")))?;
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect::<AppResult<Vec<Order>>>()?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let user_ids: Vec<Uuid> = orders.iter().map(|o| o.user_id).collect();
    let address_ids: Vec<Uuid> = orders.iter().map(|o| o.address_id).collect();

    let customers: HashMap<Uuid, OrderCustomer> =
        sqlx::query_as::<_, CustomerRow>("SELECT id, name, email, mobile FROM users WHERE id = ANY($1)")
            .bind(&user_ids)
            .fetch_all(&state.pool)
            .await?
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    OrderCustomer {
                        id: row.id,
                        name: row.name,
                        email: row.email,
                        mobile: row.mobile,
                    },
                )
            })
            .collect();

    let addresses: HashMap<Uuid, Address> =
        sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses WHERE id = ANY($1)")
            .bind(&address_ids)
            .fetch_all(&state.pool)
            .await?
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    Address {
                        id: row.id,
                        user_id: row.user_id,
                        name: row.name,
                        address_line1: row.address_line1,
                        address_line2: row.address_line2,
                        city: row.city,
                        state: row.state,
                        pincode: row.pincode,
                        created_at: row.created_at,
                    },
                )
            })
            .collect();

    let mut items_by_order: HashMap<Uuid, Vec<AdminOrderItem>> = HashMap::new();
    let item_rows = sqlx::query_as::<_, ItemRow>(
        r#"
        SELECT oi.order_id, oi.product_id, oi.quantity, oi.price,
               p.name AS product_name, p.image AS product_image
        FROM order_items oi
        LEFT JOIN products p ON p.id = oi.product_id
        WHERE oi.order_id = ANY($1)
        ORDER BY oi.created_at
        "#,
    )
    .bind(&order_ids)
    .fetch_all(&state.pool)
    .await?;
    for row in item_rows {
        items_by_order.entry(row.order_id).or_default().push(AdminOrderItem {
            product_id: row.product_id,
            name: row.product_name,
            image: row.product_image,
            quantity: row.quantity,
            price: row.price,
        });
    }

    let items = orders
        .into_iter()
        .map(|order| AdminOrder {
            user: customers.get(&order.user_id).map(|c| OrderCustomer {
                id: c.id,
                name: c.name.clone(),
                email: c.email.clone(),
                mobile: c.mobile.clone(),
            }),
            address: addresses.get(&order.address_id).cloned(),
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            totals: order.totals,
            payment_method: order.payment_method,
            status: order.status,
            created_at: order.created_at,
            id: order.id,
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        AdminOrderList { items },
        Some(meta),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let next = OrderStatus::parse(&payload.status).ok_or_else(|| {
        AppError::Validation(format!(
            "invalid order status {:?}; expected one of {}",
            payload.status,
            OrderStatus::ALL.map(|s| s.as_str()).join(", ")
        ))
    })?;

    // Row lock so concurrent updates cannot both pass the transition check.
    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = OrderStatus::parse(&existing.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "unknown order status {:?} in database",
            existing.status
        ))
    })?;

    if !current.can_transition_to(next) {
        let message = if current.is_terminal() {
            format!("order is {current} and can no longer change status")
        } else {
            format!("order is already {current}")
        };
        return Err(AppError::Validation(message));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    ).await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order)?,
        Some(Meta::empty()),
    ))
}
