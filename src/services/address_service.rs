use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::address::{AddressList, CreateAddressRequest, UpdateAddressRequest},
    entity::{
        addresses::{ActiveModel, Column, Entity as Addresses, Model as AddressModel},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
};

fn validate_pincode(pincode: &str) -> Result<(), AppError> {
    if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "pincode must be exactly 6 digits".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    for (field, value) in [
        ("name", &payload.name),
        ("address_line1", &payload.address_line1),
        ("city", &payload.city),
        ("state", &payload.state),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }
    validate_pincode(&payload.pincode)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        name: Set(payload.name),
        address_line1: Set(payload.address_line1),
        address_line2: Set(payload.address_line2),
        city: Set(payload.city),
        state: Set(payload.state),
        pincode: Set(payload.pincode),
        created_at: NotSet,
    };
    let address = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_create",
        Some("addresses"),
        Some(serde_json::json!({ "address_id": address.id })),
    ).await;

    Ok(ApiResponse::success(
        "Address created",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

pub async fn list_addresses(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AddressList>> {
    let items = Addresses::find()
        .filter(Column::UserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(address_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        AddressList { items },
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    let existing = Addresses::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };
    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    if let Some(pincode) = payload.pincode.as_ref() {
        validate_pincode(pincode)?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(line1) = payload.address_line1 {
        active.address_line1 = Set(line1);
    }
    if let Some(line2) = payload.address_line2 {
        active.address_line2 = Set(Some(line2));
    }
    if let Some(city) = payload.city {
        active.city = Set(city);
    }
    if let Some(state_name) = payload.state {
        active.state = Set(state_name);
    }
    if let Some(pincode) = payload.pincode {
        active.pincode = Set(pincode);
    }

    let address = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Updated",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Addresses::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(a) => a,
        None => return Err(AppError::NotFound),
    };
    if existing.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    // Orders reference addresses by id, so a referenced address must stay.
    let referencing = Orders::find()
        .filter(OrderCol::AddressId.eq(id))
        .count(&state.orm)
        .await?;
    if referencing > 0 {
        return Err(AppError::Validation(
            "address is used by existing orders".to_string(),
        ));
    }

    Addresses::delete_by_id(id).exec(&state.orm).await?;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        address_line1: model.address_line1,
        address_line2: model.address_line2,
        city: model.city,
        state: model.state,
        pincode: model.pincode,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
