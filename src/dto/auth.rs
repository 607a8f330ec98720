use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{dto::cart::CartItemDto, models::User};

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `user` is null for anonymous callers; the cart is the live one, joined
/// against current catalog prices.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: Option<User>,
    pub cart: Vec<CartItemDto>,
}
