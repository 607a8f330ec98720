use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use storefront_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    entity::{products::ActiveModel as ProductActive, users::ActiveModel as UserActive},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::cart_service,
    state::AppState,
};
use uuid::Uuid;

// Cart invariants: double-add folds into one row, bad quantities are
// rejected without side effects, removal is idempotent. Skipped when no
// database is configured.
#[tokio::test]
async fn cart_add_update_remove_flow() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run cart flow tests.");
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let user_id = create_user(&state, "user").await?;
    let other_id = create_user(&state, "user").await?;
    let product_id = create_product(&state, 10_000).await?;

    let auth_user = AuthUser {
        user_id,
        role: "user".into(),
    };
    let other_user = AuthUser {
        user_id: other_id,
        role: "user".into(),
    };

    // Adding the same product twice sums quantities into a single row.
    cart_service::add_to_cart(
        &state.pool,
        &auth_user,
        AddToCartRequest {
            product_id,
            quantity: 2,
        },
    )
    .await?;
    let item = cart_service::add_to_cart(
        &state.pool,
        &auth_user,
        AddToCartRequest {
            product_id,
            quantity: 3,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(item.quantity, 5);

    let listed = cart_service::list_cart(
        &state.pool,
        &auth_user,
        Pagination {
            page: Some(1),
            per_page: Some(20),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].quantity, 5);
    assert_eq!(listed.items[0].product.price, 10_000);

    // Unknown product is a 404.
    let missing = cart_service::add_to_cart(
        &state.pool,
        &auth_user,
        AddToCartRequest {
            product_id: Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    // Zero and negative quantities are rejected and leave the row alone.
    for bad_quantity in [0, -2] {
        let rejected = cart_service::update_quantity(
            &state.pool,
            &auth_user,
            item.id,
            UpdateCartItemRequest {
                quantity: bad_quantity,
            },
        )
        .await;
        assert!(matches!(rejected, Err(AppError::Validation(_))));
    }
    let unchanged = cart_service::list_cart(
        &state.pool,
        &auth_user,
        Pagination {
            page: Some(1),
            per_page: Some(20),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(unchanged.items[0].quantity, 5);

    // Another user may not touch the row.
    let forbidden = cart_service::update_quantity(
        &state.pool,
        &other_user,
        item.id,
        UpdateCartItemRequest { quantity: 1 },
    )
    .await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    // A valid update sticks.
    let updated = cart_service::update_quantity(
        &state.pool,
        &auth_user,
        item.id,
        UpdateCartItemRequest { quantity: 2 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.quantity, 2);

    // Removal is idempotent: the second delete of the same id succeeds too.
    cart_service::remove_from_cart(&state.pool, &auth_user, item.id).await?;
    cart_service::remove_from_cart(&state.pool, &auth_user, item.id).await?;

    let emptied = cart_service::list_cart(
        &state.pool,
        &auth_user,
        Pagination {
            page: Some(1),
            per_page: Some(20),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(emptied.items.is_empty());

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        allowed_origins: Vec::new(),
        upload_dir: "uploads".into(),
        secure_cookies: false,
    };

    Ok(AppState { pool, orm, config })
}

// Unique emails keep concurrently-running tests out of each other's way.
async fn create_user(state: &AppState, role: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set("Cart Tester".into()),
        email: Set(format!("{}@example.com", Uuid::new_v4())),
        mobile: Set("9876543210".into()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_product(state: &AppState, price: i64) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Test Widget {}", Uuid::new_v4())),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        category: Set("Testing".into()),
        image: Set(None),
        rating: Set(4.0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}
