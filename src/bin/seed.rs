use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "9000000001", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "Demo User", "user@example.com", "9000000002", "user123", "user").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    mobile: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, mobile, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(mobile)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If the user already exists, fetch the id.
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        (
            "Wireless Earbuds",
            "Noise-cancelling in-ear buds",
            299900_i64,
            "Electronics",
            "/uploads/earbuds.jpg",
            4.3_f32,
        ),
        (
            "Cotton T-Shirt",
            "Plain crew-neck tee",
            49900,
            "Clothing",
            "/uploads/tshirt.jpg",
            4.0,
        ),
        (
            "Steel Water Bottle",
            "1L insulated bottle",
            89900,
            "Home",
            "/uploads/bottle.jpg",
            4.6,
        ),
        (
            "Running Shoes",
            "Lightweight road runners",
            549900,
            "Footwear",
            "/uploads/shoes.jpg",
            4.1,
        ),
    ];

    for (name, desc, price, category, image, rating) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, category, image, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(category)
        .bind(image)
        .bind(rating)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
