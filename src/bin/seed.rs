use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use bazaar_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    money::Money,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let user_id = ensure_user(&pool, "Test User", "user@example.com", "user123").await?;
    seed_products(&pool).await?;

    println!("Seed completed. User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
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

    println!("Ensured user {email}");
    Ok(user_id)
}

async fn seed_products(pool: &DbPool) -> anyhow::Result<()> {
    let products = [
        ("Canvas Tote", "Sturdy everyday bag", "19.99", "/images/tote.png"),
        ("Ceramic Mug", "Holds 350ml of coffee", "12.50", "/images/mug.png"),
        ("Sticker Pack", "Ten assorted stickers", "4.00", "/images/stickers.png"),
        ("Wool Scarf", "Hand-knitted, one size", "35.00", "/images/scarf.png"),
    ];

    for (name, desc, price, image_url) in products {
        let price: Money = price.parse()?;
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price.amount())
        .bind(image_url)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
