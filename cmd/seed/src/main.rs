//! Seeds the first administrator account. Idempotent: an existing email
//! is left untouched, password hash included, so re-running a deployment
//! script never locks an admin out.
//!
//! ```sh
//! DATABASE_URL=postgres://... ADMIN_EMAIL=admin@example.com \
//!     ADMIN_PASSWORD=change-me cargo run -p seed
//! ```

use anyhow::{bail, Context};
use auth_adapters::{Argon2Hasher, CredentialHasher};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let email = std::env::var("ADMIN_EMAIL").context("ADMIN_EMAIL is not set")?;
    let password = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD is not set")?;
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_owned());
    if password.len() < 12 {
        bail!("ADMIN_PASSWORD must be at least 12 characters");
    }

    let password_hash = Argon2Hasher
        .hash(&password)
        .map_err(|err| anyhow::anyhow!("hashing the admin password: {err}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("connecting to the database")?;

    let result = sqlx::query(
        "INSERT INTO users \
         (id, email, name, password_hash, is_admin, is_confirmed, created_at) \
         VALUES (gen_random_uuid(), $1, $2, $3, TRUE, TRUE, now()) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(&email)
    .bind(&name)
    .bind(&password_hash)
    .execute(&pool)
    .await
    .context("inserting the admin account")?;

    if result.rows_affected() == 1 {
        println!("admin account {email} created");
    } else {
        println!("admin account {email} already exists, nothing changed");
    }
    Ok(())
}
