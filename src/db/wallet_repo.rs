use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Wallet;

/// Insert a new wallet. The private key must already be encrypted.
pub async fn insert_wallet(
    pool: &PgPool,
    public_key: &str,
    encrypted_private_key: &str,
) -> anyhow::Result<Wallet> {
    let wallet = sqlx::query_as::<_, Wallet>(
        r#"
        INSERT INTO wallets (public_key, encrypted_private_key)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(public_key)
    .bind(encrypted_private_key)
    .fetch_one(pool)
    .await?;

    Ok(wallet)
}

pub async fn get_wallet_by_id(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Wallet>> {
    let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(wallet)
}

pub async fn get_wallet_by_public_key(
    pool: &PgPool,
    public_key: &str,
) -> anyhow::Result<Option<Wallet>> {
    let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE public_key = $1")
        .bind(public_key)
        .fetch_optional(pool)
        .await?;

    Ok(wallet)
}

/// Page of wallets, newest first.
pub async fn list_wallets(pool: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Wallet>> {
    let wallets = sqlx::query_as::<_, Wallet>(
        "SELECT * FROM wallets ORDER BY created_at DESC, id ASC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(wallets)
}

pub async fn count_wallets(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wallets")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Delete a wallet. Returns false if it did not exist.
pub async fn delete_wallet(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM wallets WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
