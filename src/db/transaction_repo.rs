use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{NewTransaction, PageRequest, Sort, Transaction, TransactionFilter};

/// Insert a ledger entry. Accepts a pool or an open database transaction.
pub async fn insert_transaction<'e, E>(executor: E, new: &NewTransaction) -> anyhow::Result<Transaction>
where
    E: PgExecutor<'e>,
{
    let tx = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            wallet_id, parameters_id, token_address, token_name, token_symbol,
            transaction_signature, block_explorer_url, status, tx_type, entry_time, exit_time,
            purchase_price, sale_price, liquidity, tip_amount, tip_currency,
            buying_fees, selling_fees, profit_loss, closes_transaction_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        RETURNING *
        "#,
    )
    .bind(new.wallet_id)
    .bind(new.parameters_id)
    .bind(&new.token_address)
    .bind(&new.token_name)
    .bind(&new.token_symbol)
    .bind(&new.transaction_signature)
    .bind(&new.block_explorer_url)
    .bind(new.status)
    .bind(new.tx_type)
    .bind(new.entry_time)
    .bind(new.exit_time)
    .bind(new.purchase_price)
    .bind(new.sale_price)
    .bind(new.liquidity)
    .bind(new.tip_amount)
    .bind(new.tip_currency)
    .bind(new.buying_fees)
    .bind(new.selling_fees)
    .bind(new.profit_loss)
    .bind(new.closes_transaction_id)
    .fetch_one(executor)
    .await?;

    Ok(tx)
}

pub async fn get_transaction_by_id(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Transaction>> {
    let tx = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT t.*, w.public_key AS wallet_public_key
        FROM transactions t
        LEFT JOIN wallets w ON w.id = t.wallet_id
        WHERE t.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(tx)
}

/// Mark an open BUY as closed. Only succeeds if no one closed it first;
/// returns false when the row was already closed (or is not a BUY).
pub async fn close_buy<'e, E>(executor: E, id: Uuid, closed_at: DateTime<Utc>) -> anyhow::Result<bool>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE transactions
        SET closed_at = $2, exit_time = $2, updated_at = NOW()
        WHERE id = $1 AND tx_type = 'BUY' AND closed_at IS NULL
        "#,
    )
    .bind(id)
    .bind(closed_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a TransactionFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(status) = filter.status {
        qb.push(" AND t.status = ").push_bind(status);
    }
    if let Some(tx_type) = filter.tx_type {
        qb.push(" AND t.tx_type = ").push_bind(tx_type);
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND t.entry_time >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND t.entry_time <= ").push_bind(end);
    }
    if let Some(wallet_id) = filter.wallet_id {
        qb.push(" AND t.wallet_id = ").push_bind(wallet_id);
    }
    if let Some(token) = filter.token_address.as_deref() {
        qb.push(" AND t.token_address = ").push_bind(token);
    }
}

/// One page of matching transactions, with the wallet public key joined in.
/// `id` breaks ties so consecutive pages never overlap.
pub async fn list_transactions(
    pool: &PgPool,
    filter: &TransactionFilter,
    sort: Sort,
    page: PageRequest,
) -> anyhow::Result<Vec<Transaction>> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT t.*, w.public_key AS wallet_public_key \
         FROM transactions t LEFT JOIN wallets w ON w.id = t.wallet_id",
    );
    push_filters(&mut qb, filter);
    qb.push(format!(
        " ORDER BY t.{} {}, t.id ASC",
        sort.field.column(),
        sort.order.keyword()
    ));
    qb.push(" LIMIT ").push_bind(page.limit);
    qb.push(" OFFSET ").push_bind(page.offset());

    let rows = qb.build_query_as::<Transaction>().fetch_all(pool).await?;

    Ok(rows)
}

pub async fn count_transactions(pool: &PgPool, filter: &TransactionFilter) -> anyhow::Result<i64> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions t");
    push_filters(&mut qb, filter);

    let row: (i64,) = qb.build_query_as().fetch_one(pool).await?;

    Ok(row.0)
}

/// Number of ledger entries referencing a wallet.
pub async fn count_for_wallet(pool: &PgPool, wallet_id: Uuid) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE wallet_id = $1")
        .bind(wallet_id)
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
