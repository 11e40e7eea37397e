use sqlx::PgPool;
use uuid::Uuid;

use crate::models::parameters::ParametersInput;
use crate::models::TradingParameters;

/// Advisory lock key held while the active parameter set changes hands.
const ACTIVATION_LOCK_KEY: i64 = 0x7472_6164_6570_6172;

/// Result of trying to overwrite a parameter set.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(TradingParameters),
    NotFound,
    /// A transaction already recorded these values.
    Referenced,
}

/// Serialize activations so two writers never both deactivate-then-insert.
async fn lock_activation(conn: &mut sqlx::PgConnection) -> anyhow::Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(ACTIVATION_LOCK_KEY)
        .execute(conn)
        .await?;
    Ok(())
}

/// The single active parameter set, if any.
pub async fn get_active(pool: &PgPool) -> anyhow::Result<Option<TradingParameters>> {
    let params = sqlx::query_as::<_, TradingParameters>(
        "SELECT * FROM trading_parameters WHERE is_active = true LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(params)
}

pub async fn get_by_id(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<TradingParameters>> {
    let params = sqlx::query_as::<_, TradingParameters>(
        "SELECT * FROM trading_parameters WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(params)
}

/// Insert a new parameter set and make it the active one, deactivating the
/// previous active set in the same transaction. Concurrent callers queue on
/// the activation lock; the last to commit stays active.
pub async fn create_active(
    pool: &PgPool,
    input: &ParametersInput,
    updated_by: Option<Uuid>,
) -> anyhow::Result<TradingParameters> {
    let mut tx = pool.begin().await?;
    lock_activation(&mut tx).await?;

    sqlx::query(
        "UPDATE trading_parameters SET is_active = false, updated_at = NOW() WHERE is_active = true",
    )
    .execute(&mut *tx)
    .await?;

    let buy = &input.buy_parameters;
    let sell = &input.sell_parameters;
    let params = sqlx::query_as::<_, TradingParameters>(
        r#"
        INSERT INTO trading_parameters (
            buy_in_amount, buy_in_currency, tip_amount, tip_currency, slippage_percentage,
            return_trigger_percentage, max_trade_time_minutes, profit_distribution_percentage,
            total_loss_limit_percentage, is_active, updated_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true, $10)
        RETURNING *
        "#,
    )
    .bind(buy.buy_in_amount)
    .bind(buy.buy_in_currency)
    .bind(buy.tip_amount)
    .bind(buy.tip_currency)
    .bind(buy.slippage_percentage)
    .bind(sell.return_trigger_percentage)
    .bind(sell.max_trade_time_minutes)
    .bind(sell.profit_distribution_percentage)
    .bind(input.stop_loss_parameters.total_loss_limit_percentage)
    .bind(updated_by)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(params)
}

/// Overwrite the values of a parameter set no transaction has used yet.
///
/// The row lock conflicts with the key-share lock a referencing insert takes,
/// so a BUY recorded concurrently either commits first (and the guarded update
/// sees it) or waits for this update to finish.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &ParametersInput,
    updated_by: Option<Uuid>,
) -> anyhow::Result<UpdateOutcome> {
    let mut tx = pool.begin().await?;

    let locked: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM trading_parameters WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    if locked.is_none() {
        tx.rollback().await?;
        return Ok(UpdateOutcome::NotFound);
    }

    let buy = &input.buy_parameters;
    let sell = &input.sell_parameters;
    let params = sqlx::query_as::<_, TradingParameters>(
        r#"
        UPDATE trading_parameters
        SET buy_in_amount = $2, buy_in_currency = $3, tip_amount = $4, tip_currency = $5,
            slippage_percentage = $6, return_trigger_percentage = $7,
            max_trade_time_minutes = $8, profit_distribution_percentage = $9,
            total_loss_limit_percentage = $10, updated_by = $11, updated_at = NOW()
        WHERE id = $1
          AND NOT EXISTS (SELECT 1 FROM transactions WHERE parameters_id = $1)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(buy.buy_in_amount)
    .bind(buy.buy_in_currency)
    .bind(buy.tip_amount)
    .bind(buy.tip_currency)
    .bind(buy.slippage_percentage)
    .bind(sell.return_trigger_percentage)
    .bind(sell.max_trade_time_minutes)
    .bind(sell.profit_distribution_percentage)
    .bind(input.stop_loss_parameters.total_loss_limit_percentage)
    .bind(updated_by)
    .fetch_optional(&mut *tx)
    .await?;

    match params {
        Some(params) => {
            tx.commit().await?;
            Ok(UpdateOutcome::Updated(params))
        }
        None => {
            tx.rollback().await?;
            Ok(UpdateOutcome::Referenced)
        }
    }
}

/// Make `id` the single active parameter set. Returns None if it does not exist.
pub async fn activate(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<TradingParameters>> {
    let mut tx = pool.begin().await?;
    lock_activation(&mut tx).await?;

    sqlx::query(
        r#"
        UPDATE trading_parameters SET is_active = false, updated_at = NOW()
        WHERE is_active = true AND id <> $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let params = sqlx::query_as::<_, TradingParameters>(
        r#"
        UPDATE trading_parameters SET is_active = true, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    if params.is_some() {
        tx.commit().await?;
    } else {
        tx.rollback().await?;
    }

    Ok(params)
}
