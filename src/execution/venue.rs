use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::{Currency, TradingParameters, Transaction, Wallet};

use super::order_executor::{BuyFill, ExecutionError, OrderExecutor, SellFill};
use super::venue_auth::VenueCredentials;

const BUY_PATH: &str = "/orders/buy";
const SELL_PATH: &str = "/orders/sell";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BuyOrderBody<'a> {
    wallet_public_key: &'a str,
    token_address: &'a str,
    amount: Decimal,
    currency: Currency,
    slippage_percentage: Decimal,
    tip_amount: Decimal,
    tip_currency: Currency,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SellOrderBody<'a> {
    wallet_public_key: Option<&'a str>,
    token_address: &'a str,
    buy_signature: &'a str,
    purchase_price: Decimal,
    return_trigger_percentage: Decimal,
    total_loss_limit_percentage: Decimal,
}

#[derive(Debug, Deserialize)]
struct BuyFillBody {
    signature: String,
    fees: Decimal,
    liquidity: Decimal,
}

#[derive(Debug, Deserialize)]
struct SellFillBody {
    signature: String,
    price: Decimal,
    fees: Decimal,
    liquidity: Decimal,
}

/// Settles orders against an HTTP trading venue with HMAC-signed requests.
#[derive(Debug, Clone)]
pub struct VenueExecutor {
    http: Client,
    credentials: VenueCredentials,
    base_url: String,
}

impl VenueExecutor {
    pub fn new(http: Client, credentials: VenueCredentials, base_url: String) -> Self {
        Self {
            http,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_signed<B, R>(&self, path: &str, body: &B) -> Result<R, ExecutionError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let payload =
            serde_json::to_string(body).map_err(|e| ExecutionError::Malformed(e.to_string()))?;
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = self.credentials.sign(&timestamp, "POST", path, &payload)?;

        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("content-type", "application/json")
            .header("X-API-KEY", &self.credentials.api_key)
            .header("X-SIGNATURE", signature)
            .header("X-TIMESTAMP", &timestamp)
            .body(payload)
            .send()
            .await
            .map_err(|e| ExecutionError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(path, status = %status, body = %text, "Venue rejected order");
            return Err(ExecutionError::Rejected(format!("{status}: {text}")));
        }

        resp.json::<R>()
            .await
            .map_err(|e| ExecutionError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl OrderExecutor for VenueExecutor {
    async fn execute_buy(
        &self,
        wallet: &Wallet,
        token_address: &str,
        amount: Decimal,
        currency: Currency,
        params: &TradingParameters,
    ) -> Result<BuyFill, ExecutionError> {
        let buy = &params.buy_parameters;
        let body = BuyOrderBody {
            wallet_public_key: &wallet.public_key,
            token_address,
            amount,
            currency,
            slippage_percentage: buy.slippage_percentage,
            tip_amount: buy.tip_amount,
            tip_currency: buy.tip_currency,
        };

        let fill: BuyFillBody = self.post_signed(BUY_PATH, &body).await?;
        if fill.signature.is_empty() || fill.fees.is_sign_negative() || fill.liquidity.is_sign_negative() {
            return Err(ExecutionError::Malformed(format!("invalid buy fill: {fill:?}")));
        }

        Ok(BuyFill {
            signature: fill.signature,
            fees: fill.fees,
            liquidity: fill.liquidity,
        })
    }

    async fn execute_sell(
        &self,
        open_buy: &Transaction,
        params: &TradingParameters,
    ) -> Result<SellFill, ExecutionError> {
        let body = SellOrderBody {
            wallet_public_key: open_buy.wallet_public_key.as_deref(),
            token_address: &open_buy.token_address,
            buy_signature: &open_buy.transaction_signature,
            purchase_price: open_buy.purchase_price,
            return_trigger_percentage: params.sell_parameters.return_trigger_percentage,
            total_loss_limit_percentage: params.stop_loss_parameters.total_loss_limit_percentage,
        };

        let fill: SellFillBody = self.post_signed(SELL_PATH, &body).await?;
        if fill.signature.is_empty() || fill.fees.is_sign_negative() || fill.liquidity.is_sign_negative() {
            return Err(ExecutionError::Malformed(format!("invalid sell fill: {fill:?}")));
        }

        Ok(SellFill {
            gross_profit: fill.price - open_buy.purchase_price,
            signature: fill.signature,
            price: fill.price,
            fees: fill.fees,
            liquidity: fill.liquidity,
        })
    }

    fn name(&self) -> &'static str {
        "venue"
    }
}
