use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Currency;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BuyParameters {
    pub buy_in_amount: Decimal,
    pub buy_in_currency: Currency,
    pub tip_amount: Decimal,
    pub tip_currency: Currency,
    /// 0-100
    pub slippage_percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SellParameters {
    /// Profit trigger, >= 0.
    pub return_trigger_percentage: Decimal,
    pub max_trade_time_minutes: Option<i32>,
    /// 0-100
    pub profit_distribution_percentage: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StopLossParameters {
    /// 0-100
    pub total_loss_limit_percentage: Decimal,
}

/// Database row for the trading_parameters table, nested the way the API
/// exposes it.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TradingParameters {
    pub id: Uuid,
    #[sqlx(flatten)]
    pub buy_parameters: BuyParameters,
    #[sqlx(flatten)]
    pub sell_parameters: SellParameters,
    #[sqlx(flatten)]
    pub stop_loss_parameters: StopLossParameters,
    pub is_active: bool,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a parameter set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersInput {
    pub buy_parameters: BuyParameters,
    pub sell_parameters: SellParameters,
    pub stop_loss_parameters: StopLossParameters,
}

impl ParametersInput {
    /// Range checks matching the table constraints. Returns the first violation.
    pub fn validate(&self) -> Result<(), String> {
        let hundred = Decimal::ONE_HUNDRED;
        let buy = &self.buy_parameters;
        let sell = &self.sell_parameters;

        if buy.buy_in_amount.is_sign_negative() {
            return Err("buyInAmount must be >= 0".into());
        }
        if buy.tip_amount.is_sign_negative() {
            return Err("tipAmount must be >= 0".into());
        }
        if !in_percent_range(buy.slippage_percentage, hundred) {
            return Err("slippagePercentage must be between 0 and 100".into());
        }
        if sell.return_trigger_percentage.is_sign_negative() {
            return Err("returnTriggerPercentage must be >= 0".into());
        }
        if matches!(sell.max_trade_time_minutes, Some(m) if m < 0) {
            return Err("maxTradeTimeMinutes must be >= 0".into());
        }
        if !in_percent_range(sell.profit_distribution_percentage, hundred) {
            return Err("profitDistributionPercentage must be between 0 and 100".into());
        }
        if !in_percent_range(self.stop_loss_parameters.total_loss_limit_percentage, hundred) {
            return Err("totalLossLimitPercentage must be between 0 and 100".into());
        }

        Ok(())
    }
}

fn in_percent_range(value: Decimal, max: Decimal) -> bool {
    value >= Decimal::ZERO && value <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> ParametersInput {
        ParametersInput {
            buy_parameters: BuyParameters {
                buy_in_amount: Decimal::from(10),
                buy_in_currency: Currency::Sol,
                tip_amount: Decimal::new(5, 3),
                tip_currency: Currency::Sol,
                slippage_percentage: Decimal::from(15),
            },
            sell_parameters: SellParameters {
                return_trigger_percentage: Decimal::from(200),
                max_trade_time_minutes: Some(30),
                profit_distribution_percentage: Decimal::from(50),
            },
            stop_loss_parameters: StopLossParameters {
                total_loss_limit_percentage: Decimal::from(25),
            },
        }
    }

    #[test]
    fn test_valid_parameters_pass() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_return_trigger_may_exceed_hundred() {
        let mut input = valid_input();
        input.sell_parameters.return_trigger_percentage = Decimal::from(1_000);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_slippage_out_of_range() {
        let mut input = valid_input();
        input.buy_parameters.slippage_percentage = Decimal::new(1001, 1); // 100.1
        let err = input.validate().unwrap_err();
        assert!(err.contains("slippagePercentage"));
    }

    #[test]
    fn test_negative_trade_time_rejected() {
        let mut input = valid_input();
        input.sell_parameters.max_trade_time_minutes = Some(-1);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_parse_nested_body() {
        let body = serde_json::json!({
            "buyParameters": {
                "buyInAmount": 1.5,
                "buyInCurrency": "USD",
                "tipAmount": "0.01",
                "tipCurrency": "SOL",
                "slippagePercentage": 10
            },
            "sellParameters": {
                "returnTriggerPercentage": 50,
                "profitDistributionPercentage": 100
            },
            "stopLossParameters": { "totalLossLimitPercentage": 20 }
        });
        let input: ParametersInput = serde_json::from_value(body).unwrap();
        assert_eq!(input.buy_parameters.buy_in_currency, Currency::Usd);
        assert_eq!(input.sell_parameters.max_trade_time_minutes, None);
        assert!(input.validate().is_ok());
    }
}
