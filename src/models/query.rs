use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{TransactionStatus, TransactionType};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Filters for listing ledger entries. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub status: Option<TransactionStatus>,
    pub tx_type: Option<TransactionType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub wallet_id: Option<Uuid>,
    pub token_address: Option<String>,
}

/// Columns a listing may be sorted by. Anything else is rejected, so the
/// column name can be spliced into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    EntryTime,
    ExitTime,
    CreatedAt,
    PurchasePrice,
    SalePrice,
    Liquidity,
    ProfitLoss,
    BuyingFees,
    SellingFees,
    Status,
    Type,
}

impl SortField {
    /// Parse the API name (camelCase, as serialized).
    pub fn from_api_str(s: &str) -> Option<Self> {
        let field = match s {
            "entryTime" => SortField::EntryTime,
            "exitTime" => SortField::ExitTime,
            "createdAt" => SortField::CreatedAt,
            "purchasePrice" => SortField::PurchasePrice,
            "salePrice" => SortField::SalePrice,
            "liquidity" => SortField::Liquidity,
            "profitLoss" => SortField::ProfitLoss,
            "buyingFees" => SortField::BuyingFees,
            "sellingFees" => SortField::SellingFees,
            "status" => SortField::Status,
            "type" => SortField::Type,
            _ => return None,
        };
        Some(field)
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::EntryTime => "entry_time",
            SortField::ExitTime => "exit_time",
            SortField::CreatedAt => "created_at",
            SortField::PurchasePrice => "purchase_price",
            SortField::SalePrice => "sale_price",
            SortField::Liquidity => "liquidity",
            SortField::ProfitLoss => "profit_loss",
            SortField::BuyingFees => "buying_fees",
            SortField::SellingFees => "selling_fees",
            SortField::Status => "status",
            SortField::Type => "tx_type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

/// A validated, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, String> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err("page must be >= 1".into());
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(format!("limit must be between 1 and {MAX_PAGE_SIZE}"));
        }

        Ok(Self { page, limit })
    }

    /// Saturates instead of overflowing; a page far past the end is just empty.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        Self {
            current: request.page,
            limit: request.limit,
            total,
            pages: (total + request.limit - 1) / request.limit,
        }
    }
}
