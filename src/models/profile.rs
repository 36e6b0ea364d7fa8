use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Company-level metadata for a ticker, from the live overview endpoint
/// or the built-in fallback templates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockProfile {
    pub id: Uuid,
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: i64,
}

impl StockProfile {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        sector: impl Into<String>,
        industry: impl Into<String>,
        market_cap: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            name: name.into(),
            sector: sector.into(),
            industry: industry.into(),
            market_cap,
        }
    }
}
