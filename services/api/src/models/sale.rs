//! Sale model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A car sold to an owner
///
/// `sale_date` is assigned when the sale is recorded and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub car: i64,
    pub owner: i64,
    pub sale_price: Decimal,
    pub sale_date: DateTime<Utc>,
}

impl Sale {
    pub fn draft(&self) -> SaleDraft {
        SaleDraft {
            car: self.car,
            owner: self.owner,
            sale_price: self.sale_price,
        }
    }
}

/// Writable sale fields
#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub car: i64,
    pub owner: i64,
    pub sale_price: Decimal,
}

impl SaleDraft {
    pub fn into_sale(self, id: i64, sale_date: DateTime<Utc>) -> Sale {
        Sale {
            id,
            car: self.car,
            owner: self.owner,
            sale_price: self.sale_price,
            sale_date,
        }
    }
}
