//! Car model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Car listed in the dealership inventory
///
/// `owner` is the id of the User account that listed the car, not an
/// [`Owner`](super::Owner) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: String,
    pub mileage: i32,
    pub price: Decimal,
    pub features: String,
    pub condition: Condition,
    pub image: Option<String>,
    pub owner: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    /// Writable fields of this car, used as the base of a partial update
    pub fn draft(&self) -> CarDraft {
        CarDraft {
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year,
            vin: self.vin.clone(),
            mileage: self.mileage,
            price: self.price,
            features: self.features.clone(),
            condition: self.condition,
            image: self.image.clone(),
            owner: self.owner,
        }
    }
}

/// Writable car fields
#[derive(Debug, Clone, PartialEq)]
pub struct CarDraft {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub vin: String,
    pub mileage: i32,
    pub price: Decimal,
    pub features: String,
    pub condition: Condition,
    pub image: Option<String>,
    pub owner: Option<i64>,
}

impl CarDraft {
    /// Attach server-assigned fields
    pub fn into_car(self, id: i64, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Car {
        Car {
            id,
            make: self.make,
            model: self.model,
            year: self.year,
            vin: self.vin,
            mileage: self.mileage,
            price: self.price,
            features: self.features,
            condition: self.condition,
            image: self.image,
            owner: self.owner,
            created_at,
            updated_at,
        }
    }
}

/// Condition a car is sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Classic,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::New, Condition::Used, Condition::Classic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
            Condition::Classic => "classic",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("\"{0}\" is not a valid choice.")]
pub struct UnknownCondition(pub String);

impl FromStr for Condition {
    type Err = UnknownCondition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCondition(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_round_trips_through_its_name() {
        for condition in Condition::ALL {
            assert_eq!(condition.as_str().parse::<Condition>(), Ok(condition));
        }
    }

    #[test]
    fn condition_parsing_is_case_sensitive() {
        let err = "New".parse::<Condition>().unwrap_err();
        assert_eq!(err.to_string(), "\"New\" is not a valid choice.");
    }

    #[test]
    fn condition_serializes_lowercase() {
        let json = serde_json::to_string(&Condition::Classic).unwrap();
        assert_eq!(json, "\"classic\"");
    }
}
