//! Dealership records and their writable drafts
//!
//! A record (`Car`, `Owner`, `Sale`, `User`) is what the store holds and what
//! the API emits. A draft is the writable subset a client may send; server
//! assigned fields (ids, timestamps) never appear in drafts.

use rust_decimal::Decimal;

pub mod car;
pub mod owner;
pub mod sale;
pub mod user;

pub use car::{Car, CarDraft, Condition};
pub use owner::{Owner, OwnerDraft};
pub use sale::{Sale, SaleDraft};
pub use user::{User, UserDraft};

/// Number of fractional digits stored for money columns (`NUMERIC(12, 2)`).
pub const MONEY_SCALE: u32 = 2;

/// Total number of digits allowed in a money value.
pub const MONEY_DIGITS: u32 = 12;

/// Normalise a money amount to exactly two fractional digits.
pub fn money(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(MONEY_SCALE);
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn money_pads_to_two_places() {
        assert_eq!(money(Decimal::from(25000)).to_string(), "25000.00");
        assert_eq!(money(Decimal::from_str("19.9").unwrap()).to_string(), "19.90");
        assert_eq!(money(Decimal::from_str("7.25").unwrap()).to_string(), "7.25");
    }
}
