//! Input validation
//!
//! Field validators return `Result<(), String>` with a client-facing message.
//! The per-entity functions run every validator for a draft and collect the
//! failures into [`FieldErrors`], keyed by field name.

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::{collections::BTreeMap, fmt, sync::OnceLock};

use crate::models::{CarDraft, MONEY_DIGITS, MONEY_SCALE, OwnerDraft, SaleDraft, UserDraft};

pub const BLANK: &str = "This field may not be blank.";
pub const REQUIRED: &str = "This field is required.";

/// Validation failures keyed by field name, each with one or more messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single failure on one field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Record the outcome of a field validator
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Validate a required text field: not blank, at most `max_chars` characters
pub fn validate_text(value: &str, max_chars: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(BLANK.to_string());
    }

    validate_max_length(value, max_chars)
}

/// Validate the length of an optional text field
pub fn validate_max_length(value: &str, max_chars: usize) -> Result<(), String> {
    if value.chars().count() > max_chars {
        return Err(format!(
            "Ensure this field has no more than {max_chars} characters."
        ));
    }

    Ok(())
}

/// Validate a counter such as a year or a mileage
pub fn validate_non_negative(value: i32) -> Result<(), String> {
    if value < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    Ok(())
}

/// Validate a money amount against `NUMERIC(12, 2)`
pub fn validate_money(value: Decimal) -> Result<(), String> {
    let normalized = value.normalize();
    let scale = normalized.scale();
    let mantissa_digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;

    check_money_digits(mantissa_digits, scale)
}

/// Digit limits of `NUMERIC(12, 2)`, given the significant digits and the
/// decimal places of a number with no trailing fractional zeros
pub fn check_money_digits(significant: u32, decimals: u32) -> Result<(), String> {
    let (digits, decimals) = if decimals > significant {
        (decimals, decimals)
    } else {
        (significant, decimals)
    };
    let whole_digits = digits - decimals;
    let max_whole_digits = MONEY_DIGITS - MONEY_SCALE;

    if digits > MONEY_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {MONEY_DIGITS} digits in total."
        ));
    }

    if decimals > MONEY_SCALE {
        return Err(format!(
            "Ensure that there are no more than {MONEY_SCALE} decimal places."
        ));
    }

    if whole_digits > max_whole_digits {
        return Err(format!(
            "Ensure that there are no more than {max_whole_digits} digits before the decimal point."
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err(BLANK.to_string());
    }

    if email.len() > 254 {
        return Err("Ensure this field has no more than 254 characters.".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Enter a valid email address.".to_string());
    }

    Ok(())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    validate_text(username, 150)?;

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_car(draft: &CarDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    errors.check("make", validate_text(&draft.make, 100));
    errors.check("model", validate_text(&draft.model, 100));
    errors.check("year", validate_non_negative(draft.year));
    errors.check("vin", validate_text(&draft.vin, 17));
    errors.check("mileage", validate_non_negative(draft.mileage));
    errors.check("price", validate_money(draft.price));
    if let Some(image) = &draft.image {
        errors.check("image", validate_max_length(image, 100));
    }

    errors.into_result()
}

pub fn validate_owner(draft: &OwnerDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    errors.check("name", validate_text(&draft.name, 100));
    errors.check("contact_info", validate_email(&draft.contact_info));

    errors.into_result()
}

pub fn validate_sale(draft: &SaleDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    errors.check("sale_price", validate_money(draft.sale_price));

    errors.into_result()
}

pub fn validate_user(draft: &UserDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    errors.check("username", validate_username(&draft.username));
    // Email is optional for accounts.
    if !draft.email.is_empty() {
        errors.check("email", validate_email(&draft.email));
    }

    errors.into_result()
}
