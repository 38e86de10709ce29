//! JSON request bodies to record drafts
//!
//! Each entity module turns a JSON object into a validated draft. Fields are
//! coerced one by one and every failure is reported, so a client sees all
//! offending fields at once. Server-assigned fields are accepted and ignored;
//! any other undeclared key is rejected.

use axum::{
    Json, async_trait,
    extract::{FromRequest, Request},
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::warn;

use crate::{
    error::ApiError,
    validation::{FieldErrors, REQUIRED, check_money_digits},
};

pub mod car;
pub mod owner;
pub mod sale;
pub mod user;

pub use car::car_draft;
pub use owner::owner_draft;
pub use sale::sale_draft;
pub use user::user_draft;

pub const UNKNOWN_FIELD: &str = "Unknown field.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NUL_CHARACTER: &str = "Null characters are not allowed.";

/// How missing fields are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// POST: required fields must be present, optional ones default
    Create,
    /// PUT: required fields must be present, optional ones keep their value
    Replace,
    /// PATCH: every missing field keeps its value
    Partial,
}

/// JSON object request body
///
/// Rejections are turned into [`ApiError::BadRequest`] so malformed bodies get
/// the same JSON error shape as every other failure.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                warn!("Rejected request body: {}", rejection.body_text());
                ApiError::BadRequest(rejection.body_text())
            })?;

        match value {
            Value::Object(map) => Ok(JsonBody(map)),
            other => Err(ApiError::BadRequest(format!(
                "Invalid data. Expected a JSON object, but got {}.",
                type_name(&other)
            ))),
        }
    }
}

/// Reads the fields of one request body and collects coercion failures
pub struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    mode: Mode,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(
        body: &'a Map<String, Value>,
        mode: Mode,
        writable: &[&str],
        read_only: &[&str],
    ) -> Self {
        let mut errors = FieldErrors::new();
        for key in body.keys() {
            let key = key.as_str();
            if !writable.contains(&key) && !read_only.contains(&key) {
                errors.add(key, UNKNOWN_FIELD);
            }
        }

        Self { body, mode, errors }
    }

    /// A required field; in partial mode a missing value falls back to `current`
    pub fn required<T>(
        &mut self,
        name: &str,
        current: Option<T>,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match self.body.get(name) {
            Some(value) => self.parse(name, value, parse),
            None => match (self.mode, current) {
                (Mode::Partial, Some(current)) => Some(current),
                _ => {
                    self.errors.add(name, REQUIRED);
                    None
                }
            },
        }
    }

    /// An optional field; a missing value falls back to `current`, then `default`
    pub fn optional<T>(
        &mut self,
        name: &str,
        current: Option<T>,
        default: T,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match self.body.get(name) {
            Some(value) => self.parse(name, value, parse),
            None => match (self.mode, current) {
                (Mode::Create, _) | (_, None) => Some(default),
                (_, Some(current)) => Some(current),
            },
        }
    }

    fn parse<T>(
        &mut self,
        name: &str,
        value: &Value,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                self.errors.add(name, message);
                None
            }
        }
    }

    /// Errors recorded so far, including unknown fields
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        self.errors.into_result()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Text; numbers are accepted and rendered as text
pub fn text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) if s.contains('\0') => Err(NUL_CHARACTER.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Err(NOT_NULL.to_string()),
        _ => Err("Not a valid string.".to_string()),
    }
}

/// Nullable text; an empty string is stored as null
pub fn nullable_text(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        other => text(other).map(Some),
    }
}

/// 32-bit integer from a JSON integer or a numeric string
pub fn integer(value: &Value) -> Result<i32, String> {
    const INVALID: &str = "A valid integer is required.";

    let wide = match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e18 => f as i64,
            _ => return Err(INVALID.to_string()),
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| INVALID.to_string())?,
        Value::Null => return Err(NOT_NULL.to_string()),
        _ => return Err(INVALID.to_string()),
    };

    i32::try_from(wide).map_err(|_| {
        if wide > 0 {
            format!("Ensure this value is less than or equal to {}.", i32::MAX)
        } else {
            "Ensure this value is greater than or equal to 0.".to_string()
        }
    })
}

/// Decimal from a JSON number or a numeric string
pub fn decimal(value: &Value) -> Result<Decimal, String> {
    const INVALID: &str = "A valid number is required.";

    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Null => return Err(NOT_NULL.to_string()),
        _ => return Err(INVALID.to_string()),
    };

    // from_str would round digits past Decimal's precision away
    Decimal::from_str_exact(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| match plain_digits(&raw) {
            Some((significant, decimals)) => check_money_digits(significant, decimals)
                .err()
                .unwrap_or_else(|| INVALID.to_string()),
            None => INVALID.to_string(),
        })
}

/// Significant digits and decimal places of a plain `-123.4500` style number
fn plain_digits(raw: &str) -> Option<(u32, u32)> {
    let unsigned = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let whole = whole.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    let significant = if whole.is_empty() {
        fraction.trim_start_matches('0').len()
    } else {
        whole.len() + fraction.len()
    };

    Some((
        u32::try_from(significant).unwrap_or(u32::MAX),
        u32::try_from(fraction.len()).unwrap_or(u32::MAX),
    ))
}

/// Primary key of a related record
pub fn reference(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| format!("Incorrect type. Expected pk value, received {}.", type_name(value))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("Incorrect type. Expected pk value, received {}.", type_name(value))),
        Value::Null => Err(NOT_NULL.to_string()),
        other => Err(format!(
            "Incorrect type. Expected pk value, received {}.",
            type_name(other)
        )),
    }
}

/// Nullable primary key of a related record
pub fn nullable_reference(value: &Value) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        other => reference(other).map(Some),
    }
}

/// One of a fixed set of string choices
pub fn choice<T>(value: &Value) -> Result<T, String>
where
    T: FromStr,
    T::Err: ToString,
{
    match value {
        Value::String(s) => s.parse::<T>().map_err(|e| e.to_string()),
        Value::Null => Err(NOT_NULL.to_string()),
        other => Err(format!("\"{other}\" is not a valid choice.")),
    }
}
