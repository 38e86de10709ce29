//! Sale request bodies

use serde_json::{Map, Value};

use super::{FieldReader, Mode, decimal, reference};
use crate::{
    models::{Sale, SaleDraft, money},
    validation::{FieldErrors, validate_sale},
};

const WRITABLE: &[&str] = &["car", "owner", "sale_price"];
const READ_ONLY: &[&str] = &["id", "sale_date"];

/// Build a validated sale draft from a request body
///
/// Whether `car` and `owner` exist is checked by the repository inside the
/// write transaction.
pub fn sale_draft(
    body: &Map<String, Value>,
    mode: Mode,
    current: Option<&Sale>,
) -> Result<SaleDraft, FieldErrors> {
    let base = current.map(Sale::draft);
    let base = base.as_ref();
    let mut reader = FieldReader::new(body, mode, WRITABLE, READ_ONLY);

    let car = reader.required("car", base.map(|b| b.car), reference);
    let owner = reader.required("owner", base.map(|b| b.owner), reference);
    let sale_price = reader.required("sale_price", base.map(|b| b.sale_price), decimal);

    let mut draft = match (car, owner, sale_price) {
        (Some(car), Some(owner), Some(sale_price)) => SaleDraft {
            car,
            owner,
            sale_price,
        },
        _ => return Err(reader.into_errors()),
    };
    reader.finish()?;

    validate_sale(&draft)?;
    draft.sale_price = money(draft.sale_price);

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sale_date_in_body_is_ignored() {
        let body = json!({
            "car": 1,
            "owner": "2",
            "sale_price": 15000.5,
            "sale_date": "1999-01-01T00:00:00Z"
        });
        let draft = sale_draft(body.as_object().unwrap(), Mode::Create, None).unwrap();
        assert_eq!(draft.car, 1);
        assert_eq!(draft.owner, 2);
        assert_eq!(draft.sale_price.to_string(), "15000.50");
    }

    #[test]
    fn null_references_are_rejected() {
        let body = json!({"car": null, "owner": 1, "sale_price": "10"});
        let errors = sale_draft(body.as_object().unwrap(), Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("car"),
            Some(&["This field may not be null.".to_string()][..])
        );
    }
}
