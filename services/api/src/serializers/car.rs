//! Car request bodies

use serde_json::{Map, Value};

use super::{FieldReader, Mode, choice, decimal, integer, nullable_reference, nullable_text, text};
use crate::{
    models::{Car, CarDraft, Condition, money},
    validation::{FieldErrors, validate_car},
};

const WRITABLE: &[&str] = &[
    "make",
    "model",
    "year",
    "vin",
    "mileage",
    "price",
    "features",
    "condition",
    "image",
    "owner",
];
const READ_ONLY: &[&str] = &["id", "created_at", "updated_at"];

/// Build a validated car draft from a request body
///
/// `current` is the stored car for PUT and PATCH requests.
pub fn car_draft(
    body: &Map<String, Value>,
    mode: Mode,
    current: Option<&Car>,
) -> Result<CarDraft, FieldErrors> {
    let base = current.map(Car::draft);
    let base = base.as_ref();
    let mut reader = FieldReader::new(body, mode, WRITABLE, READ_ONLY);

    let make = reader.required("make", base.map(|b| b.make.clone()), text);
    let model = reader.required("model", base.map(|b| b.model.clone()), text);
    let year = reader.required("year", base.map(|b| b.year), integer);
    let vin = reader.required("vin", base.map(|b| b.vin.clone()), text);
    let mileage = reader.required("mileage", base.map(|b| b.mileage), integer);
    let price = reader.required("price", base.map(|b| b.price), decimal);
    let condition = reader.required("condition", base.map(|b| b.condition), choice::<Condition>);
    let features = reader.optional(
        "features",
        base.map(|b| b.features.clone()),
        String::new(),
        text,
    );
    let image = reader.optional("image", base.map(|b| b.image.clone()), None, nullable_text);
    let owner = reader.optional("owner", base.map(|b| b.owner), None, nullable_reference);

    let mut draft = match (
        make, model, year, vin, mileage, price, condition, features, image, owner,
    ) {
        (
            Some(make),
            Some(model),
            Some(year),
            Some(vin),
            Some(mileage),
            Some(price),
            Some(condition),
            Some(features),
            Some(image),
            Some(owner),
        ) => CarDraft {
            make,
            model,
            year,
            vin,
            mileage,
            price,
            features,
            condition,
            image,
            owner,
        },
        _ => return Err(reader.into_errors()),
    };
    reader.finish()?;

    validate_car(&draft)?;
    draft.price = money(draft.price);

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn giulia() -> Map<String, Value> {
        body(json!({
            "make": "Alfa Romeo",
            "model": "Giulia Sprint GT",
            "year": 1965,
            "vin": "AR10502-0001",
            "mileage": 84000,
            "price": "42000",
            "condition": "classic"
        }))
    }

    #[test]
    fn create_fills_defaults_and_scales_price() {
        let draft = car_draft(&giulia(), Mode::Create, None).unwrap();
        assert_eq!(draft.features, "");
        assert_eq!(draft.image, None);
        assert_eq!(draft.owner, None);
        assert_eq!(draft.condition, Condition::Classic);
        assert_eq!(draft.price.to_string(), "42000.00");
    }

    #[test]
    fn create_reports_every_missing_field() {
        let errors = car_draft(&body(json!({"make": "Fiat"})), Mode::Create, None).unwrap_err();
        for field in ["model", "year", "vin", "mileage", "price", "condition"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("make"));
    }

    #[test]
    fn invalid_condition_is_rejected() {
        let mut input = giulia();
        input.insert("condition".to_string(), json!("mint"));
        let errors = car_draft(&input, Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("condition"),
            Some(&["\"mint\" is not a valid choice.".to_string()][..])
        );
    }

    #[test]
    fn negative_mileage_is_rejected() {
        let mut input = giulia();
        input.insert("mileage".to_string(), json!(-5));
        let errors = car_draft(&input, Mode::Create, None).unwrap_err();
        assert!(errors.contains("mileage"));
    }

    #[test]
    fn partial_keeps_current_values() {
        let now = Utc::now();
        let current = car_draft(&giulia(), Mode::Create, None)
            .unwrap()
            .into_car(3, now, now);

        let draft = car_draft(&body(json!({"price": 39500})), Mode::Partial, Some(&current)).unwrap();
        assert_eq!(draft.price.to_string(), "39500.00");
        assert_eq!(draft.make, current.make);
        assert_eq!(draft.vin, current.vin);
        assert_eq!(draft.mileage, current.mileage);
    }

    #[test]
    fn replace_still_requires_every_required_field() {
        let now = Utc::now();
        let current = car_draft(&giulia(), Mode::Create, None)
            .unwrap()
            .into_car(3, now, now);

        let errors =
            car_draft(&body(json!({"price": 39500})), Mode::Replace, Some(&current)).unwrap_err();
        assert!(errors.contains("make"));
        assert!(!errors.contains("price"));
    }
}
