//! Owner request bodies

use serde_json::{Map, Value};

use super::{FieldReader, Mode, text};
use crate::{
    models::{Owner, OwnerDraft},
    validation::{FieldErrors, validate_owner},
};

const WRITABLE: &[&str] = &["name", "contact_info", "address"];
const READ_ONLY: &[&str] = &["id"];

/// Build a validated owner draft from a request body
pub fn owner_draft(
    body: &Map<String, Value>,
    mode: Mode,
    current: Option<&Owner>,
) -> Result<OwnerDraft, FieldErrors> {
    let base = current.map(Owner::draft);
    let base = base.as_ref();
    let mut reader = FieldReader::new(body, mode, WRITABLE, READ_ONLY);

    let name = reader.required("name", base.map(|b| b.name.clone()), text);
    let contact_info = reader.required("contact_info", base.map(|b| b.contact_info.clone()), text);
    let address = reader.optional("address", base.map(|b| b.address.clone()), String::new(), text);

    let draft = match (name, contact_info, address) {
        (Some(name), Some(contact_info), Some(address)) => OwnerDraft {
            name,
            contact_info,
            address,
        },
        _ => return Err(reader.into_errors()),
    };
    reader.finish()?;

    validate_owner(&draft)?;

    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn address_defaults_to_blank() {
        let body = json!({"name": "Marco Rossi", "contact_info": "marco@example.it"});
        let draft = owner_draft(body.as_object().unwrap(), Mode::Create, None).unwrap();
        assert_eq!(draft.address, "");
    }

    #[test]
    fn contact_info_must_be_an_email() {
        let body = json!({"name": "Marco Rossi", "contact_info": "555-0100"});
        let errors = owner_draft(body.as_object().unwrap(), Mode::Create, None).unwrap_err();
        assert_eq!(
            errors.get("contact_info"),
            Some(&["Enter a valid email address.".to_string()][..])
        );
    }
}
