//! User account request bodies

use serde_json::{Map, Value};

use super::{FieldReader, Mode, text};
use crate::{
    models::{User, UserDraft},
    validation::{FieldErrors, validate_user},
};

const WRITABLE: &[&str] = &["username", "email"];
const READ_ONLY: &[&str] = &["id", "created_at", "updated_at"];

/// Build a validated user draft from a request body
pub fn user_draft(
    body: &Map<String, Value>,
    mode: Mode,
    current: Option<&User>,
) -> Result<UserDraft, FieldErrors> {
    let base = current.map(User::draft);
    let base = base.as_ref();
    let mut reader = FieldReader::new(body, mode, WRITABLE, READ_ONLY);

    let username = reader.required("username", base.map(|b| b.username.clone()), text);
    let email = reader.optional("email", base.map(|b| b.email.clone()), String::new(), text);

    let draft = match (username, email) {
        (Some(username), Some(email)) => UserDraft { username, email },
        _ => return Err(reader.into_errors()),
    };
    reader.finish()?;

    validate_user(&draft)?;

    Ok(draft)
}
