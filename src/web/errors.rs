use std::collections::BTreeMap;

use log::{debug, error};
use rocket::http::Status;
use rocket::response::{self, Redirect, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use serde::Serialize;

use crate::{Config, FieldError, FormField, NotesError};

/// Validation messages keyed by form field.
pub type FormErrors = BTreeMap<FormField, Vec<String>>;

pub fn form_errors(error: FieldError) -> FormErrors {
    let mut errors = FormErrors::new();
    errors.entry(error.field).or_default().push(error.message);
    errors
}

/// Splits a validation failure off from every other error.
pub fn into_field_error(error: NotesError) -> Result<FieldError, WebError> {
    match error {
        NotesError::Validation { field, message } => Ok(FieldError { field, message }),
        other => Err(WebError(other)),
    }
}

#[derive(Serialize)]
struct ErrorPage {
    errors: FormErrors,
}

/// Login URL with `next` pointing back at `target`.
pub fn login_redirect(login_url: &str, target: &str) -> String {
    format!("{}?next={}", login_url, encode_query_value(target))
}

/// Percent-encodes a query value, leaving `/` readable.
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Service errors as HTTP responses.
#[derive(Debug)]
pub struct WebError(pub NotesError);

impl From<NotesError> for WebError {
    fn from(error: NotesError) -> Self {
        WebError(error)
    }
}

impl<'r> Responder<'r, 'static> for WebError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        match self.0 {
            NotesError::AuthenticationRequired => {
                let login_url = request
                    .rocket()
                    .state::<Config>()
                    .map(|config| config.login_url.clone())
                    .unwrap_or_else(|| Config::default().login_url);
                let target = login_redirect(&login_url, &request.uri().to_string());
                debug!("Sending anonymous request for {} to {}", request.uri(), target);
                Redirect::found(target).respond_to(request)
            }
            NotesError::NotFound => Err(Status::NotFound),
            NotesError::Validation { field, message } => (
                Status::UnprocessableEntity,
                Json(ErrorPage {
                    errors: form_errors(FieldError { field, message }),
                }),
            )
                .respond_to(request),
            NotesError::InvalidCredentials => Err(Status::Unauthorized),
            other => {
                error!("Request for {} failed: {}", request.uri(), other);
                Err(Status::InternalServerError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_keeps_slashes() {
        assert_eq!(
            login_redirect("/auth/login", "/edit/some-slug"),
            "/auth/login?next=/edit/some-slug"
        );
    }

    #[test]
    fn next_escapes_query_characters() {
        assert_eq!(
            login_redirect("/auth/login", "/notes?a=b&c"),
            "/auth/login?next=/notes%3Fa%3Db%26c"
        );
    }

    #[test]
    fn form_errors_are_keyed_by_field() {
        let errors = form_errors(FieldError {
            field: FormField::Slug,
            message: "taken".into(),
        });
        assert_eq!(errors[&FormField::Slug], vec!["taken".to_string()]);
    }
}
