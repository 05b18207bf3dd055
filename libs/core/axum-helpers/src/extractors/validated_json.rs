//! JSON extractor with validation through the `validator` crate.

use crate::errors::{CODE_JSON_EXTRACTION, CODE_VALIDATION, ErrorResponse};
use axum::{
    extract::{FromRequest, Json, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Deserializes the body and runs `Validate::validate` on it.
///
/// Handlers that need their own error body can take
/// `Result<ValidatedJson<T>, ValidationRejection>` instead.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct Signup {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn signup(ValidatedJson(payload): ValidatedJson<Signup>) -> String {
///     payload.email
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[derive(Debug, Error)]
pub enum ValidationRejection {
    #[error("{0}")]
    Json(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl ValidationRejection {
    /// `"<field>: <message>"` for the first failing field, fields in
    /// alphabetical order and named as they appear in the JSON body
    /// (camelCase). For body-parsing failures, the parser's message.
    pub fn summary(&self) -> String {
        match self {
            ValidationRejection::Json(rejection) => rejection.body_text(),
            ValidationRejection::Invalid(errors) => {
                let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));

                fields
                    .into_iter()
                    .find_map(|(field, errs)| {
                        errs.first().map(|err| {
                            let message = err
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| err.code.to_string());
                            format!("{}: {}", camel_case(&field), message)
                        })
                    })
                    .unwrap_or_else(|| "Request validation failed".to_string())
            }
        }
    }
}

// Assumes request bodies use `#[serde(rename_all = "camelCase")]`. A
// per-field `#[serde(rename = ...)]` is not visible here and would be
// reported under the Rust name.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        let body = match &self {
            ValidationRejection::Json(_) => {
                ErrorResponse::new(CODE_JSON_EXTRACTION, "BadRequest", self.summary())
            }
            ValidationRejection::Invalid(errors) => {
                ErrorResponse::new(CODE_VALIDATION, "BadRequest", "Request validation failed")
                    .with_details(serde_json::to_value(errors).unwrap_or_default())
            }
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Signup {
        #[validate(email(message = "Email should be valid"))]
        to_email: String,
        #[validate(length(min = 1, message = "Name is mandatory"))]
        name: String,
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("to_email"), "toEmail");
        assert_eq!(camel_case("user_name"), "userName");
        assert_eq!(camel_case("subject"), "subject");
        assert_eq!(camel_case("reply_to_address"), "replyToAddress");
    }

    #[test]
    fn test_summary_reports_first_field_alphabetically() {
        let input = Signup {
            to_email: "nope".to_string(),
            name: String::new(),
        };
        let rejection = ValidationRejection::from(input.validate().unwrap_err());

        assert_eq!(rejection.summary(), "name: Name is mandatory");
    }

    #[test]
    fn test_summary_uses_wire_field_names() {
        let input = Signup {
            to_email: "nope".to_string(),
            name: "Ann".to_string(),
        };
        let rejection = ValidationRejection::from(input.validate().unwrap_err());

        assert_eq!(rejection.summary(), "toEmail: Email should be valid");
    }
}
