//! Visitor form submission.
//!
//! Accepts either a JSON object or an urlencoded HTML form post. A request
//! without a `Content-Type` carries no fields. Field presence is checked in
//! [`Submission::validate`], not during decoding, so a missing field is a
//! `MissingField` error rather than a decode error.

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde_json::Value;

use crate::http::response::ApiError;
use crate::profile::Visitor;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Raw, unvalidated form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub name: Option<String>,
    /// Age as submitted; JSON numbers are carried as their text.
    pub age: Option<String>,
}

impl Submission {
    pub fn from_json(value: &Value) -> Self {
        let name = value.get("name").and_then(Value::as_str).map(str::to_string);
        let age = match value.get("age") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self { name, age }
    }

    pub fn from_form(mut fields: HashMap<String, String>) -> Self {
        Self {
            name: fields.remove("name"),
            age: fields.remove("age"),
        }
    }

    /// Check both fields and produce a [`Visitor`] with a trimmed name.
    pub fn validate(self) -> Result<Visitor, ApiError> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ApiError::MissingField)?;
        let age = self
            .age
            .as_deref()
            .and_then(parse_age)
            .ok_or(ApiError::MissingField)?;

        Ok(Visitor {
            name: name.to_string(),
            age,
        })
    }
}

/// Leading-integer parse: optional whitespace and `+`, then digits. Anything
/// after the digits is ignored ("30 years" → 30, "30.9" → 30). Zero is rejected,
/// as is anything past `u64::MAX`.
pub fn parse_age(raw: &str) -> Option<u64> {
    let s = raw.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s[..end].parse::<u64>().ok().filter(|age| *age > 0)
}

/// Keep the extractor's 413 for oversized streamed bodies; every other
/// rejection is an undecodable body.
fn body_error(status: StatusCode, detail: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::InvalidBody(detail)
    }
}

impl<S: Send + Sync> FromRequest<S> for Submission {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = match req.headers().get(CONTENT_TYPE) {
            Some(value) => value.to_str().unwrap_or_default(),
            None => return Ok(Self::default()),
        };

        if content_type.starts_with(FORM_CONTENT_TYPE) {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            Ok(Self::from_form(fields))
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| body_error(e.status(), e.body_text()))?;
            Ok(Self::from_json(&value))
        }
    }
}
