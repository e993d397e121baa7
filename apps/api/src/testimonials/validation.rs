//! Turns a raw submission body into a `NewTestimonial`.
//!
//! Presence checks use truthiness: `null`, `false`, `0`, `NaN` and `""` count as
//! missing. `rating` may be omitted entirely (defaulting to 5), but a `rating`
//! that is supplied and falsy is rejected like a missing `name`.
//! Note that this rejects a literal `0` rating.

use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::models::testimonial::NewTestimonial;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Name, message, and rating are required";
pub const DEFAULT_RATING: i32 = 5;

/// Parses and validates a JSON request body.
pub fn parse_submission(body: &[u8]) -> Result<NewTestimonial, AppError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AppError::MalformedBody(e.to_string()))?;

    match value {
        Value::Object(fields) => validate_submission(&fields),
        _ => Err(AppError::MalformedBody(
            "request body must be a JSON object".to_string(),
        )),
    }
}

pub fn validate_submission(fields: &Map<String, Value>) -> Result<NewTestimonial, AppError> {
    let name = fields.get("name").and_then(truthy_text);
    let message = fields.get("message").and_then(truthy_text);
    let rating_present = fields.get("rating").map_or(true, is_truthy);

    let (Some(name), Some(message), true) = (name, message, rating_present) else {
        return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
    };

    Ok(NewTestimonial {
        name,
        position: fields.get("position").and_then(truthy_text),
        company: fields.get("company").and_then(truthy_text),
        message,
        rating: coerce_rating(fields.get("rating")),
    })
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text of a truthy value; non-strings keep their JSON rendering.
fn truthy_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Integer-parses `rating`, falling back to `DEFAULT_RATING` for anything that is
/// missing, unparseable, or not a positive 32-bit integer.
pub fn coerce_rating(value: Option<&Value>) -> i32 {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => parse_leading_int(s),
        _ => None,
    };

    parsed
        .filter(|n| *n > 0)
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(DEFAULT_RATING)
}

/// Reads an optionally signed integer prefix (`"4 stars"` → 4, `"0x1f"` → 31),
/// ignoring leading whitespace and anything after the digits.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        _ => (10, s),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = i64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(body: Value) -> Result<NewTestimonial, AppError> {
        match body {
            Value::Object(fields) => validate_submission(&fields),
            _ => panic!("test body must be an object"),
        }
    }

    fn assert_required_error(result: Result<NewTestimonial, AppError>) {
        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, REQUIRED_FIELDS_MESSAGE),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_full_submission() {
        let t = validate(json!({
            "name": "Ana",
            "position": "CTO",
            "company": "Acme",
            "message": "Great service",
            "rating": 4
        }))
        .unwrap();
        assert_eq!(t.name, "Ana");
        assert_eq!(t.position.as_deref(), Some("CTO"));
        assert_eq!(t.company.as_deref(), Some("Acme"));
        assert_eq!(t.message, "Great service");
        assert_eq!(t.rating, 4);
    }

    #[test]
    fn test_missing_rating_defaults_to_five() {
        let t = validate(json!({"name": "Ana", "message": "Great service"})).unwrap();
        assert_eq!(t.rating, 5);
        assert!(t.position.is_none());
        assert!(t.company.is_none());
    }

    #[test]
    fn test_non_numeric_rating_defaults_to_five() {
        let t = validate(json!({"name": "Ana", "message": "Hi", "rating": "excellent"})).unwrap();
        assert_eq!(t.rating, 5);
    }

    #[test]
    fn test_string_rating_parsed() {
        let t = validate(json!({"name": "Ana", "message": "Hi", "rating": "3"})).unwrap();
        assert_eq!(t.rating, 3);
    }

    #[test]
    fn test_missing_name_rejected() {
        assert_required_error(validate(json!({"message": "no name"})));
    }

    #[test]
    fn test_empty_message_rejected() {
        assert_required_error(validate(json!({"name": "Ana", "message": ""})));
    }

    #[test]
    fn test_null_name_rejected() {
        assert_required_error(validate(json!({"name": null, "message": "Hi"})));
    }

    #[test]
    fn test_zero_rating_rejected() {
        assert_required_error(validate(json!({"name": "Ana", "message": "Hi", "rating": 0})));
    }

    #[test]
    fn test_empty_string_rating_rejected() {
        assert_required_error(validate(json!({"name": "Ana", "message": "Hi", "rating": ""})));
    }

    #[test]
    fn test_empty_optional_fields_become_null() {
        let t = validate(json!({
            "name": "Ana",
            "message": "Hi",
            "position": "",
            "company": null
        }))
        .unwrap();
        assert!(t.position.is_none());
        assert!(t.company.is_none());
    }

    #[test]
    fn test_coerce_rating_variants() {
        assert_eq!(coerce_rating(None), 5);
        assert_eq!(coerce_rating(Some(&json!(4.7))), 4);
        assert_eq!(coerce_rating(Some(&json!(0.5))), 5);
        assert_eq!(coerce_rating(Some(&json!(" 2 stars"))), 2);
        assert_eq!(coerce_rating(Some(&json!("0x3"))), 3);
        assert_eq!(coerce_rating(Some(&json!(-3))), 5);
        assert_eq!(coerce_rating(Some(&json!("-3"))), 5);
        assert_eq!(coerce_rating(Some(&json!(true))), 5);
        assert_eq!(coerce_rating(Some(&json!(9_999_999_999i64))), 5);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("+7x"), Some(7));
        assert_eq!(parse_leading_int("-12"), Some(-12));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("0x"), None);
    }

    #[test]
    fn test_malformed_json_body() {
        assert!(matches!(
            parse_submission(b"{not json"),
            Err(AppError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_submission(b"[1, 2]"),
            Err(AppError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_parse_submission_accepts_object() {
        let t = parse_submission(br#"{"name":"Ana","message":"Great service","rating":4}"#).unwrap();
        assert_eq!(t.rating, 4);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(-1)));
    }
}
