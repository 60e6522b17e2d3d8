//! # Validation Constraints
//!
//! Builders for the server-side validation constraints that can be attached
//! to object fields. The payload shapes mirror what the backend's
//! constraint endpoint expects.

use serde_json::{json, Value};

/// A named validation constraint with its parameter payload
#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub payload: Value,
}

impl Constraint {
    fn new(name: &str, payload: Value) -> Self {
        Constraint {
            name: name.to_string(),
            payload,
        }
    }

    /// Field must be present
    pub fn required() -> Self {
        Self::new("required", json!({"message": "messages.required"}))
    }

    /// Numeric minimum
    pub fn min(minimum: i64) -> Self {
        Self::new(
            "min",
            json!({"message": {"value": minimum, "message": "messages.min"}}),
        )
    }

    /// Numeric maximum
    pub fn max(maximum: i64) -> Self {
        Self::new(
            "max",
            json!({"message": {"value": maximum, "message": "messages.max"}}),
        )
    }

    /// Length bounds for strings and collections
    pub fn size(minimum: i64, maximum: i64) -> Self {
        Self::new(
            "size",
            json!({"message": {"min": minimum, "max": maximum, "message": "messages.size"}}),
        )
    }

    /// Digit bounds for numbers: integer and fractional parts
    pub fn digits(integer: i64, fraction: i64) -> Self {
        Self::new(
            "digits",
            json!({"message": {"integer": integer, "fraction": fraction, "message": "messages.digits"}}),
        )
    }

    /// Regular expression match
    pub fn pattern(regex: &str) -> Self {
        Self::new(
            "pattern",
            json!({"message": {"value": regex, "message": "messages.pattern"}}),
        )
    }

    /// Must be a valid email address
    pub fn email() -> Self {
        Self::new("email", json!({"message": "messages.email"}))
    }

    /// Must be false
    pub fn falsy() -> Self {
        Self::new("false", json!({"message": "messages.false"}))
    }

    /// Must be true
    pub fn truthy() -> Self {
        Self::new("true", json!({"message": "messages.true"}))
    }

    /// Must be a date in the future
    pub fn future() -> Self {
        Self::new("future", json!({"message": "messages.future"}))
    }

    /// Must be a date in the past
    pub fn past() -> Self {
        Self::new("past", json!({"message": "messages.past"}))
    }

    /// Must be a valid URL
    pub fn url() -> Self {
        Self::new("url", json!({"message": "messages.url"}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_payloads() {
        let c = Constraint::required();
        assert_eq!(c.name, "required");
        assert_eq!(c.payload["message"], "messages.required");

        let c = Constraint::size(2, 10);
        assert_eq!(c.name, "size");
        assert_eq!(c.payload["message"]["min"], 2);
        assert_eq!(c.payload["message"]["max"], 10);

        let c = Constraint::pattern("[a-z]+");
        assert_eq!(c.payload["message"]["value"], "[a-z]+");
    }
}
