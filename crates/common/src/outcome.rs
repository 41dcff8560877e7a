use serde::Serialize;
use serde_json::Value;

/// Ordered string-keyed bag of JSON values.
pub type Fields = serde_json::Map<String, Value>;

/// Uniform success/failure envelope returned by every orchestration layer.
///
/// A successful outcome never carries an error message and a failed one
/// always does. The fields are private so that invariant holds for every
/// value in circulation.
///
/// `meta` is additive: keys can be added or overwritten, never removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    ok: bool,
    payload: Fields,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    meta: Fields,
}

impl Outcome {
    /// Creates a successful outcome carrying `payload`.
    pub fn success(payload: Fields) -> Self {
        Self {
            ok: true,
            payload,
            error_message: None,
            meta: Fields::new(),
        }
    }

    /// Creates a failed outcome with the given error message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            payload: Fields::new(),
            error_message: Some(message.into()),
            meta: Fields::new(),
        }
    }

    /// Adds or overwrites a payload entry.
    pub fn with_payload(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Adds or overwrites a meta entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    /// Merges `additional` into meta, overwriting keys that already exist.
    pub fn merge_meta(mut self, additional: Fields) -> Self {
        self.meta.extend(additional);
        self
    }

    pub fn is_success(&self) -> bool {
        self.ok
    }

    pub fn is_failure(&self) -> bool {
        !self.ok
    }

    pub fn payload(&self) -> &Fields {
        &self.payload
    }

    pub fn meta(&self) -> &Fields {
        &self.meta
    }

    /// Returns the error message; `None` exactly when the outcome is a success.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns a payload entry as a string slice, if it is a JSON string.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Returns a meta entry as a string slice, if it is a JSON string.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }

    /// Returns true only if `key` is present in meta and holds JSON `true`.
    pub fn meta_flag(&self, key: &str) -> bool {
        matches!(self.meta.get(key), Some(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn success_has_no_error_message() {
        let outcome = Outcome::success(payload(json!({ "marketplace_id": "12345" })));
        assert!(outcome.is_success());
        assert!(!outcome.is_failure());
        assert!(outcome.error_message().is_none());
        assert_eq!(outcome.payload_str("marketplace_id"), Some("12345"));
    }

    #[test]
    fn failure_always_has_error_message() {
        let outcome = Outcome::failure("boom");
        assert!(outcome.is_failure());
        assert_eq!(outcome.error_message(), Some("boom"));
        assert!(outcome.payload().is_empty());
    }

    #[test]
    fn meta_is_additive_and_overwrites() {
        let outcome = Outcome::failure("boom")
            .with_meta("marketplace", "provider_b")
            .with_meta("status_code", 500)
            .merge_meta(payload(json!({ "status_code": 503, "recoverable": true })));

        assert_eq!(outcome.meta_str("marketplace"), Some("provider_b"));
        assert_eq!(outcome.meta()["status_code"], json!(503));
        assert!(outcome.meta_flag("recoverable"));
        assert_eq!(outcome.meta().len(), 3);
    }

    #[test]
    fn meta_flag_requires_literal_true() {
        let outcome = Outcome::failure("boom")
            .with_meta("recoverable", "true")
            .with_meta("other", false);
        assert!(!outcome.meta_flag("recoverable"));
        assert!(!outcome.meta_flag("other"));
        assert!(!outcome.meta_flag("missing"));
    }

    #[test]
    fn serializes_without_error_message_on_success() {
        let outcome = Outcome::success(Fields::new());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, json!({ "ok": true, "payload": {}, "meta": {} }));
    }

    #[test]
    fn serializes_error_message_on_failure() {
        let outcome = Outcome::failure("some marketplaces failed").with_meta("partial_success", true);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["ok"], json!(false));
        assert_eq!(json["error_message"], json!("some marketplaces failed"));
        assert_eq!(json["meta"]["partial_success"], json!(true));
    }
}
