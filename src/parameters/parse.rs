use serde_json::Value;

/// Parse a user-entered parameter value.
///
/// Strict JSON is tried first, so `42` stays a number and `true` a boolean.
/// Otherwise the input is read as a bare string (`English` -> `"English"`),
/// unless it contains JSON brackets, in which case it was meant as JSON and
/// is rejected.
pub fn parse_lenient(input: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(input) {
        return Some(value);
    }
    if input.contains(['{', '}', '[', ']']) {
        return None;
    }
    serde_json::from_str(&format!("\"{input}\"")).ok()
}

/// Render a value the way it is pre-filled in the edit prompt.
pub fn render(value: &Value) -> String {
    value.to_string()
}

/// Whether a committed value asks for the key to be removed.
pub fn is_delete_sentinel(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}
