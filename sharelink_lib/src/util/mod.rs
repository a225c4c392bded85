pub mod option;

use serde_json::Value;

/// Render a loosely-typed JSON scalar the way query parameters expect it:
/// booleans become `"1"`/`"0"`, null becomes empty, everything else is
/// stringified without surrounding quotes.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn nonempty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_value_normalizes_booleans() {
        assert_eq!(render_value(&json!(true)), "1");
        assert_eq!(render_value(&json!(false)), "0");
        assert_eq!(render_value(&json!(null)), "");
        assert_eq!(render_value(&json!("chrome")), "chrome");
        assert_eq!(render_value(&json!(8443)), "8443");
    }

    #[test]
    fn nonempty_drops_empty_strings() {
        assert_eq!(nonempty(Some("")), None);
        assert_eq!(nonempty(None), None);
        assert_eq!(nonempty(Some("x")), Some("x".to_string()));
    }
}
