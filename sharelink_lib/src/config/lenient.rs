use serde_json::{Map, Value};

/// Normalize a persisted config blob into a key/value mapping.
///
/// Rows store `settings` and `streamSettings` either as a JSON object, as a
/// JSON-encoded string, or as a quasi-JSON string with single quotes. This
/// is the single point where malformed persisted data is absorbed: whatever
/// comes in, an object comes out, possibly empty. It never fails.
pub(crate) fn lenient_object(value: Option<&Value>) -> Map<String, Value> {
    let Some(value) = value else {
        return Map::new();
    };

    match value {
        Value::Object(map) => map.clone(),
        Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Map::new();
            }
            if let Some(map) = parse_object(trimmed) {
                return map;
            }
            // Second stage: some rows were written with single-quoted keys.
            if let Some(map) = parse_object(&trimmed.replace('\'', "\"")) {
                tracing::debug!("recovered config blob after quote repair");
                return map;
            }
            tracing::debug!("discarding malformed config blob");
            Map::new()
        }
        _ => Map::new(),
    }
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
