use crate::config::StreamSettings;
use crate::util::{nonempty, option::NoneOrSome, render_value};

/// TLS parameters as flat query pairs. Each pair is omitted entirely when
/// the underlying field is absent.
pub fn tls_params(stream: &StreamSettings) -> Vec<(&'static str, String)> {
    let tls = &stream.tls;
    let mut out = Vec::new();

    if let Some(sni) = nonempty(tls.server_name.as_deref()) {
        out.push(("sni", sni));
    }
    // Persisted rows use either field name for the fingerprint.
    if let Some(fp) = nonempty(tls.fingerprint.as_deref())
        .or_else(|| nonempty(tls.fp.as_deref()))
    {
        out.push(("fp", fp));
    }
    if let Some(alpn) = join_alpn(&tls.alpn) {
        out.push(("alpn", alpn));
    }
    if let Some(allow) = tls
        .allow_insecure
        .as_ref()
        .or(tls.settings.allow_insecure.as_ref())
    {
        out.push(("allowInsecure", render_value(allow)));
    }

    out
}

/// Reality parameters as flat query pairs, each omitted when absent.
pub fn reality_params(stream: &StreamSettings) -> Vec<(&'static str, String)> {
    let reality = &stream.reality;
    let mut out = Vec::new();

    if let Some(pbk) = nonempty(reality.public_key.as_deref()) {
        out.push(("pbk", pbk));
    }
    if let Some(sid) = nonempty(reality.short_id.as_deref()) {
        out.push(("sid", sid));
    }
    if let Some(spx) = nonempty(reality.spider_x.as_deref()) {
        out.push(("spx", spx));
    }
    if let Some(fp) = nonempty(reality.fingerprint.as_deref()) {
        out.push(("fp", fp));
    }

    out
}

fn join_alpn(alpn: &NoneOrSome<String>) -> Option<String> {
    match alpn {
        NoneOrSome::One(value) => nonempty(Some(value.as_str())),
        NoneOrSome::Some(values) if !values.is_empty() => Some(values.join(",")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamSettings;
    use serde_json::json;

    fn stream(value: serde_json::Value) -> StreamSettings {
        StreamSettings::parse(Some(&value))
    }

    #[test]
    fn tls_params_collects_all_fields() {
        let s = stream(json!({
            "security": "tls",
            "tlsSettings": {
                "serverName": "sni.example",
                "fingerprint": "chrome",
                "alpn": ["h2", "http/1.1"],
                "allowInsecure": true
            }
        }));
        assert_eq!(
            tls_params(&s),
            vec![
                ("sni", "sni.example".to_string()),
                ("fp", "chrome".to_string()),
                ("alpn", "h2,http/1.1".to_string()),
                ("allowInsecure", "1".to_string()),
            ]
        );
    }

    #[test]
    fn tls_fingerprint_checks_both_field_names() {
        let s = stream(json!({"tlsSettings": {"fp": "firefox"}}));
        assert_eq!(tls_params(&s), vec![("fp", "firefox".to_string())]);
    }

    #[test]
    fn tls_alpn_string_passes_through() {
        let s = stream(json!({"tlsSettings": {"alpn": "h2"}}));
        assert_eq!(tls_params(&s), vec![("alpn", "h2".to_string())]);
    }

    #[test]
    fn tls_allow_insecure_found_in_nested_settings() {
        let s = stream(json!({"tlsSettings": {"settings": {"allowInsecure": false}}}));
        assert_eq!(tls_params(&s), vec![("allowInsecure", "0".to_string())]);
    }

    #[test]
    fn tls_params_empty_when_nothing_set() {
        assert!(tls_params(&stream(json!({"network": "tcp"}))).is_empty());
    }

    #[test]
    fn reality_params_collects_present_fields_only() {
        let s = stream(json!({
            "security": "reality",
            "realitySettings": {
                "publicKey": "pub",
                "shortId": "0123",
                "fingerprint": "chrome"
            }
        }));
        assert_eq!(
            reality_params(&s),
            vec![
                ("pbk", "pub".to_string()),
                ("sid", "0123".to_string()),
                ("fp", "chrome".to_string()),
            ]
        );
    }
}
