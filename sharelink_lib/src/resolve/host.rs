use crate::config::{SettingObject, StreamSettings};
use crate::util::nonempty;

/// Advertised server address. First non-empty wins:
/// externalProxy destination, TLS server name, transport host of the
/// active network, then the inbound-level `domain`, `host` and `address`
/// fields, then the configured fallback domain.
pub fn server_host(
    stream: &StreamSettings,
    inbound_settings: &SettingObject,
    fallback_domain: &str,
) -> String {
    stream
        .external_proxy_dest()
        .or_else(|| nonempty(stream.tls.server_name.as_deref()))
        .or_else(|| {
            let host = stream.transport.host();
            if host.is_empty() {
                None
            } else {
                Some(host)
            }
        })
        .or_else(|| inbound_settings.text("domain"))
        .or_else(|| inbound_settings.text("host"))
        .or_else(|| inbound_settings.text("address"))
        .unwrap_or_else(|| fallback_domain.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SettingObject, StreamSettings};
    use serde_json::json;

    fn resolve(stream: serde_json::Value, settings: serde_json::Value) -> String {
        server_host(
            &StreamSettings::parse(Some(&stream)),
            &SettingObject::lenient(Some(&settings)),
            "fallback.example",
        )
    }

    #[test]
    fn precedence_ladder_selects_highest_nonempty() {
        // A config satisfying every fallback level at once.
        let full = json!({
            "network": "ws",
            "externalProxy": [{"dest": "proxy.example"}],
            "tlsSettings": {"serverName": "sni.example"},
            "wsSettings": {"host": "ws.example"}
        });
        let settings = json!({
            "domain": "domain.example",
            "host": "host.example",
            "address": "addr.example"
        });

        assert_eq!(resolve(full.clone(), settings.clone()), "proxy.example");

        let mut no_proxy = full.clone();
        no_proxy.as_object_mut().unwrap().remove("externalProxy");
        assert_eq!(resolve(no_proxy.clone(), settings.clone()), "sni.example");

        no_proxy.as_object_mut().unwrap().remove("tlsSettings");
        assert_eq!(resolve(no_proxy.clone(), settings.clone()), "ws.example");

        no_proxy.as_object_mut().unwrap().remove("wsSettings");
        assert_eq!(resolve(no_proxy.clone(), settings), "domain.example");

        assert_eq!(
            resolve(no_proxy.clone(), json!({"host": "host.example"})),
            "host.example"
        );
        assert_eq!(
            resolve(no_proxy.clone(), json!({"address": "addr.example"})),
            "addr.example"
        );
        assert_eq!(resolve(no_proxy, json!({})), "fallback.example");
    }

    #[test]
    fn tcp_http_header_host_is_advertised() {
        let stream = json!({
            "network": "tcp",
            "tcpSettings": {
                "header": {"type": "http"},
                "request": {"headers": {"Host": ["example.com"]}}
            }
        });
        assert_eq!(resolve(stream, json!({})), "example.com");
    }

    #[test]
    fn empty_levels_are_skipped() {
        let stream = json!({
            "network": "tcp",
            "externalProxy": [{"dest": ""}],
            "tlsSettings": {"serverName": ""}
        });
        assert_eq!(resolve(stream, json!({"domain": "d.example"})), "d.example");
    }
}
