use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::config::def::{Client, ParsedInbound};
use crate::resolve::host;
use crate::util::nonempty;

use super::link_tag;

/// Shadowsocks needs both a cipher method and a password, from the client
/// record or the inbound-level settings. When either is missing there is
/// no link to build and `None` is returned; that is an expected state, not
/// an error.
pub fn build_ss(client: &Client, inbound: &ParsedInbound, fallback_domain: &str) -> Option<String> {
    let method =
        nonempty(client.method.as_deref()).or_else(|| inbound.settings.text("method"))?;
    let password =
        nonempty(client.password.as_deref()).or_else(|| inbound.settings.text("password"))?;

    let server = host::server_host(&inbound.stream, &inbound.settings, fallback_domain);
    let userinfo = URL_SAFE_NO_PAD.encode(format!("{method}:{password}"));
    let tag = link_tag(client, inbound);
    let port = &inbound.port;

    Some(format!("ss://{userinfo}@{server}:{port}#{tag}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::def::Inbound;
    use serde_json::json;

    fn inbound(value: serde_json::Value) -> ParsedInbound {
        serde_json::from_value::<Inbound>(value).expect("inbound row").parse()
    }

    #[test]
    fn userinfo_decodes_back_to_method_and_password() {
        let parsed = inbound(json!({
            "protocol": "shadowsocks",
            "port": 8388,
            "settings": {"method": "aes-256-gcm", "password": "p@ss"},
            "stream_settings": {"network": "tcp", "externalProxy": [{"dest": "h.example"}]}
        }));
        let client = Client {
            email: Some("u2".to_string()),
            ..Default::default()
        };

        let link = build_ss(&client, &parsed, "localhost").expect("link");
        let expected_userinfo = URL_SAFE_NO_PAD.encode("aes-256-gcm:p@ss");
        assert_eq!(link, format!("ss://{expected_userinfo}@h.example:8388#u2"));

        let decoded = URL_SAFE_NO_PAD
            .decode(link.split("//").nth(1).unwrap().split('@').next().unwrap())
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "aes-256-gcm:p@ss");
    }

    #[test]
    fn client_credentials_override_inbound_settings() {
        let parsed = inbound(json!({
            "protocol": "shadowsocks",
            "port": 8388,
            "settings": {"method": "aes-256-gcm", "password": "inbound-pass"}
        }));
        let client = Client {
            method: Some("chacha20-ietf-poly1305".to_string()),
            password: Some("client-pass".to_string()),
            ..Default::default()
        };

        let link = build_ss(&client, &parsed, "localhost").expect("link");
        let userinfo = link.split("//").nth(1).unwrap().split('@').next().unwrap();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(userinfo).unwrap()).unwrap();
        assert_eq!(decoded, "chacha20-ietf-poly1305:client-pass");
    }

    #[test]
    fn missing_method_or_password_yields_no_link() {
        let no_password = inbound(json!({
            "protocol": "shadowsocks",
            "port": 8388,
            "settings": {"method": "aes-256-gcm"}
        }));
        assert!(build_ss(&Client::default(), &no_password, "localhost").is_none());

        let no_method = inbound(json!({
            "protocol": "shadowsocks",
            "port": 8388,
            "settings": {"password": "p"}
        }));
        assert!(build_ss(&Client::default(), &no_method, "localhost").is_none());

        let empty_values = inbound(json!({
            "protocol": "shadowsocks",
            "port": 8388,
            "settings": {"method": "", "password": ""}
        }));
        assert!(build_ss(&Client::default(), &empty_values, "localhost").is_none());
    }
}
