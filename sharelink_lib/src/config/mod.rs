use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::util::{nonempty, option::NoneOrSome, render_value};

pub mod def;

mod lenient;

/// Stream framing declared by `streamSettings.network`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network {
    Tcp,
    Ws,
    Grpc,
    Kcp,
    Quic,
    Http,
    Xhttp,
    Other(String),
}

impl Network {
    pub fn parse(value: Option<&str>) -> Self {
        let normalized = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "tcp".to_string());

        match normalized.as_str() {
            "tcp" => Network::Tcp,
            "ws" => Network::Ws,
            "grpc" => Network::Grpc,
            "kcp" => Network::Kcp,
            "quic" => Network::Quic,
            "http" => Network::Http,
            "xhttp" => Network::Xhttp,
            _ => Network::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Network::Tcp => "tcp",
            Network::Ws => "ws",
            Network::Grpc => "grpc",
            Network::Kcp => "kcp",
            Network::Quic => "quic",
            Network::Http => "http",
            Network::Xhttp => "xhttp",
            Network::Other(s) => s,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Tcp
    }
}

/// Security layer declared by `streamSettings.security`. Anything
/// unrecognized normalizes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    Tls,
    Reality,
    Xtls,
    #[default]
    None,
}

impl Security {
    pub fn parse(value: Option<&str>) -> Self {
        let normalized = value
            .map(str::trim)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match normalized.as_str() {
            "tls" => Security::Tls,
            "reality" => Security::Reality,
            "xtls" => Security::Xtls,
            _ => Security::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Security::Tls => "tls",
            Security::Reality => "reality",
            Security::Xtls => "xtls",
            Security::None => "none",
        }
    }
}

/// A leniently-parsed settings object. Accessors never fail; absent or
/// mistyped fields simply read as missing.
#[derive(Debug, Clone, Default)]
pub struct SettingObject(Map<String, Value>);

impl SettingObject {
    pub fn lenient(value: Option<&Value>) -> Self {
        SettingObject(lenient::lenient_object(value))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Non-empty scalar field rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .map(render_value)
            .filter(|v| !v.is_empty())
    }

    /// The `clients` array, entry-by-entry lenient: entries that do not
    /// look like a client record are skipped.
    pub fn clients(&self) -> Vec<def::Client> {
        self.0
            .get("clients")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn section<T>(&self, key: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        self.0
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HeaderSettings {
    #[serde(rename = "type")]
    pub header_type: Option<String>,
}

impl HeaderSettings {
    pub fn is_http(&self) -> bool {
        self.header_type.as_deref() == Some("http")
    }

    pub fn type_or_none(&self) -> String {
        nonempty(self.header_type.as_deref()).unwrap_or_else(|| "none".to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TcpSettings {
    pub header: HeaderSettings,
    pub request: TcpRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TcpRequest {
    pub path: NoneOrSome<String>,
    pub headers: HashMap<String, NoneOrSome<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WsSettings {
    pub path: Option<String>,
    pub host: Option<String>,
    pub headers: HashMap<String, NoneOrSome<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrpcSettings {
    pub service_name: Option<String>,
    pub multi_mode: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KcpSettings {
    pub seed: Option<String>,
    pub header: HeaderSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuicSettings {
    pub security: Option<String>,
    pub key: Option<String>,
    pub header: HeaderSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub path: NoneOrSome<String>,
    pub host: NoneOrSome<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct XhttpSettings {
    pub path: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TlsSettings {
    pub server_name: Option<String>,
    pub fingerprint: Option<String>,
    pub fp: Option<String>,
    pub alpn: NoneOrSome<String>,
    pub allow_insecure: Option<Value>,
    pub settings: TlsNestedSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TlsNestedSettings {
    pub allow_insecure: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RealitySettings {
    pub public_key: Option<String>,
    pub short_id: Option<String>,
    pub spider_x: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExternalProxy {
    pub dest: Option<Value>,
}

/// Transport-specific settings for the one network variant selected by the
/// `network` discriminant. Variant records for other networks may be
/// present in the raw config and are ignored.
#[derive(Debug, Clone)]
pub enum TransportSettings {
    Tcp(TcpSettings),
    Ws(WsSettings),
    Grpc(GrpcSettings),
    Kcp(KcpSettings),
    Quic(QuicSettings),
    /// Shared by the `http` and `xhttp` networks, which read from both
    /// `httpSettings` and `xhttpSettings` with per-field precedence.
    Http {
        http: HttpSettings,
        xhttp: XhttpSettings,
    },
    Other,
}

/// Parsed `streamSettings` of one inbound.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub network: Network,
    pub security: Security,
    pub transport: TransportSettings,
    pub tls: TlsSettings,
    pub reality: RealitySettings,
    pub external_proxy: Vec<ExternalProxy>,
}

impl StreamSettings {
    pub fn parse(value: Option<&Value>) -> Self {
        let raw = SettingObject::lenient(value);
        let network = Network::parse(raw.text("network").as_deref());
        let security = Security::parse(raw.text("security").as_deref());

        let transport = match network {
            Network::Tcp => TransportSettings::Tcp(raw.section("tcpSettings")),
            Network::Ws => TransportSettings::Ws(raw.section("wsSettings")),
            Network::Grpc => TransportSettings::Grpc(raw.section("grpcSettings")),
            Network::Kcp => TransportSettings::Kcp(raw.section("kcpSettings")),
            Network::Quic => TransportSettings::Quic(raw.section("quicSettings")),
            Network::Http | Network::Xhttp => TransportSettings::Http {
                http: raw.section("httpSettings"),
                xhttp: raw.section("xhttpSettings"),
            },
            Network::Other(_) => TransportSettings::Other,
        };

        StreamSettings {
            network,
            security,
            transport,
            tls: raw.section("tlsSettings"),
            reality: raw.section("realitySettings"),
            external_proxy: raw.section("externalProxy"),
        }
    }

    /// Destination of the first `externalProxy` entry, if any.
    pub fn external_proxy_dest(&self) -> Option<String> {
        self.external_proxy
            .first()
            .and_then(|entry| entry.dest.as_ref())
            .map(render_value)
            .filter(|dest| !dest.is_empty())
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        StreamSettings::parse(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn network_parse_defaults_and_lowercases() {
        assert_eq!(Network::parse(None), Network::Tcp);
        assert_eq!(Network::parse(Some("")), Network::Tcp);
        assert_eq!(Network::parse(Some("WS")), Network::Ws);
        assert_eq!(
            Network::parse(Some("h2-custom")),
            Network::Other("h2-custom".to_string())
        );
    }

    #[test]
    fn security_parse_coerces_unknown_to_none() {
        assert_eq!(Security::parse(Some("tls")), Security::Tls);
        assert_eq!(Security::parse(Some("REALITY")), Security::Reality);
        assert_eq!(Security::parse(Some("whatever")), Security::None);
        assert_eq!(Security::parse(None), Security::None);
    }

    #[test]
    fn active_variant_is_selected_by_network() {
        let value = json!({
            "network": "grpc",
            "grpcSettings": {"serviceName": "svc", "multiMode": true},
            "wsSettings": {"path": "/ignored"}
        });
        let stream = StreamSettings::parse(Some(&value));
        match stream.transport {
            TransportSettings::Grpc(grpc) => {
                assert_eq!(grpc.service_name.as_deref(), Some("svc"));
                assert!(grpc.multi_mode);
            }
            other => panic!("unexpected transport: {:?}", other),
        }
    }

    #[test]
    fn stringified_stream_settings_parse() {
        let value = json!(r#"{"network": "ws", "wsSettings": {"path": "/chat"}}"#);
        let stream = StreamSettings::parse(Some(&value));
        assert_eq!(stream.network, Network::Ws);
        match stream.transport {
            TransportSettings::Ws(ws) => assert_eq!(ws.path.as_deref(), Some("/chat")),
            other => panic!("unexpected transport: {:?}", other),
        }
    }

    #[test]
    fn mistyped_section_degrades_to_default() {
        let value = json!({"network": "kcp", "kcpSettings": "garbage"});
        let stream = StreamSettings::parse(Some(&value));
        match stream.transport {
            TransportSettings::Kcp(kcp) => assert!(kcp.seed.is_none()),
            other => panic!("unexpected transport: {:?}", other),
        }
    }

    #[test]
    fn external_proxy_dest_reads_first_entry() {
        let value = json!({
            "network": "tcp",
            "externalProxy": [{"dest": "edge.example.org"}, {"dest": "second"}]
        });
        let stream = StreamSettings::parse(Some(&value));
        assert_eq!(
            stream.external_proxy_dest(),
            Some("edge.example.org".to_string())
        );
        assert_eq!(StreamSettings::parse(None).external_proxy_dest(), None);
    }
}
