use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::def::{Client, ParsedInbound};
use crate::config::{Security, TransportSettings};
use crate::resolve::{host, security};
use crate::util::nonempty;

/// The flat record serialized into a `vmess://` payload. Field order in the
/// compact JSON follows the declaration order here; optional overlays are
/// absent from the payload when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmessRecord {
    pub v: String,
    pub ps: String,
    pub add: String,
    pub port: String,
    pub id: String,
    pub aid: u32,
    pub net: String,
    #[serde(rename = "type")]
    pub header_type: String,
    pub path: String,
    pub tls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servicename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<String>,
    #[serde(
        default,
        rename = "allowInsecure",
        skip_serializing_if = "Option::is_none"
    )]
    pub allow_insecure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pbk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spx: Option<String>,
}

pub fn build_vmess(
    client: &Client,
    inbound: &ParsedInbound,
    fallback_domain: &str,
) -> (String, VmessRecord) {
    let stream = &inbound.stream;
    let server = host::server_host(stream, &inbound.settings, fallback_domain);

    let ps = nonempty(client.email.as_deref())
        .or_else(|| nonempty(inbound.remark.as_deref()))
        .unwrap_or_else(|| "node".to_string());

    let mut record = VmessRecord {
        v: "2".to_string(),
        ps,
        add: server,
        port: inbound.port.clone(),
        id: client.credential(),
        aid: 0,
        net: stream.network.as_str().to_string(),
        header_type: "none".to_string(),
        path: stream.transport.path(),
        tls: match stream.security {
            Security::Tls => "tls",
            Security::Reality => "reality",
            _ => "none",
        }
        .to_string(),
        host: None,
        servicename: None,
        sni: None,
        fp: None,
        alpn: None,
        allow_insecure: None,
        pbk: None,
        sid: None,
        spx: None,
    };

    match &stream.transport {
        TransportSettings::Tcp(tcp) if tcp.header.is_http() => {
            record.header_type = "http".to_string();
            let header_host = stream.transport.host();
            if !header_host.is_empty() {
                record.host = Some(header_host);
            }
        }
        TransportSettings::Ws(_) => {
            let ws_host = stream.transport.host();
            if !ws_host.is_empty() {
                record.host = Some(ws_host);
            }
        }
        TransportSettings::Grpc(grpc) => {
            record.header_type = if grpc.multi_mode { "multi" } else { "gun" }.to_string();
            if let Some(service) = nonempty(grpc.service_name.as_deref()) {
                record.servicename = Some(service);
            }
        }
        TransportSettings::Kcp(kcp) => {
            record.header_type = kcp.header.type_or_none();
        }
        TransportSettings::Quic(quic) => {
            record.header_type = quic.header.type_or_none();
            record.host = Some(
                nonempty(quic.security.as_deref()).unwrap_or_else(|| "none".to_string()),
            );
        }
        TransportSettings::Http { .. } => {
            record.header_type = "http".to_string();
            let http_host = stream.transport.host();
            if !http_host.is_empty() {
                record.host = Some(http_host);
            }
        }
        _ => {}
    }

    let tls_params = security::tls_params(stream);
    for (key, value) in tls_params {
        match key {
            "sni" => record.sni = Some(value),
            "fp" => record.fp = Some(value),
            "alpn" => record.alpn = Some(value),
            "allowInsecure" => record.allow_insecure = Some(value),
            _ => {}
        }
    }

    if stream.security == Security::Reality {
        for (key, value) in security::reality_params(stream) {
            match key {
                "pbk" => record.pbk = Some(value),
                "sid" => record.sid = Some(value),
                "spx" => record.spx = Some(value),
                "fp" => record.fp = Some(value),
                _ => {}
            }
        }
    }

    let payload = serde_json::to_string(&record).unwrap_or_default();
    (format!("vmess://{}", STANDARD.encode(payload)), record)
}
