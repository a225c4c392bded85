use crate::config::def::{Client, ParsedInbound};
use crate::config::{Security, TransportSettings};
use crate::resolve::{host, security};
use crate::util::nonempty;

use super::{link_tag, Params};

/// Fixed emission order: security parameters first, then transport
/// parameters. Unlike VLESS, no `security` key is emitted at all when the
/// security mode is neither tls nor reality.
const KEY_ORDER: &[&str] = &[
    "security",
    "sni",
    "alpn",
    "fp",
    "allowInsecure",
    "pbk",
    "sid",
    "spx",
    "type",
    "path",
    "host",
    "mode",
    "serviceName",
    "headerType",
];

pub fn build_trojan(client: &Client, inbound: &ParsedInbound, fallback_domain: &str) -> String {
    let stream = &inbound.stream;
    let server = host::server_host(stream, &inbound.settings, fallback_domain);
    let credential = nonempty(client.password.as_deref())
        .or_else(|| nonempty(client.id.as_deref()))
        .unwrap_or_default();
    let tag = link_tag(client, inbound);
    let port = &inbound.port;

    let mut params = Params::new();
    params.set("type", stream.network.as_str());
    params.set("path", stream.transport.path());

    let network_host = stream.transport.host();
    if !network_host.is_empty() {
        params.set("host", network_host);
    }

    match &stream.transport {
        TransportSettings::Grpc(grpc) => {
            params.set("mode", if grpc.multi_mode { "multi" } else { "gun" });
            if let Some(service) = nonempty(grpc.service_name.as_deref()) {
                params.set("serviceName", service);
            }
        }
        TransportSettings::Tcp(tcp) if tcp.header.is_http() => {
            params.set("headerType", "http");
        }
        _ => {}
    }

    match stream.security {
        Security::Tls => {
            params.set("security", "tls");
            params.extend(security::tls_params(stream));
        }
        Security::Reality => {
            params.set("security", "reality");
            params.extend(security::reality_params(stream));
        }
        _ => {}
    }

    let query = params.encode(KEY_ORDER);
    format!("trojan://{credential}@{server}:{port}?{query}#{tag}")
}
