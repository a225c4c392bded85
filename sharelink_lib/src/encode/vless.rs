use crate::config::def::{Client, ParsedInbound};
use crate::config::{Network, Security, TransportSettings};
use crate::resolve::{host, security};
use crate::util::nonempty;

use super::{encode_component, link_tag, Params};

/// Emission order for every key a VLESS query can carry.
const KEY_ORDER: &[&str] = &[
    "type",
    "security",
    "encryption",
    "path",
    "host",
    "headerType",
    "mode",
    "serviceName",
    "flow",
    "seed",
    "quicSecurity",
    "key",
    "alpn",
    "sni",
    "fp",
    "allowInsecure",
    "pbk",
    "sid",
    "spx",
];

/// Emission order for the fixed minimal set the xhttp shape uses. The
/// `encryption` and `headerType` members are always empty there and drop
/// out of the encoded query.
const XHTTP_KEY_ORDER: &[&str] = &["security", "encryption", "headerType", "type", "host", "path"];

pub fn build_vless(client: &Client, inbound: &ParsedInbound, fallback_domain: &str) -> String {
    let stream = &inbound.stream;
    let server = host::server_host(stream, &inbound.settings, fallback_domain);
    let uid = client.credential();
    let tag = link_tag(client, inbound);
    let port = &inbound.port;

    if stream.network == Network::Xhttp {
        // Deliberate quirk of the VLESS+xhttp pairing: the emitted path is
        // percent-encoded twice and lower-cased. One pass happens here,
        // query emission supplies the second. No other combination
        // double-encodes.
        let raw_path = stream.transport.path();
        let path = encode_component(&raw_path).to_ascii_lowercase();

        let transport_host = stream.transport.host();
        let network_host = if transport_host.is_empty() {
            server.clone()
        } else {
            transport_host
        };

        let mut params = Params::new();
        params.set("security", "none");
        params.set("type", "xhttp");
        params.set("host", network_host);
        params.set("path", path);
        let query = params.encode(XHTTP_KEY_ORDER);

        return format!("vless://{uid}@{server}:{port}/?{query}#{tag}");
    }

    let mut params = Params::new();
    params.set("type", stream.network.as_str());
    params.set("encryption", "none");
    params.set("path", stream.transport.path());

    let network_host = stream.transport.host();
    if !network_host.is_empty() {
        params.set("host", network_host);
    }

    match &stream.transport {
        TransportSettings::Tcp(tcp) if tcp.header.is_http() => {
            params.set("headerType", "http");
        }
        TransportSettings::Grpc(grpc) => {
            params.set("mode", if grpc.multi_mode { "multi" } else { "gun" });
            if let Some(service) = nonempty(grpc.service_name.as_deref()) {
                params.set("serviceName", service);
            }
        }
        TransportSettings::Kcp(kcp) => {
            params.set("headerType", kcp.header.type_or_none());
            if let Some(seed) = nonempty(kcp.seed.as_deref()) {
                params.set("seed", seed);
            }
        }
        TransportSettings::Quic(quic) => {
            params.set(
                "quicSecurity",
                nonempty(quic.security.as_deref()).unwrap_or_else(|| "none".to_string()),
            );
            params.set("key", quic.key.clone().unwrap_or_default());
            params.set("headerType", quic.header.type_or_none());
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
        _ => params.set("security", "none"),
    }

    if let Some(flow) =
        nonempty(client.flow.as_deref()).or_else(|| inbound.settings.text("flow"))
    {
        params.set("flow", flow);
    }

    let query = params.encode(KEY_ORDER);
    format!("vless://{uid}@{server}:{port}?{query}#{tag}")
}
