use crate::config::TransportSettings;
use crate::util::{nonempty, option::NoneOrSome};

impl TransportSettings {
    /// Transport-level "path" concept: the HTTP path for tcp-with-header,
    /// ws and http transports, the service name for grpc, the seed for kcp
    /// and the key for quic.
    pub fn path(&self) -> String {
        match self {
            TransportSettings::Tcp(tcp) => {
                if tcp.header.is_http() {
                    first_nonempty(&tcp.request.path).unwrap_or_else(|| "/".to_string())
                } else {
                    "/".to_string()
                }
            }
            TransportSettings::Ws(ws) => {
                nonempty(ws.path.as_deref()).unwrap_or_else(|| "/".to_string())
            }
            TransportSettings::Http { http, xhttp } => {
                if !http.path.is_empty() {
                    first_nonempty(&http.path).unwrap_or_else(|| "/".to_string())
                } else {
                    nonempty(xhttp.path.as_deref()).unwrap_or_else(|| "/".to_string())
                }
            }
            TransportSettings::Grpc(grpc) => {
                nonempty(grpc.service_name.as_deref()).unwrap_or_default()
            }
            TransportSettings::Kcp(kcp) => nonempty(kcp.seed.as_deref()).unwrap_or_default(),
            TransportSettings::Quic(quic) => nonempty(quic.key.as_deref()).unwrap_or_default(),
            TransportSettings::Other => "/".to_string(),
        }
    }

    /// Transport-level host override; empty when the transport has none.
    pub fn host(&self) -> String {
        match self {
            TransportSettings::Tcp(tcp) => {
                if tcp.header.is_http() {
                    tcp.request
                        .headers
                        .get("Host")
                        .and_then(first_nonempty)
                        .unwrap_or_default()
                } else {
                    String::new()
                }
            }
            TransportSettings::Ws(ws) => nonempty(ws.host.as_deref())
                .or_else(|| ws.headers.get("Host").and_then(first_nonempty))
                .unwrap_or_default(),
            TransportSettings::Http { http, xhttp } => nonempty(xhttp.host.as_deref())
                .or_else(|| first_nonempty(&http.host))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

fn first_nonempty(value: &NoneOrSome<String>) -> Option<String> {
    nonempty(value.first().map(String::as_str))
}
