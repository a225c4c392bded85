use std::collections::HashMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::def::{Client, ParsedInbound};
use crate::util::nonempty;

pub mod shadowsocks;
pub mod trojan;
pub mod vless;
pub mod vmess;

// RFC 3986 unreserved characters stay literal, everything else is encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Query parameters with a protocol-specific emission order.
///
/// Values are collected in any order; `encode` walks the protocol's fixed
/// key list, skipping keys that were never set and dropping keys whose
/// value is empty. Output order never depends on insertion order.
#[derive(Debug, Default)]
pub(crate) struct Params {
    values: HashMap<&'static str, String>,
}

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    pub fn extend(&mut self, pairs: Vec<(&'static str, String)>) {
        for (key, value) in pairs {
            self.values.insert(key, value);
        }
    }

    pub fn encode(&self, order: &[&'static str]) -> String {
        debug_assert!(
            self.values.keys().all(|key| order.contains(key)),
            "query key missing from the declared order"
        );
        order
            .iter()
            .filter_map(|key| {
                self.values
                    .get(key)
                    .filter(|value| !value.is_empty())
                    .map(|value| format!("{}={}", key, encode_component(value)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// URI fragment naming the link: client email, else inbound remark, else
/// the literal `node`, percent-encoded.
pub(crate) fn link_tag(client: &Client, inbound: &ParsedInbound) -> String {
    let tag = nonempty(client.email.as_deref())
        .or_else(|| nonempty(inbound.remark.as_deref()))
        .unwrap_or_else(|| "node".to_string());
    encode_component(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::def::Inbound;

    #[test]
    fn component_encoding_is_rfc3986_strict() {
        assert_eq!(encode_component("/a b"), "%2Fa%20b");
        assert_eq!(encode_component("safe-chars_.~"), "safe-chars_.~");
        assert_eq!(encode_component("u@例"), "u%40%E4%BE%8B");
    }

    #[test]
    fn params_emit_in_declared_order_not_insertion_order() {
        let mut params = Params::new();
        params.set("b", "2");
        params.set("a", "1");
        params.set("c", "");
        assert_eq!(params.encode(&["a", "b", "c"]), "a=1&b=2");
    }

    #[test]
    fn tag_prefers_email_then_remark_then_node() {
        let inbound = Inbound {
            remark: Some("my node".to_string()),
            ..Default::default()
        }
        .parse();

        let with_email = Client {
            email: Some("u1".to_string()),
            ..Default::default()
        };
        assert_eq!(link_tag(&with_email, &inbound), "u1");

        assert_eq!(link_tag(&Client::default(), &inbound), "my%20node");

        let bare = Inbound::default().parse();
        assert_eq!(link_tag(&Client::default(), &bare), "node");
    }
}
