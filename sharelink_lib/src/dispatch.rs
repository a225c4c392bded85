use serde::Serialize;

use crate::config::def::{Client, Inbound, ParsedInbound};
use crate::encode::shadowsocks::build_ss;
use crate::encode::trojan::build_trojan;
use crate::encode::vless::build_vless;
use crate::encode::vmess::{build_vmess, VmessRecord};
use crate::util::nonempty;

pub const DEFAULT_FALLBACK_DOMAIN: &str = "localhost";

/// Optional downstream image encoder. Implementations turn a finished link
/// into a data-URI rendering; returning `None` (or not wiring one up at
/// all) degrades gracefully to "no image".
pub trait QrEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkProtocol {
    Vless,
    Vmess,
    Trojan,
    Shadowsocks,
}

impl LinkProtocol {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "vless" => Some(LinkProtocol::Vless),
            "vmess" => Some(LinkProtocol::Vmess),
            "trojan" => Some(LinkProtocol::Trojan),
            "shadowsocks" | "ss" => Some(LinkProtocol::Shadowsocks),
            _ => None,
        }
    }
}

/// Everything one link-generation call produces. Links for protocols other
/// than the resolved one stay `None`; `config_text` is empty when the
/// encoder signaled "no link".
#[derive(Debug, Clone, Serialize)]
pub struct LinkBundle {
    pub protocol: String,
    pub vless_link: Option<String>,
    pub vmess_link: Option<String>,
    pub vmess_json: Option<VmessRecord>,
    pub trojan_link: Option<String>,
    pub ss_link: Option<String>,
    pub config_text: String,
    pub config_filename: String,
    pub qr_datauri: Option<String>,
}

/// Link generation front door. Holds the process-wide fallback domain and
/// the optional QR collaborator; everything else is per-call input.
pub struct LinkBuilder {
    fallback_domain: String,
    qr: Option<Box<dyn QrEncoder>>,
}

impl Default for LinkBuilder {
    fn default() -> Self {
        LinkBuilder::new(DEFAULT_FALLBACK_DOMAIN)
    }
}

impl LinkBuilder {
    pub fn new(fallback_domain: impl Into<String>) -> Self {
        LinkBuilder {
            fallback_domain: fallback_domain.into(),
            qr: None,
        }
    }

    pub fn with_qr(mut self, qr: Box<dyn QrEncoder>) -> Self {
        self.qr = Some(qr);
        self
    }

    pub fn build_best(&self, inbound: &Inbound, client: &Client) -> LinkBundle {
        self.for_inbound(inbound).build(client)
    }

    /// Parse the inbound's nested configs once and reuse them for every
    /// client of that inbound.
    pub fn for_inbound(&self, inbound: &Inbound) -> InboundLinks<'_> {
        InboundLinks {
            builder: self,
            inbound: inbound.parse(),
        }
    }
}

/// One inbound, parsed, ready to produce links for its clients.
pub struct InboundLinks<'a> {
    builder: &'a LinkBuilder,
    inbound: ParsedInbound,
}

impl InboundLinks<'_> {
    /// Clients embedded in the inbound's `settings.clients` array.
    pub fn clients(&self) -> Vec<Client> {
        self.inbound.settings.clients()
    }

    pub fn build(&self, client: &Client) -> LinkBundle {
        let inbound = &self.inbound;
        let fallback = self.builder.fallback_domain.as_str();

        let mut bundle = LinkBundle {
            protocol: inbound.protocol.clone(),
            vless_link: None,
            vmess_link: None,
            vmess_json: None,
            trojan_link: None,
            ss_link: None,
            config_text: String::new(),
            config_filename: String::new(),
            qr_datauri: None,
        };

        let suffix = match LinkProtocol::parse(&inbound.protocol) {
            Some(LinkProtocol::Vless) => {
                let link = build_vless(client, inbound, fallback);
                bundle.vless_link = Some(link.clone());
                bundle.config_text = link;
                "vless"
            }
            Some(LinkProtocol::Vmess) => {
                let (link, record) = build_vmess(client, inbound, fallback);
                bundle.vmess_link = Some(link.clone());
                bundle.vmess_json = Some(record);
                bundle.config_text = link;
                "vmess"
            }
            Some(LinkProtocol::Trojan) => {
                let link = build_trojan(client, inbound, fallback);
                bundle.trojan_link = Some(link.clone());
                bundle.config_text = link;
                "trojan"
            }
            Some(LinkProtocol::Shadowsocks) => {
                let link = build_ss(client, inbound, fallback);
                bundle.config_text = link.clone().unwrap_or_default();
                bundle.ss_link = link;
                "ss"
            }
            None => {
                tracing::debug!(
                    protocol = %inbound.protocol,
                    "unknown inbound protocol, falling back to vless"
                );
                let link = build_vless(client, inbound, fallback);
                bundle.vless_link = Some(link.clone());
                bundle.config_text = link;
                bundle.protocol = "vless".to_string();
                "config"
            }
        };

        let owner = nonempty(client.email.as_deref()).unwrap_or_else(|| "user".to_string());
        bundle.config_filename = format!("{owner}_{suffix}.txt");

        if !bundle.config_text.is_empty() {
            if let Some(qr) = self.builder.qr.as_ref() {
                bundle.qr_datauri = qr.encode(&bundle.config_text);
            }
        }

        bundle
    }
}

/// Build the canonical link bundle with default settings: `localhost`
/// fallback domain, no QR collaborator.
pub fn build_best(inbound: &Inbound, client: &Client) -> LinkBundle {
    LinkBuilder::default().build_best(inbound, client)
}

/// Argument-order twin of [`build_best`], kept for callers that think
/// client-first.
pub fn build_links(client: &Client, inbound: &Inbound) -> LinkBundle {
    build_best(inbound, client)
}
