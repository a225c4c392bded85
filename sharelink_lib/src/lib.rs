use thiserror::Error;

pub mod config;

pub mod dispatch;

pub mod encode;

pub mod log;

pub mod resolve;

mod util;

pub use config::def::{Client, Inbound, ParsedInbound};
pub use config::{Network, Security, SettingObject, StreamSettings, TransportSettings};
pub use dispatch::{
    build_best, build_links, InboundLinks, LinkBuilder, LinkBundle, QrEncoder,
    DEFAULT_FALLBACK_DOMAIN,
};
pub use encode::vmess::VmessRecord;
pub use util::option::NoneOrSome;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
