use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::util::{nonempty, render_value};
use crate::Error;

use super::{SettingObject, StreamSettings};

/// One persisted inbound row. `settings` and `stream_settings` stay opaque
/// until leniently parsed; absent fields are tolerated everywhere.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Inbound {
    pub protocol: Option<String>,
    pub port: Option<u16>,
    pub listen: Option<Value>,
    pub listen_port: Option<Value>,
    pub settings: Option<Value>,
    #[serde(alias = "streamSettings")]
    pub stream_settings: Option<Value>,
    pub remark: Option<String>,
}

impl Inbound {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        from_file(path.as_ref())
    }

    /// Parse the nested configs once. Encoders work off the result, so
    /// generating links for many clients of one inbound does not re-parse.
    pub fn parse(&self) -> ParsedInbound {
        ParsedInbound {
            protocol: self
                .protocol
                .as_deref()
                .map(str::to_ascii_lowercase)
                .unwrap_or_default(),
            port: self.port_text(),
            remark: self.remark.clone(),
            settings: SettingObject::lenient(self.settings.as_ref()),
            stream: StreamSettings::parse(self.stream_settings.as_ref()),
        }
    }

    fn port_text(&self) -> String {
        if let Some(port) = self.port.filter(|p| *p != 0) {
            return port.to_string();
        }
        for value in [self.listen.as_ref(), self.listen_port.as_ref()] {
            if let Some(text) = value.map(render_value).filter(|v| !v.is_empty()) {
                return text;
            }
        }
        String::new()
    }
}

/// One authorized client entry, either a standalone row or an element of
/// the inbound's `settings.clients` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Client {
    pub id: Option<String>,
    pub uuid: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub flow: Option<String>,
    pub method: Option<String>,
}

impl Client {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        from_file(path.as_ref())
    }

    /// Credential used where a protocol needs one: explicit id, else uuid,
    /// else password, first non-empty.
    pub fn credential(&self) -> String {
        nonempty(self.id.as_deref())
            .or_else(|| nonempty(self.uuid.as_deref()))
            .or_else(|| nonempty(self.password.as_deref()))
            .unwrap_or_default()
    }
}

/// Inbound with its nested configs already normalized.
#[derive(Debug, Clone)]
pub struct ParsedInbound {
    /// Declared protocol, lowercased; empty when the row has none.
    pub protocol: String,
    /// Advertised port as text; empty when nothing resolved.
    pub port: String,
    pub remark: Option<String>,
    pub settings: SettingObject,
    pub stream: StreamSettings,
}

fn from_file<T>(path: &Path) -> Result<T, Error>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!("could not parse {}: {}", path.display(), e))
        }),
        Some("json5") => json5::from_str(&content).map_err(|e| {
            Error::InvalidConfig(format!("could not parse {}: {}", path.display(), e))
        }),
        other => Err(Error::InvalidConfig(format!(
            "unsupported file type: {:?}",
            other
        ))),
    }
}
