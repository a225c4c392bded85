pub mod host;
pub mod security;
pub mod transport;
