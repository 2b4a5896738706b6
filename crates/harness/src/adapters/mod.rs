//! Adapters implementing the harness ports.

mod reqwest_transport;
mod transport_config;

pub use reqwest_transport::ReqwestTransport;
pub use transport_config::TransportConfig;
