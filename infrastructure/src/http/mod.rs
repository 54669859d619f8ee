//! HTTP adapter for the chat transport port.

mod error;
mod transport;

pub use error::HttpTransportError;
pub use transport::HttpChatTransport;
