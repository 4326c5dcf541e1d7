//! HTTP transport shared by the model client and the tool catalog client.

pub mod http;

pub use http::{HttpTransport, TransportError};
