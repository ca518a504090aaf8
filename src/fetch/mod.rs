//! Fetch execution: transport, decoding and the concurrent dispatcher.

pub mod decode;
pub mod dispatcher;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use transport::HttpTransport;
