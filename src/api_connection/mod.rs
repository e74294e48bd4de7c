pub mod connection;
pub mod endpoints;

pub use connection::{AiProvider, ApiConnectionError, Attachment, StructuredRequest};
pub use endpoints::Provider;
