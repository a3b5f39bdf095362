mod backend_client;

pub use backend_client::{sanitize_upstream_error, BackendByteStream, BackendClient};
