pub mod anthropic;
pub mod gemini;
pub(crate) mod gateway;
pub mod health;
pub mod models;
pub(crate) mod streaming;
