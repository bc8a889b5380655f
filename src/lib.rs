//! Backend for gigafy - turns an uploaded photo into its GigaChad version
//!
//! Accepts an image over HTTP, relays it with a fixed prompt to a
//! Replicate-hosted image model, and returns the URL of the generated image.

pub mod ai;
pub mod error;
pub mod models;
pub mod prompts;
pub mod server;
pub mod tunnel;

pub use error::{Error, Result};
