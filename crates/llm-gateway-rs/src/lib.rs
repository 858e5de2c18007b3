pub mod client;
pub mod error;
pub mod extract;
pub mod provider;
pub mod types;

pub use client::{GatewayClient, DEFAULT_GATEWAY_URL};
pub use error::{GatewayError, Result};
pub use extract::extract_json;
pub use provider::{format_request, Provider};
pub use types::*;
