//! Basic-auth header for the OPNsense API.
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Build the `Authorization` value from `apiKey:apiSecret` credentials.
pub fn basic_auth_header(creds: &str) -> String {
    format!("Basic {}", BASE64.encode(creds.as_bytes()))
}
