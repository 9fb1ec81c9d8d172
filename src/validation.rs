use regex::Regex;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid base url {0:?} - must start with http:// or https://")]
    InvalidBaseUrl(String),
    #[error("invalid creds - must be in format \"apiKey:apiSecret\"")]
    InvalidCreds,
}

lazy_static::lazy_static! {
    static ref BASE_URL_RE: Regex = Regex::new(r"^https?://").unwrap();
    /// Exactly one ':' separating key and secret
    static ref CREDS_RE: Regex = Regex::new(r"^[^:]*:[^:]*$").unwrap();
}

pub fn validate_base_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || !BASE_URL_RE.is_match(url) {
        return Err(ValidationError::InvalidBaseUrl(url.to_string()));
    }
    Ok(())
}

pub fn validate_creds(creds: &str) -> Result<(), ValidationError> {
    if creds.is_empty() || !CREDS_RE.is_match(creds) {
        return Err(ValidationError::InvalidCreds);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_needs_a_scheme() {
        assert!(validate_base_url("https://router.lan").is_ok());
        assert!(validate_base_url("http://10.0.0.1").is_ok());
        assert_eq!(
            validate_base_url("router.lan"),
            Err(ValidationError::InvalidBaseUrl("router.lan".into()))
        );
        assert!(validate_base_url("").is_err());
        assert!(validate_base_url("ftp://router.lan").is_err());
    }

    #[test]
    fn creds_are_key_colon_secret() {
        assert!(validate_creds("key:secret").is_ok());
        assert_eq!(validate_creds("keysecret"), Err(ValidationError::InvalidCreds));
        assert_eq!(validate_creds("a:b:c"), Err(ValidationError::InvalidCreds));
        assert_eq!(validate_creds(""), Err(ValidationError::InvalidCreds));
    }
}
