// Authentication options.

use serde::{Deserialize, Serialize};

/// HMAC algorithms accepted for shared-secret credentials.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum JwtAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl std::str::FromStr for JwtAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(format!("unsupported JWT algorithm: {other}")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtOptions {
    pub algorithm: JwtAlgorithm,
    /// Shared signing secret. Without it every credential is rejected.
    pub secret: Option<String>,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_seconds: u64,
}

impl Default for JwtOptions {
    fn default() -> Self {
        Self {
            algorithm: JwtAlgorithm::default(),
            secret: None,
            leeway_seconds: 0,
        }
    }
}

impl JwtOptions {
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        match &self.secret {
            None => Err("JWT secret is not configured".to_string()),
            Some(s) if s.trim().is_empty() => Err("JWT secret cannot be empty".to_string()),
            Some(s) if s.len() < 16 => {
                Err("JWT secret must be at least 16 characters".to_string())
            }
            Some(_) => Ok(()),
        }
    }
}

/// Where the credential is read from and how it is checked.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthOptions {
    /// Header carrying the credential, matched case-insensitively.
    pub header: String,
    /// Accepted `<scheme> <token>` prefixes.
    pub schemes: Vec<String>,
    pub jwt: JwtOptions,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            header: "authorization".to_string(),
            schemes: vec!["Bearer".to_string(), "JWT".to_string()],
            jwt: JwtOptions::default(),
        }
    }
}

impl AuthOptions {
    pub fn with_jwt(mut self, jwt: JwtOptions) -> Self {
        self.jwt = jwt;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.header.trim().is_empty() {
            return Err("Credential header name cannot be empty".to_string());
        }
        if self.schemes.is_empty() {
            return Err("At least one credential scheme must be accepted".to_string());
        }
        self.jwt
            .validate()
            .map_err(|e| format!("JWT validation failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_short_secret_fails_validation() {
        assert!(AuthOptions::default().validate().is_err());

        let short = AuthOptions::default().with_jwt(JwtOptions::default().with_secret("short"));
        assert!(short.validate().unwrap_err().contains("16 characters"));

        let ok = AuthOptions::default()
            .with_jwt(JwtOptions::default().with_secret("a-long-enough-shared-secret"));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn algorithms_parse_case_insensitively() {
        assert_eq!("hs512".parse::<JwtAlgorithm>().unwrap(), JwtAlgorithm::HS512);
        assert!("RS256".parse::<JwtAlgorithm>().is_err());
    }
}
