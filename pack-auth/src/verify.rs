// Signature verification collaborator.

use crate::error::VerifyError;
use crate::options::JwtOptions;

/// Confirms a raw credential was issued by a trusted party.
///
/// Runs before [`decode_credential`](crate::decode_credential); a credential
/// that fails here never produces a tenant context.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<(), VerifyError>;
}

/// Used when nothing can vouch for credentials. Rejects everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAll;

impl CredentialVerifier for RejectAll {
    fn verify(&self, _token: &str) -> Result<(), VerifyError> {
        Err(VerifyError::NotConfigured)
    }
}

/// HMAC shared-secret verification with `exp` checked against a leeway.
#[derive(Clone)]
pub struct SharedSecretVerifier {
    options: JwtOptions,
}

impl SharedSecretVerifier {
    pub fn new(options: JwtOptions) -> Self {
        Self { options }
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl SharedSecretVerifier {
    fn algorithm(&self) -> jsonwebtoken::Algorithm {
        use crate::options::JwtAlgorithm;

        match self.options.algorithm {
            JwtAlgorithm::HS256 => jsonwebtoken::Algorithm::HS256,
            JwtAlgorithm::HS384 => jsonwebtoken::Algorithm::HS384,
            JwtAlgorithm::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, token: &str) -> Result<(), VerifyError> {
        use jsonwebtoken::{decode, DecodingKey, Validation};

        let secret = self
            .options
            .secret
            .as_ref()
            .ok_or(VerifyError::NotConfigured)?;

        // Pack credentials carry no iss/aud; only signature and expiry count.
        let mut validation = Validation::new(self.algorithm());
        validation.validate_aud = false;
        validation.leeway = self.options.leeway_seconds;

        decode::<serde_json::Value>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|_| ())
        .map_err(|e| VerifyError::Rejected(e.to_string()))
    }
}

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, _token: &str) -> Result<(), VerifyError> {
        Err(VerifyError::Unsupported(format!(
            "{:?} (no JWT crypto backend compiled in)",
            self.options.algorithm
        )))
    }
}
