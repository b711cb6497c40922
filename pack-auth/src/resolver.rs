use std::sync::Arc;

use http::HeaderMap;
use pack_core::TenantContext;

use crate::decoder::decode_credential;
use crate::options::AuthOptions;
use crate::verify::{CredentialVerifier, RejectAll, SharedSecretVerifier};

/// Turns request headers into a tenant context: verify, then decode.
///
/// Fails closed. Any missing header, rejected signature, undecodable payload
/// or absent tenant claim yields `None`, and the controller answers 401.
#[derive(Clone)]
pub struct TenantResolver {
    options: AuthOptions,
    verifier: Arc<dyn CredentialVerifier>,
}

impl TenantResolver {
    pub fn new(options: AuthOptions, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { options, verifier }
    }

    /// Shared-secret verification from `options.jwt`; [`RejectAll`] when the
    /// options do not validate.
    pub fn from_options(options: AuthOptions) -> Self {
        let verifier: Arc<dyn CredentialVerifier> = match options.validate() {
            Ok(()) => Arc::new(SharedSecretVerifier::new(options.jwt.clone())),
            Err(reason) => {
                tracing::error!(%reason, "credential verification disabled, every request will be unauthenticated");
                Arc::new(RejectAll)
            }
        };
        Self::new(options, verifier)
    }

    pub fn options(&self) -> &AuthOptions {
        &self.options
    }

    /// Token from `<scheme> <token>` in the configured header. A header
    /// without a scheme is taken as the bare token.
    pub fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers
            .get(self.options.header.as_str())?
            .to_str()
            .ok()?
            .trim();
        if value.is_empty() {
            return None;
        }

        match value.split_once(' ') {
            Some((scheme, token)) => {
                let token = token.trim();
                let allowed = self
                    .options
                    .schemes
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(scheme.trim()));
                (allowed && !token.is_empty()).then(|| token.to_string())
            }
            None => Some(value.to_string()),
        }
    }

    pub fn resolve_token(&self, token: &str) -> Option<TenantContext> {
        if let Err(e) = self.verifier.verify(token) {
            tracing::warn!(error = %e, "credential failed verification");
            return None;
        }

        let credential = match decode_credential(token) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "credential could not be decoded");
                return None;
            }
        };

        let ctx = credential.tenant_context();
        if ctx.is_none() {
            tracing::warn!(subject = ?credential.id, "credential has no tenant_id claim");
        }
        ctx
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Option<TenantContext> {
        let token = self.extract_token(headers)?;
        self.resolve_token(&token)
    }
}
