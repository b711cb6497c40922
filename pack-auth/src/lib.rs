//! pack-auth: credential decoding and tenant resolution.
//!
//! Credentials are issued elsewhere. This crate verifies them, decodes the
//! claims and produces a [`pack_core::TenantContext`], or nothing.

pub mod claims;
pub mod decoder;
pub mod error;
pub mod options;
pub mod resolver;
pub mod verify;

pub use claims::Credential;
pub use decoder::decode_credential;
pub use error::{DecodeError, VerifyError};
pub use options::{AuthOptions, JwtAlgorithm, JwtOptions};
pub use resolver::TenantResolver;
pub use verify::{CredentialVerifier, RejectAll, SharedSecretVerifier};
