//! Core multi-tenant types for Pack.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::PackError;

/// Opaque tenant identifier, e.g. `"tenant-a"`.
///
/// Never empty. There is no central tenant registry: any non-empty id is a
/// valid scope for CRUD, only webhook resolution distinguishes known tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

impl TenantId {
    pub fn new<S: Into<String>>(tenant: S) -> Result<Self, PackError> {
        let tenant = tenant.into();
        if tenant.trim().is_empty() {
            return Err(PackError::bad_request("Tenant ID must not be empty"));
        }
        Ok(Self(tenant))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TenantId {
    type Error = PackError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for TenantId {
    type Error = PackError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TenantId> for String {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

/// Request-scoped tenant identity plus subject metadata.
///
/// Built once per request from a decoded credential and dropped with the
/// request. Controllers receive it by reference; nothing stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub subject_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            subject_id: None,
            username: None,
            email: None,
        }
    }

    /// Convenience constructor from a string, for tests and internal callers.
    pub fn for_tenant<S: Into<String>>(tenant: S) -> Result<Self, PackError> {
        Ok(Self::new(TenantId::new(tenant)?))
    }

    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tenant_ids_are_rejected() {
        assert!(TenantId::new("").is_err());
        assert!(TenantId::new("   ").is_err());
        assert_eq!(TenantId::new("tenant-a").unwrap().as_str(), "tenant-a");
    }

    #[test]
    fn tenant_id_deserializes_through_validation() {
        let ok: TenantId = serde_json::from_str("\"tenant-b\"").unwrap();
        assert_eq!(ok.to_string(), "tenant-b");
        assert!(serde_json::from_str::<TenantId>("\"\"").is_err());
    }
}
