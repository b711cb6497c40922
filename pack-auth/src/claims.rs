use pack_core::{TenantContext, TenantId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Claims carried by a Pack credential.
///
/// Issued elsewhere; decoded once per request and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Subject id. Issuers send numbers or strings; both become a string.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl Credential {
    /// `None` when the tenant claim is absent or blank.
    pub fn tenant_context(&self) -> Option<TenantContext> {
        let tenant_id = TenantId::new(self.tenant_id.clone()?).ok()?;
        let mut ctx = TenantContext::new(tenant_id);
        ctx.subject_id = self.id.clone();
        ctx.username = self.username.clone();
        ctx.email = self.email.clone();
        Some(ctx)
    }
}
