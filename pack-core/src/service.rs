use std::fmt;

/// Operations a tenant-scoped content type can expose.
///
/// `Update` is a PUT and `Patch` a PATCH; both apply merge semantics at the
/// storage layer. `Publish` / `Unpublish` toggle `published_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentMethod {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
    Publish,
    Unpublish,
}

impl ContentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentMethod::Find => "find",
            ContentMethod::Get => "get",
            ContentMethod::Create => "create",
            ContentMethod::Update => "update",
            ContentMethod::Patch => "patch",
            ContentMethod::Remove => "remove",
            ContentMethod::Publish => "publish",
            ContentMethod::Unpublish => "unpublish",
        }
    }

    /// Methods addressed by record id; these go through the ownership check.
    pub fn is_id_addressed(&self) -> bool {
        !matches!(self, ContentMethod::Find | ContentMethod::Create)
    }

    pub fn is_read(&self) -> bool {
        matches!(self, ContentMethod::Find | ContentMethod::Get)
    }
}

impl fmt::Display for ContentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities describe which methods a content type exposes.
///
/// The controller answers `MethodNotAllowed` for anything outside the set,
/// before looking at credentials or storage.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ContentMethod>,
}

impl ServiceCapabilities {
    /// find, get, create, update, patch, remove.
    pub fn standard_crud() -> Self {
        use ContentMethod::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    /// Standard CRUD plus the draft/publish pair.
    pub fn publishable() -> Self {
        use ContentMethod::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove, Publish, Unpublish],
        }
    }

    /// Read-only content: `find` and `get`.
    pub fn read_only() -> Self {
        use ContentMethod::*;
        Self {
            allowed_methods: vec![Find, Get],
        }
    }

    pub fn from_methods(methods: Vec<ContentMethod>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: &ContentMethod) -> bool {
        self.allowed_methods.contains(method)
    }
}

impl Default for ServiceCapabilities {
    fn default() -> Self {
        Self::publishable()
    }
}
