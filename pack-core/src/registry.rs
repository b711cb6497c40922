use std::collections::HashMap;
use std::sync::Arc;

use crate::controller::TenantScopedController;

/// Maps content-type identifiers to their controllers.
///
/// Transports (HTTP, jobs, CLI) look controllers up by the name that appears
/// in the route, e.g. `articles` for `/api/articles`.
#[derive(Default)]
pub struct ContentRegistry {
    controllers: HashMap<String, Arc<TenantScopedController>>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self {
            controllers: HashMap::new(),
        }
    }

    /// Register a controller under its content type. Replaces an existing one.
    pub fn register(&mut self, controller: Arc<TenantScopedController>) {
        self.controllers
            .insert(controller.content_type().to_string(), controller);
    }

    pub fn get(&self, content_type: &str) -> Option<&Arc<TenantScopedController>> {
        self.controllers.get(content_type)
    }

    pub fn contains(&self, content_type: &str) -> bool {
        self.controllers.contains_key(content_type)
    }

    /// Registered content types, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.controllers.keys().cloned().collect();
        names.sort();
        names
    }
}
